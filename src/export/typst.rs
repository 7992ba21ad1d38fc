use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tera::{Context, Tera, Value};
use tokio::process::Command;
use tracing::debug;

use super::Rasterizer;
use crate::error::RenderError;
use crate::view::InvoiceView;

// Embed template at compile time to ensure availability
const INVOICE_TEMPLATE: &str = include_str!("../../templates/invoice.tera");
const TEMPLATE_NAME: &str = "invoice.tera";

/// Resolution of the document at scale 1, matching a 96 dpi screen.
const BASE_PPI: f32 = 96.0;

/// Rasterizes the view by rendering it to Typst markup and letting the
/// `typst` binary compile that to PNG.
pub struct TypstRasterizer {
    typst_bin: PathBuf,
    tera: Tera,
}

impl TypstRasterizer {
    pub fn new(typst_bin: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("typst", typst_filter);
        tera.register_filter("control", control_filter);
        tera.add_raw_template(TEMPLATE_NAME, INVOICE_TEMPLATE)?;
        Ok(Self { typst_bin: typst_bin.into(), tera })
    }

    /// Typst markup for the view as it currently stands.
    pub fn source(&self, view: &InvoiceView) -> Result<String, RenderError> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

#[async_trait]
impl Rasterizer for TypstRasterizer {
    async fn capture(&self, view: &InvoiceView, scale: f32) -> Result<DynamicImage, RenderError> {
        let source = self.source(view)?;

        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("invoice.typ");
        let output = scratch.path().join("invoice.png");
        tokio::fs::write(&input, source).await?;

        let ppi = BASE_PPI * scale;
        debug!(bin = %self.typst_bin.display(), ppi, "compiling snapshot");
        let result = Command::new(&self.typst_bin)
            .arg("compile")
            .arg("--format")
            .arg("png")
            .arg("--ppi")
            .arg(ppi.to_string())
            .arg(&input)
            .arg(&output)
            .output()
            .await?;

        if !result.status.success() {
            return Err(RenderError::Typst {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let png = tokio::fs::read(&output).await?;
        Ok(image::load_from_memory_with_format(&png, ImageFormat::Png)?)
    }
}

/// Quotes text as a Typst string literal.
pub fn typst_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn typst_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(Value::String(typst_string(&text)))
}

// Turns a serialized control into a call of the template's `field` function.
fn control_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let display = value
        .get("display")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("`control` filter expects a control"))?;
    let flag = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(false);

    Ok(Value::String(format!(
        "field({}, ghost: {}, boxed: {}, invalid: {})",
        typst_string(display),
        flag("ghost"),
        flag("boxed"),
        flag("invalid"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::InvoiceForm;
    use crate::model::ItemField;
    use crate::shops::ShopProfile;
    use crate::export::CAPTURE_SCALE;
    use chrono::NaiveDate;
    use image::{Rgb, RgbImage};
    use std::io::ErrorKind;

    fn view() -> InvoiceView {
        let mut form = InvoiceForm::new(
            ShopProfile::for_route(Some("new-calcutta-motors")),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        form.set_receiver_name("Raj \"RK\" Kumar");
        form.update_item(0, ItemField::Description, "Chain #428").unwrap();
        form.update_item(0, ItemField::Quantity, "1").unwrap();
        form.update_item(0, ItemField::Rate, "850").unwrap();
        InvoiceView::render(&form)
    }

    #[test]
    fn quotes_typst_strings() {
        assert_eq!(typst_string("plain"), "\"plain\"");
        assert_eq!(typst_string("a \"b\" \\ c"), r#""a \"b\" \\ c""#);
        assert_eq!(typst_string("two\r\nlines"), "\"two\\nlines\"");
    }

    #[test]
    fn interactive_source_shows_chrome_and_placeholders() {
        let raster = TypstRasterizer::new("typst").unwrap();
        let source = raster.source(&view()).unwrap();
        assert!(source.contains("Print Invoice"));
        assert!(source.contains("M/s New Calcutta Motors"));
        assert!(source.contains(r#"#("9415280266, 9935922535, 8840958369")"#));
        assert!(source.contains(
            r#"field("Raj \"RK\" Kumar", ghost: false, boxed: true, invalid: false)"#
        ));
        assert!(source.contains(
            r#"field("Enter address", ghost: true, boxed: true, invalid: false)"#
        ));
        assert!(source.contains(r#"field("2026-10-19""#));
        assert!(source.contains("One Thousand Three only"));
    }

    #[test]
    fn presented_source_is_static_text() {
        let raster = TypstRasterizer::new("typst").unwrap();
        let mut view = view();
        let shown = view.present();
        let source = raster.source(&shown).unwrap();
        assert!(!source.contains("Print Invoice"));
        assert!(!source.contains("ghost: true"));
        assert!(source.contains(
            r#"field("Chain #428", ghost: false, boxed: false, invalid: false)"#
        ));
        assert!(source.contains(r#"field("19-10-2026""#));
    }

    #[tokio::test]
    async fn missing_binary_surfaces_not_found() {
        let raster = TypstRasterizer::new("/nonexistent/typst").unwrap();
        let err = raster.capture(&view(), CAPTURE_SCALE).await.unwrap_err();
        assert!(matches!(err, RenderError::Io(ref e) if e.kind() == ErrorKind::NotFound));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_compile_reports_exit_status() {
        let raster = TypstRasterizer::new("false").unwrap();
        match raster.capture(&view(), CAPTURE_SCALE).await {
            Err(RenderError::Typst { status, .. }) => assert!(status.contains('1'), "{status}"),
            other => panic!("expected a typst failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn decodes_the_compiled_png() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("page.png");
        RgbImage::from_pixel(3, 5, Rgb([255, 255, 255])).save(&png).unwrap();
        let args = dir.path().join("args.txt");

        // Stands in for typst: records its arguments and copies the PNG to the last one.
        let stub = dir.path().join("typst");
        let script = format!(
            "#!/bin/sh\necho \"$@\" > '{}'\nfor last; do :; done\ncp '{}' \"$last\"\n",
            args.display(),
            png.display()
        );
        std::fs::write(&stub, script).unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let raster = TypstRasterizer::new(&stub).unwrap();
        let image = raster.capture(&view(), CAPTURE_SCALE).await.unwrap();

        assert_eq!((image.width(), image.height()), (3, 5));
        let recorded = std::fs::read_to_string(&args).unwrap();
        assert!(recorded.starts_with("compile --format png --ppi 192 "), "{recorded}");
    }
}
