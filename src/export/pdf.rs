use std::fs;
use std::path::Path;

use image::DynamicImage;
use printpdf::{Color, Image, ImageTransform, Line, Mm, PdfDocument, Point, Rgb};

use super::PageWriter;
use super::layout::{ExportLayout, PageFormat};
use crate::error::RenderError;

/// Distance of the page border from each edge.
pub const BORDER_MARGIN_MM: f64 = 3.0;
pub const BORDER_WIDTH_MM: f64 = 1.0;

const MM_PER_INCH: f32 = 25.4;
const PT_PER_MM: f32 = 72.0 / MM_PER_INCH;

/// Writes the snapshot as a single-page PDF.
pub struct PdfPageWriter {
    title: String,
}

impl PdfPageWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

impl Default for PdfPageWriter {
    fn default() -> Self {
        Self::new("Invoice")
    }
}

impl PageWriter for PdfPageWriter {
    fn write_page(
        &self,
        image: &DynamicImage,
        layout: &ExportLayout,
        page: PageFormat,
        path: &Path,
    ) -> Result<(), RenderError> {
        let (doc, page_idx, layer_idx) = PdfDocument::new(
            &self.title,
            Mm(page.width as f32),
            Mm(page.height as f32),
            "Layer 1",
        );
        let layer = doc.get_page(page_idx).get_layer(layer_idx);

        // PDF images carry no alpha here; flatten to RGB first.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        // Picking the dpi makes the image come out exactly layout.width wide.
        let dpi = image.width() as f32 * MM_PER_INCH / layout.width as f32;
        Image::from_dynamic_image(&rgb).add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(layout.x_offset as f32)),
                // PDF space grows upwards from the bottom edge
                translate_y: Some(Mm((page.height - layout.y_offset - layout.height) as f32)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        let (left, bottom) = (BORDER_MARGIN_MM as f32, BORDER_MARGIN_MM as f32);
        let right = (page.width - BORDER_MARGIN_MM) as f32;
        let top = (page.height - BORDER_MARGIN_MM) as f32;
        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.set_outline_thickness(BORDER_WIDTH_MM as f32 * PT_PER_MM);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(left), Mm(bottom)), false),
                (Point::new(Mm(right), Mm(bottom)), false),
                (Point::new(Mm(right), Mm(top)), false),
                (Point::new(Mm(left), Mm(top)), false),
            ],
            is_closed: true,
        });

        let bytes = doc.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn writes_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("Raj_1.pdf");
        let white = RgbaImage::from_pixel(40, 60, Rgba([255, 255, 255, 255]));
        let image = DynamicImage::ImageRgba8(white);
        let layout = ExportLayout::fit(40, 60, PageFormat::A4);

        PdfPageWriter::default()
            .write_page(&image, &layout, PageFormat::A4, &path)
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
