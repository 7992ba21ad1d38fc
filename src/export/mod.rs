//! Turning the on-screen invoice into a one-page PDF.
//!
//! The coordinator owns the sequence; the heavy lifting sits behind two
//! seams: a [`Rasterizer`] that snapshots the view and a [`PageWriter`] that
//! lays the snapshot onto a page and writes the file.

pub mod filename;
pub mod layout;
pub mod pdf;
pub mod typst;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{ExportError, RenderError};
use crate::form::InvoiceForm;
use crate::view::InvoiceView;

pub use filename::export_filename;
pub use layout::{Centering, ExportLayout, PageFormat};

/// Snapshots are taken at twice the on-screen resolution so text stays
/// legible once scaled onto paper.
pub const CAPTURE_SCALE: f32 = 2.0;

/// Pause between entering presentation mode and capturing.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Renders the whole document, unclipped, at `scale` times its natural size.
    async fn capture(&self, view: &InvoiceView, scale: f32) -> Result<DynamicImage, RenderError>;
}

pub trait PageWriter: Send + Sync {
    /// Writes a single page holding `image` placed per `layout`, framed by a border.
    fn write_page(
        &self,
        image: &DynamicImage,
        layout: &ExportLayout,
        page: PageFormat,
        path: &Path,
    ) -> Result<(), RenderError>;
}

pub struct ExportCoordinator<R, W> {
    rasterizer: R,
    writer: W,
    output_dir: PathBuf,
    settle_delay: Duration,
    busy: AtomicBool,
}

impl<R: Rasterizer, W: PageWriter> ExportCoordinator<R, W> {
    pub fn new(rasterizer: R, writer: W, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            rasterizer,
            writer,
            output_dir: output_dir.into(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Exports the invoice shown in `view` and returns the written file.
    ///
    /// Blank required fields abort the export before anything is rendered;
    /// they are marked touched on `form`. The view is back in its interactive
    /// state whenever this returns, successful or not. A call made while
    /// another export is running is refused with [`ExportError::InProgress`].
    pub async fn export(
        &self,
        form: &mut InvoiceForm,
        view: &mut InvoiceView,
    ) -> Result<PathBuf, ExportError> {
        let _busy = self.claim()?;
        form.validate_for_export()?;

        let state = form.state();
        info!(invoice_no = %state.invoice_no, shop = %state.shop.route, "exporting invoice");

        let captured = {
            let shown = view.present();
            tokio::time::sleep(self.settle_delay).await;
            self.rasterizer.capture(&shown, CAPTURE_SCALE).await
        };
        let image = captured.inspect_err(|e| warn!(error = %e, "snapshot failed"))?;

        if image.width() == 0 || image.height() == 0 {
            return Err(ExportError::EmptySnapshot);
        }

        let page = PageFormat::A4;
        let layout = ExportLayout::fit(image.width(), image.height(), page);
        debug!(
            width = image.width(),
            height = image.height(),
            ?layout,
            "fitted snapshot to page"
        );

        let path = self
            .output_dir
            .join(export_filename(&state.receiver.name, &state.invoice_no));
        self.writer
            .write_page(&image, &layout, page, &path)
            .inspect_err(|e| warn!(error = %e, path = %path.display(), "writing page failed"))?;

        info!(path = %path.display(), "invoice exported");
        Ok(path)
    }

    fn claim(&self) -> Result<BusyGuard<'_>, ExportError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            warn!("export requested while another is running");
            return Err(ExportError::InProgress);
        }
        Ok(BusyGuard(&self.busy))
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
