/// A fixed physical page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width: f64,
    pub height: f64,
}

impl PageFormat {
    /// ISO A4, portrait.
    pub const A4: PageFormat = PageFormat { width: 210.0, height: 297.0 };

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Which axis, if any, has leftover space split around the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Centering {
    None,
    Vertical,
    Horizontal,
}

/// Where a captured image lands on the page. Offsets are measured from the
/// top-left corner; all lengths are millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportLayout {
    /// Millimetres per image pixel.
    pub scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub width: f64,
    pub height: f64,
    pub centering: Centering,
}

impl ExportLayout {
    /// Fits an image of `image_width` × `image_height` pixels onto `page`,
    /// keeping its aspect ratio and never clipping it.
    ///
    /// Both dimensions must be non-zero.
    pub fn fit(image_width: u32, image_height: u32, page: PageFormat) -> Self {
        let image_ratio = f64::from(image_width) / f64::from(image_height);

        let (width, height, x_offset, y_offset) = if image_ratio > page.aspect_ratio() {
            // relatively wider: fill the width
            let height = page.width / image_ratio;
            if height > page.height {
                let width = page.height * image_ratio;
                (width, page.height, (page.width - width) / 2.0, 0.0)
            } else {
                (page.width, height, 0.0, (page.height - height) / 2.0)
            }
        } else {
            // relatively taller: fill the height
            let width = page.height * image_ratio;
            if width > page.width {
                let height = page.width / image_ratio;
                (page.width, height, 0.0, (page.height - height) / 2.0)
            } else {
                (width, page.height, (page.width - width) / 2.0, 0.0)
            }
        };

        let (x_offset, y_offset) = (snap(x_offset), snap(y_offset));
        let centering = if y_offset > 0.0 {
            Centering::Vertical
        } else if x_offset > 0.0 {
            Centering::Horizontal
        } else {
            Centering::None
        };

        Self {
            scale: width / f64::from(image_width),
            x_offset,
            y_offset,
            width,
            height,
            centering,
        }
    }
}

// Ratios that match the page up to rounding leave sub-nanometre offsets.
fn snap(offset: f64) -> f64 {
    if offset.abs() < 1e-9 { 0.0 } else { offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn wide_image_fills_width_and_centers_vertically() {
        let layout = ExportLayout::fit(2000, 1000, PageFormat::A4);
        assert_eq!(layout.centering, Centering::Vertical);
        assert!((layout.width - 210.0).abs() < EPS);
        assert!((layout.height - 105.0).abs() < EPS);
        assert!((layout.y_offset - 96.0).abs() < EPS);
        assert_eq!(layout.x_offset, 0.0);
        assert!((layout.scale - 0.105).abs() < EPS);
    }

    #[test]
    fn tall_image_fills_height_and_centers_horizontally() {
        let layout = ExportLayout::fit(1000, 2000, PageFormat::A4);
        assert_eq!(layout.centering, Centering::Horizontal);
        assert!((layout.height - 297.0).abs() < EPS);
        assert!((layout.width - 148.5).abs() < EPS);
        assert!((layout.x_offset - 30.75).abs() < EPS);
        assert_eq!(layout.y_offset, 0.0);
    }

    #[test]
    fn matching_ratio_needs_no_centering() {
        let layout = ExportLayout::fit(420, 594, PageFormat::A4);
        assert_eq!(layout.centering, Centering::None);
        assert!((layout.width - 210.0).abs() < EPS);
        assert!((layout.height - 297.0).abs() < EPS);
        assert!((layout.scale - 0.5).abs() < EPS);
    }

    proptest! {
        #[test]
        fn never_clips_and_keeps_ratio(w in 1u32..20_000, h in 1u32..20_000) {
            let page = PageFormat::A4;
            let l = ExportLayout::fit(w, h, page);
            prop_assert!(l.x_offset >= 0.0 && l.y_offset >= 0.0);
            prop_assert!(l.x_offset + l.width <= page.width + 1e-6);
            prop_assert!(l.y_offset + l.height <= page.height + 1e-6);
            // one axis is always filled
            let fills_width = (l.width - page.width).abs() < 1e-6;
            let fills_height = (l.height - page.height).abs() < 1e-6;
            prop_assert!(fills_width || fills_height);
            let ratio = f64::from(w) / f64::from(h);
            prop_assert!((l.width / l.height - ratio).abs() <= 1e-9 * ratio.max(1.0));
            // leftover space is split evenly
            match l.centering {
                Centering::Vertical => {
                    prop_assert!((2.0 * l.y_offset + l.height - page.height).abs() < 1e-6)
                }
                Centering::Horizontal => {
                    prop_assert!((2.0 * l.x_offset + l.width - page.width).abs() < 1e-6)
                }
                Centering::None => prop_assert!(l.x_offset == 0.0 && l.y_offset == 0.0),
            }
        }
    }
}
