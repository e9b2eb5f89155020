//! Configuration types for the scan pipeline.
//!
//! All behaviour that is not part of a single run's request (the toggles
//! live on [`crate::ScanRequest`]) is controlled through [`ScanConfig`],
//! built via its [`ScanConfigBuilder`]. Keeping every knob in one struct
//! makes it trivial to share configs across runs and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest; `build()` validates the layout
//! so invalid geometry is rejected before any pipeline stage runs.

use crate::error::ScanError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Target page width in PDF units (A4-like at 72 units per inch).
pub const A4_WIDTH: u32 = 595;

/// Target page height in PDF units.
pub const A4_HEIGHT: u32 = 842;

/// Fixed geometry of the output page and of the PDF-source canvas.
///
/// These are constants of the design, not knobs derived from the input:
/// every exported document is a 595×842 page, the placed image is always
/// the page width divided by the reduction factor, and PDF sources are
/// always rendered at the same zoom with the same padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Output page width. Default: 595.
    pub page_width: f32,

    /// Output page height. Default: 842.
    pub page_height: f32,

    /// The placed image is `page_width / reduction` wide. Default: 1.2.
    pub reduction: f32,

    /// Extra offset of the shadow rectangle past the margin, both axes.
    /// Default: 1.1.
    pub shadow_nudge: f32,

    /// Zoom factor applied when rasterising the first page of a PDF
    /// source. Default: 1.3.
    pub pdf_zoom: f32,

    /// Border around the rendered PDF page on its canvas. Default: 10.
    pub pdf_border: u32,

    /// Additional bottom/right canvas margin holding the pre-painted
    /// shadow rectangle for PDF sources. Default: 10.
    pub pdf_shadow_margin: u32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH as f32,
            page_height: A4_HEIGHT as f32,
            reduction: 1.2,
            shadow_nudge: 1.1,
            pdf_zoom: 1.3,
            pdf_border: 10,
            pdf_shadow_margin: 10,
        }
    }
}

impl PageLayout {
    /// Width of the placed image on the output page.
    pub fn image_width(&self) -> f32 {
        self.page_width / self.reduction
    }

    /// Page margin in both axes. Derived so the image sits centred
    /// horizontally: `(page_width − image_width) / 2`.
    pub fn margin(&self) -> f32 {
        (self.page_width - self.image_width()) / 2.0
    }

    /// Top-left offset of the drop-shadow rectangle.
    pub fn shadow_offset(&self) -> f32 {
        self.margin() + self.shadow_nudge
    }

    /// Height of the placed image, preserving the bitmap's aspect ratio
    /// at [`Self::image_width`].
    pub fn scaled_height(&self, bitmap_width: u32, bitmap_height: u32) -> f32 {
        bitmap_height as f32 * self.image_width() / bitmap_width as f32
    }
}

/// Configuration for the scan pipeline.
///
/// Built via [`ScanConfig::builder()`] or using [`ScanConfig::default()`].
///
/// # Example
/// ```rust
/// use paperscan::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .output_name("receipt.pdf")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ScanConfig {
    /// Output page geometry and PDF-source canvas constants.
    pub layout: PageLayout,

    /// Optional decorative background image for the output page.
    ///
    /// Stretched to fill the full page. When `None`, a generated warm
    /// paper gradient is used, so the crate ships no binary asset.
    pub background: Option<PathBuf>,

    /// File name used when no explicit output path is given.
    /// Default: `scanned-document.pdf`.
    pub output_name: String,

    /// Optional per-stage progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            background: None,
            output_name: "scanned-document.pdf".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("layout", &self.layout)
            .field("background", &self.background)
            .field("output_name", &self.output_name)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ScanProgressCallback>"),
            )
            .finish()
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn background(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.background = Some(path.into());
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_name = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating layout constraints.
    pub fn build(self) -> Result<ScanConfig, ScanError> {
        let l = &self.config.layout;
        if l.page_width <= 0.0 || l.page_height <= 0.0 {
            return Err(ScanError::InvalidConfig(format!(
                "Page dimensions must be positive, got {}×{}",
                l.page_width, l.page_height
            )));
        }
        if l.reduction < 1.0 {
            return Err(ScanError::InvalidConfig(format!(
                "Reduction factor must be ≥ 1.0, got {}",
                l.reduction
            )));
        }
        if l.pdf_zoom <= 0.0 {
            return Err(ScanError::InvalidConfig(format!(
                "PDF zoom must be positive, got {}",
                l.pdf_zoom
            )));
        }
        if self.config.output_name.is_empty() {
            return Err(ScanError::InvalidConfig(
                "Output name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
