use crate::constants::{DEFAULT_PAGE_HEIGHT_PT, DEFAULT_PAGE_WIDTH_PT, mm_to_pt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RescaleError {
    #[error("Missing input: {0}")]
    NullOrMissingInput(String),
    #[error("Invalid content size {width} x {height}")]
    InvalidContent { width: f32, height: f32 },
    #[error("Invalid target geometry: {0}")]
    InvalidTargetGeometry(String),
    #[error("Failed to import page {index}: {cause}")]
    PageImportFailed { index: usize, cause: String },
    #[error("Unsupported stream filter: {0}")]
    UnsupportedFilter(String),
    #[error("Failed to write page: {0}")]
    PageWriteFailed(String),
    #[error("Rewrite aborted at page {index}: {source}")]
    RewriteAborted {
        index: usize,
        #[source]
        source: Box<RescaleError>,
    },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl RescaleError {
    /// The innermost error, looking through `RewriteAborted` wrappers.
    pub fn root_cause(&self) -> &RescaleError {
        match self {
            RescaleError::RewriteAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RescaleError>;

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Width and height in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Same size turned by 90 degrees
    pub fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }

    /// Both sides finite and strictly positive
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    /// Create uniform margins on all sides
    pub fn uniform(margin_pt: f32) -> Self {
        Self {
            left: margin_pt,
            right: margin_pt,
            top: margin_pt,
            bottom: margin_pt,
        }
    }

    /// Create uniform margins from a millimeter value
    pub fn uniform_mm(margin_mm: f32) -> Self {
        Self::uniform(mm_to_pt(margin_mm))
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions in points with orientation applied
    pub fn dimensions_pt(self, orientation: Orientation) -> Dimensions {
        let (w, h) = self.dimensions_mm();
        let portrait = Dimensions::new(mm_to_pt(w), mm_to_pt(h));
        match orientation {
            Orientation::Portrait => portrait,
            Orientation::Landscape => portrait.rotated(),
        }
    }
}

/// The nominal output page: size plus margins, before any landscape swap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetPageSpec {
    pub page_size: Dimensions,
    pub margins: Margins,
}

impl Default for TargetPageSpec {
    fn default() -> Self {
        Self {
            page_size: Dimensions::new(DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT),
            margins: Margins::default(),
        }
    }
}

impl TargetPageSpec {
    pub fn new(page_size: Dimensions, margins: Margins) -> Self {
        Self { page_size, margins }
    }

    pub fn from_paper(paper: PaperSize, orientation: Orientation, margins: Margins) -> Self {
        Self::new(paper.dimensions_pt(orientation), margins)
    }

    /// Usable area of the nominal page size
    pub fn usable_area(&self) -> Result<UsableArea> {
        UsableArea::new(self.page_size, &self.margins)
    }

    /// Check page size and margins without computing anything else
    pub fn validate(&self) -> Result<()> {
        self.usable_area().map(|_| ())
    }
}

/// Page size minus margins; the box content is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsableArea {
    pub width: f32,
    pub height: f32,
}

impl UsableArea {
    /// Derive the usable area for `page_size`.
    ///
    /// Fails when the page is not a positive finite size, when a margin is
    /// negative, or when the margins leave no room on either axis.
    pub fn new(page_size: Dimensions, margins: &Margins) -> Result<Self> {
        if !page_size.is_positive() {
            return Err(RescaleError::InvalidTargetGeometry(format!(
                "page size must be positive, got {} x {}",
                page_size.width, page_size.height
            )));
        }

        let sides = [margins.left, margins.right, margins.top, margins.bottom];
        if sides.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(RescaleError::InvalidTargetGeometry(format!(
                "margins must be non-negative, got {:?}",
                margins
            )));
        }

        let width = page_size.width - margins.horizontal();
        let height = page_size.height - margins.vertical();
        if width <= 0.0 || height <= 0.0 {
            return Err(RescaleError::InvalidTargetGeometry(format!(
                "margins leave no usable area on a {} x {} page ({} x {})",
                page_size.width, page_size.height, width, height
            )));
        }

        Ok(Self { width, height })
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}
