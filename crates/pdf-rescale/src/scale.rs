//! Per-page scaling decisions
//!
//! Given the size of a source page and the target page, this module decides:
//! - Whether the target page is turned to landscape for wide content
//! - Whether and how much the content is scaled
//! - Where the scaled content sits inside the usable area
//!
//! Everything here is pure; no document is touched.

use crate::options::{ScalingConfig, ScalingMode};
use crate::types::*;

/// Scale, placement and final page geometry for one source page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    /// Whether the scaling mode asked for fit factors, even if they came out as 1
    pub scaling_applied: bool,
    /// Horizontal offset of the content inside the usable area
    pub offset_x: f32,
    /// Vertical offset of the content inside the usable area
    pub offset_y: f32,
    /// Size of the emitted page, after any landscape swap
    pub page_size: Dimensions,
    pub orientation: Orientation,
    /// Usable area of `page_size`, the box the decision was made against
    pub usable: UsableArea,
    /// Source content size the transform was computed for
    pub content_size: Dimensions,
}

/// Where the content lands on the output page, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale_x: f32,
    pub scale_y: f32,
    /// Left edge of the scaled content
    pub x: f32,
    /// Bottom edge of the scaled content
    pub y: f32,
}

impl ScaledTransform {
    /// Content size after scaling
    pub fn scaled_size(&self) -> Dimensions {
        Dimensions::new(
            self.content_size.width * self.scale_x,
            self.content_size.height * self.scale_y,
        )
    }

    /// Whether the content went through scaling; see `scaling_applied`
    pub fn is_scaled(&self) -> bool {
        self.scaling_applied
    }

    /// Whether the scaled content still extends past the usable area
    pub fn overflows(&self, tolerance: f32) -> bool {
        let scaled = self.scaled_size();
        scaled.width > self.usable.width + tolerance
            || scaled.height > self.usable.height + tolerance
    }

    /// Translate the usable-area offsets into page coordinates
    pub fn placement(&self, margins: &Margins) -> Placement {
        Placement {
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            x: margins.left + self.offset_x,
            y: margins.bottom + self.offset_y,
        }
    }
}

/// Compute how a page of `content_size` is placed on the target page.
///
/// # Arguments
/// * `content_size` - Size of the source page content in points
/// * `target` - Nominal output page and margins
/// * `config` - Scaling behaviour
///
/// # Errors
/// * `InvalidContent` if either content side is zero, negative or not finite
/// * `InvalidTargetGeometry` if the margins leave no usable area
pub fn scale_page(
    content_size: Dimensions,
    target: &TargetPageSpec,
    config: &ScalingConfig,
) -> Result<ScaledTransform> {
    if !content_size.is_positive() {
        return Err(RescaleError::InvalidContent {
            width: content_size.width,
            height: content_size.height,
        });
    }

    let base_usable = target.usable_area()?;
    let (page_size, orientation) = choose_orientation(
        content_size,
        target.page_size,
        &base_usable,
        config.enable_dynamic_landscape,
    );

    let usable = if orientation == Orientation::Landscape {
        UsableArea::new(page_size, &target.margins)?
    } else {
        base_usable
    };

    let scaling_applied = scaling_enabled(content_size, &usable, config.mode);
    let (scale_x, scale_y) = if scaling_applied {
        calculate_scale(content_size, &usable, config.maintain_aspect_ratio)
    } else {
        (1.0, 1.0)
    };

    let (offset_x, offset_y) = if config.enable_centering {
        (
            (usable.width - content_size.width * scale_x) / 2.0,
            (usable.height - content_size.height * scale_y) / 2.0,
        )
    } else {
        (0.0, 0.0)
    };

    Ok(ScaledTransform {
        scale_x,
        scale_y,
        scaling_applied,
        offset_x,
        offset_y,
        page_size,
        orientation,
        usable,
        content_size,
    })
}

/// Turn a portrait target to landscape when the content is wider than tall.
fn choose_orientation(
    content_size: Dimensions,
    page_size: Dimensions,
    base_usable: &UsableArea,
    dynamic_landscape: bool,
) -> (Dimensions, Orientation) {
    if dynamic_landscape && content_size.is_landscape() && base_usable.is_portrait() {
        (page_size.rotated(), Orientation::Landscape)
    } else {
        (page_size, Orientation::Portrait)
    }
}

fn scaling_enabled(content_size: Dimensions, usable: &UsableArea, mode: ScalingMode) -> bool {
    match mode {
        ScalingMode::Always => true,
        ScalingMode::ScaleDownOnly => {
            content_size.width > usable.width || content_size.height > usable.height
        }
        ScalingMode::ScaleUpOnly => {
            content_size.width < usable.width || content_size.height < usable.height
        }
    }
}

/// Calculate (x, y) scale factors for fitting content into the usable area.
fn calculate_scale(
    content_size: Dimensions,
    usable: &UsableArea,
    maintain_aspect_ratio: bool,
) -> (f32, f32) {
    let scale_w = usable.width / content_size.width;
    let scale_h = usable.height / content_size.height;

    if maintain_aspect_ratio {
        let scale = scale_w.min(scale_h);
        (scale, scale)
    } else {
        (scale_w, scale_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> TargetPageSpec {
        TargetPageSpec::new(Dimensions::new(612.0, 792.0), Margins::default())
    }

    fn config(mode: ScalingMode) -> ScalingConfig {
        ScalingConfig {
            mode,
            ..ScalingConfig::DEFAULT
        }
    }

    #[test]
    fn test_scale_fit() {
        let target = TargetPageSpec::new(Dimensions::new(400.0, 400.0), Margins::default());

        // 800x600 into 400x400 is width-limited
        let t = scale_page(
            Dimensions::new(800.0, 600.0),
            &target,
            &config(ScalingMode::Always),
        )
        .unwrap();
        assert!((t.scale_x - 0.5).abs() < 0.001);
        assert_eq!(t.scale_x, t.scale_y);

        // 400x800 into 400x400 is height-limited
        let t = scale_page(
            Dimensions::new(400.0, 800.0),
            &target,
            &config(ScalingMode::Always),
        )
        .unwrap();
        assert!((t.scale_y - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_square_target_never_turns() {
        let target = TargetPageSpec::new(Dimensions::new(400.0, 400.0), Margins::default());
        let t = scale_page(Dimensions::new(800.0, 600.0), &target, &ScalingConfig::DEFAULT).unwrap();
        assert_eq!(t.orientation, Orientation::Portrait);
        assert_eq!(t.page_size, Dimensions::new(400.0, 400.0));
    }

    #[test]
    fn test_stretch_without_aspect_ratio() {
        let cfg = ScalingConfig {
            mode: ScalingMode::Always,
            maintain_aspect_ratio: false,
            enable_dynamic_landscape: false,
            ..ScalingConfig::DEFAULT
        };
        let t = scale_page(Dimensions::new(306.0, 198.0), &letter(), &cfg).unwrap();
        assert!((t.scale_x - 2.0).abs() < 0.001);
        assert!((t.scale_y - 4.0).abs() < 0.001);
        assert!(t.offset_x.abs() < 0.001);
        assert!(t.offset_y.abs() < 0.001);
    }

    #[test]
    fn test_scale_up_only() {
        let t = scale_page(
            Dimensions::new(306.0, 396.0),
            &letter(),
            &config(ScalingMode::ScaleUpOnly),
        )
        .unwrap();
        assert!((t.scale_x - 2.0).abs() < 0.001);

        // Oversized content is left alone
        let t = scale_page(
            Dimensions::new(700.0, 900.0),
            &letter(),
            &config(ScalingMode::ScaleUpOnly),
        )
        .unwrap();
        assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));
        assert!(t.overflows(0.01));
    }

    #[test]
    fn test_overflowing_content_keeps_negative_offsets() {
        let cfg = ScalingConfig {
            mode: ScalingMode::ScaleUpOnly,
            enable_dynamic_landscape: false,
            ..ScalingConfig::DEFAULT
        };
        let t = scale_page(Dimensions::new(712.0, 892.0), &letter(), &cfg).unwrap();
        assert!((t.offset_x + 50.0).abs() < 0.001);
        assert!((t.offset_y + 50.0).abs() < 0.001);
    }

    #[test]
    fn test_landscape_uses_rotated_usable_area() {
        let target = TargetPageSpec::new(
            Dimensions::new(612.0, 792.0),
            Margins {
                left: 10.0,
                right: 10.0,
                top: 20.0,
                bottom: 20.0,
            },
        );
        let t = scale_page(
            Dimensions::new(1000.0, 500.0),
            &target,
            &config(ScalingMode::Always),
        )
        .unwrap();
        assert_eq!(t.orientation, Orientation::Landscape);
        assert_eq!(t.page_size, Dimensions::new(792.0, 612.0));
        assert_eq!(t.usable.width, 772.0);
        assert_eq!(t.usable.height, 572.0);
        assert!((t.scale_x - 0.772).abs() < 0.0001);
    }

    #[test]
    fn test_exact_fit_in_always_mode_counts_as_scaled() {
        let t = scale_page(
            Dimensions::new(612.0, 792.0),
            &letter(),
            &config(ScalingMode::Always),
        )
        .unwrap();
        assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));
        assert!(t.is_scaled());

        let t = scale_page(Dimensions::new(612.0, 792.0), &letter(), &ScalingConfig::DEFAULT).unwrap();
        assert!(!t.is_scaled());
    }

    #[test]
    fn test_centering_disabled() {
        let cfg = ScalingConfig {
            enable_centering: false,
            ..ScalingConfig::DEFAULT
        };
        let t = scale_page(Dimensions::new(200.0, 200.0), &letter(), &cfg).unwrap();
        assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));
    }

    #[test]
    fn test_placement_adds_margins() {
        let target = TargetPageSpec::new(Dimensions::new(612.0, 792.0), Margins::uniform(36.0));
        let t = scale_page(Dimensions::new(200.0, 200.0), &target, &ScalingConfig::DEFAULT).unwrap();
        let p = t.placement(&target.margins);
        assert_eq!(p.x, 36.0 + (540.0 - 200.0) / 2.0);
        assert_eq!(p.y, 36.0 + (720.0 - 200.0) / 2.0);
    }

    #[test]
    fn test_non_finite_content_rejected() {
        let result = scale_page(
            Dimensions::new(f32::NAN, 100.0),
            &letter(),
            &ScalingConfig::DEFAULT,
        );
        assert!(matches!(result, Err(RescaleError::InvalidContent { .. })));
    }
}
