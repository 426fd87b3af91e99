//! Grid sizing and quality presets
//!
//! The simulation grid is a fraction of the viewport resolution. A quality
//! preset picks that fraction; `GridLayout` turns a viewport and a fraction
//! into grid dimensions, the per-texel cell scale used by stencils, and the
//! aspect-corrected cell scale that sizes the cursor footprint.

use super::context::{DeviceClass, Viewport};
use crate::core_types::Vec2;

/// Viewport width (at resolution factor 1) above which the cursor footprint
/// shrinks with the grid rather than staying a fixed fraction of it.
const ASPECT_REFERENCE_WIDTH: f32 = 1100.0;

/// Quality preset determining the grid resolution factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityPreset {
    /// Full viewport resolution
    Ultra,
    /// Three quarters of the viewport resolution
    High,
    /// Half the viewport resolution
    Medium,
    /// Quarter of the viewport resolution
    Low,
}

impl QualityPreset {
    /// Grid cells per viewport pixel for this preset
    pub const fn resolution_factor(&self) -> f32 {
        match self {
            Self::Ultra => 1.0,
            Self::High => 0.75,
            Self::Medium => 0.5,
            Self::Low => 0.25,
        }
    }

    /// Recommended preset for a device class
    ///
    /// # Returns
    ///
    /// `Medium` on desktop, `Low` on mobile devices
    pub const fn recommended(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Desktop => Self::Medium,
            DeviceClass::Mobile => Self::Low,
        }
    }
}

/// Grid dimensions and cell scales derived from a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// `(1/width, 1/height)`, the UV size of one texel
    pub cell_scale: Vec2,
    /// Aspect-corrected scale sizing the force footprint
    pub force_cell_scale: Vec2,
}

impl GridLayout {
    /// Size a grid for `viewport` at `resolution_factor` cells per pixel.
    ///
    /// # Arguments
    ///
    /// * `viewport` - Viewport in pixels
    /// * `resolution_factor` - Grid cells per viewport pixel (> 0)
    ///
    /// # Returns
    ///
    /// Layout with each dimension at least 1
    pub fn from_viewport(viewport: Viewport, resolution_factor: f32) -> Self {
        let width = grid_extent(viewport.width(), resolution_factor);
        let height = grid_extent(viewport.height(), resolution_factor);
        let cell_scale = Vec2::new(1.0 / width as f32, 1.0 / height as f32);

        let threshold = ASPECT_REFERENCE_WIDTH * resolution_factor;
        let ratio = threshold / width as f32;
        let correction = if width as f32 > threshold {
            ratio
        } else {
            1.0 - (1.0 - ratio) * 0.5
        };

        Self {
            width,
            height,
            cell_scale,
            force_cell_scale: cell_scale * correction,
        }
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

fn grid_extent(pixels: u32, resolution_factor: f32) -> usize {
    let cells = (f64::from(pixels) * f64::from(resolution_factor)).round();
    (cells as usize).max(1)
}
