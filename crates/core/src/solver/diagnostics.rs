//! Scalar summaries of a velocity field, for logging, demos and tests

use super::fields::FieldView;
use crate::core_types::Vec2;

/// Mean kinetic energy per cell: `0.5 * <vx² + vy²>` over every cell.
pub fn kinetic_energy(velocity: &FieldView<'_>) -> f64 {
    let values = velocity.as_slice();
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| f64::from(v) * f64::from(v)).sum();
    0.5 * sum / (velocity.width() * velocity.height()) as f64
}

/// Largest velocity magnitude in the field.
pub fn max_speed(velocity: &FieldView<'_>) -> f32 {
    let mut max = 0.0_f32;
    for y in 0..velocity.height() {
        for x in 0..velocity.width() {
            max = max.max(velocity.vector_at(x, y).norm());
        }
    }
    max
}

/// Mean absolute central-difference divergence over interior cells.
///
/// Differences are taken between neighbors one cell apart, in velocity units
/// per cell, without the timestep scaling the divergence stage applies.
/// Returns 0 for grids without interior cells.
pub fn mean_abs_divergence(velocity: &FieldView<'_>) -> f64 {
    let width = velocity.width();
    let height = velocity.height();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let right: Vec2 = velocity.texel(x + 1, y);
            let left: Vec2 = velocity.texel(x - 1, y);
            let top: Vec2 = velocity.texel(x, y + 1);
            let bottom: Vec2 = velocity.texel(x, y - 1);
            let div = 0.5 * ((right.x - left.x) + (top.y - bottom.y));
            sum += f64::from(div.abs());
        }
    }
    sum / ((width - 2) * (height - 2)) as f64
}
