//! Vector type alias for 2D positions, displacements and velocities.

use nalgebra::Vector2;

/// 2D vector type for pointer positions, UV coordinates and cell velocities.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the solver for normalized pointer coordinates, texture-space sample
/// positions and the two-component velocity stored in each cell.
pub type Vec2 = Vector2<f32>;
