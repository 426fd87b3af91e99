//! Generic full-grid transform
//!
//! Every solver stage is a `ComputePass`: a rule evaluated independently for
//! each covered destination cell from read-only inputs. Rows are evaluated in
//! parallel with Rayon; the pass returns only after every row is written.

use super::fields::{FieldTarget, Texel};
use crate::core_types::Vec2;
use rayon::prelude::*;

/// How a pass combines its result with the destination value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Overwrite the destination
    Replace,
    /// Add onto the destination (force splat only)
    Additive,
}

/// Half-open rectangle of cells `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// First column
    pub x0: usize,
    /// One past the last column
    pub x1: usize,
    /// First row
    pub y0: usize,
    /// One past the last row
    pub y1: usize,
}

impl CellRect {
    /// Every cell of a `width × height` grid
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            x1: width,
            y0: 0,
            y1: height,
        }
    }

    /// Every cell except the outermost ring. Empty for grids narrower than 3.
    pub fn interior(width: usize, height: usize) -> Self {
        Self {
            x0: 1,
            x1: width.saturating_sub(1).max(1),
            y0: 1,
            y1: height.saturating_sub(1).max(1),
        }
    }

    /// Cells covered by both rectangles
    pub fn intersect(self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            x1: self.x1.min(other.x1),
            y0: self.y0.max(other.y0),
            y1: self.y1.min(other.y1),
        }
    }

    /// Whether no cell is covered
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Whether cell `(x, y)` is covered
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }
}

/// Destination cell handed to `ComputePass::compute`.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// UV of the cell center
    pub uv: Vec2,
}

/// A per-cell rule reading only its own inputs, never the destination.
pub trait ComputePass: Sync {
    /// Value written per cell
    type Output: Texel;

    /// Evaluate the rule for one destination cell.
    fn compute(&self, cell: Cell) -> Self::Output;
}

/// Evaluate `pass` over `region` of `target`.
///
/// # Arguments
///
/// * `pass` - Rule to evaluate
/// * `target` - Destination buffer; must not back any of the pass inputs
/// * `region` - Cells to write; clipped to the grid
/// * `blend` - Whether results overwrite or add onto the destination
pub fn execute<P: ComputePass>(
    pass: &P,
    target: &mut FieldTarget<'_>,
    region: CellRect,
    blend: Blend,
) {
    let width = target.width();
    let height = target.height();
    let components = target.components();
    debug_assert_eq!(<P::Output as Texel>::COMPONENTS, components);

    let region = region.intersect(CellRect::full(width, height));
    if region.is_empty() {
        return;
    }

    let precision = target.precision();
    let inv_width = 1.0 / width as f32;
    let inv_height = 1.0 / height as f32;
    let row_len = width * components;
    let rows = &mut target.as_mut_slice()[region.y0 * row_len..region.y1 * row_len];

    rows.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(offset, row)| {
            let y = region.y0 + offset;
            let v = (y as f32 + 0.5) * inv_height;
            for x in region.x0..region.x1 {
                let cell = Cell {
                    x,
                    y,
                    uv: Vec2::new((x as f32 + 0.5) * inv_width, v),
                };
                let value = pass.compute(cell);
                let texel = &mut row[x * components..(x + 1) * components];
                match blend {
                    Blend::Replace => value.store(texel, precision),
                    Blend::Additive => value.accumulate(texel, precision),
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::fields::{Field, StoragePrecision};

    struct CoordinatePass;

    impl ComputePass for CoordinatePass {
        type Output = f32;

        fn compute(&self, cell: Cell) -> f32 {
            (cell.y * 10 + cell.x) as f32
        }
    }

    struct ConstantPass(Vec2);

    impl ComputePass for ConstantPass {
        type Output = Vec2;

        fn compute(&self, _cell: Cell) -> Vec2 {
            self.0
        }
    }

    #[test]
    fn test_full_region_writes_every_cell() {
        let mut field = Field::new("test", 4, 3, 1, StoragePrecision::Full).unwrap();
        execute(
            &CoordinatePass,
            &mut field.write_target(),
            CellRect::full(4, 3),
            Blend::Replace,
        );
        field.swap();
        let view = field.read();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(view.scalar_at(x, y), (y * 10 + x) as f32);
            }
        }
    }

    #[test]
    fn test_interior_region_leaves_ring_untouched() {
        let mut field = Field::new("test", 5, 5, 2, StoragePrecision::Full).unwrap();
        execute(
            &ConstantPass(Vec2::new(1.0, 2.0)),
            &mut field.current_mut(),
            CellRect::interior(5, 5),
            Blend::Replace,
        );
        let view = field.read();
        for y in 0..5 {
            for x in 0..5 {
                let expected = if CellRect::interior(5, 5).contains(x, y) {
                    Vec2::new(1.0, 2.0)
                } else {
                    Vec2::zeros()
                };
                assert_eq!(view.vector_at(x, y), expected);
            }
        }
    }

    #[test]
    fn test_additive_blend_accumulates() {
        let mut field = Field::new("test", 3, 3, 2, StoragePrecision::Full).unwrap();
        let pass = ConstantPass(Vec2::new(0.5, -1.0));
        for _ in 0..2 {
            execute(
                &pass,
                &mut field.current_mut(),
                CellRect::full(3, 3),
                Blend::Additive,
            );
        }
        assert_eq!(field.read().vector_at(1, 1), Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_interior_of_tiny_grid_is_empty() {
        assert!(CellRect::interior(2, 2).is_empty());
        assert!(CellRect::interior(1, 5).is_empty());
        assert!(!CellRect::interior(3, 3).is_empty());
    }

    #[test]
    fn test_region_is_clipped_to_grid() {
        let mut field = Field::new("test", 2, 2, 1, StoragePrecision::Full).unwrap();
        let oversized = CellRect {
            x0: 0,
            x1: 100,
            y0: 1,
            y1: 100,
        };
        execute(
            &CoordinatePass,
            &mut field.current_mut(),
            oversized,
            Blend::Replace,
        );
        assert_eq!(field.read().scalar_at(0, 0), 0.0);
        assert_eq!(field.read().scalar_at(1, 1), 11.0);
    }
}
