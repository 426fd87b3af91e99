//! Double-buffered field storage
//!
//! A `Field` stores one or two `f32` components per cell in two flat,
//! row-major buffers. Exactly one buffer is the current read buffer; stages
//! write the other one and then `swap`, so a pass never reads what it is
//! writing. Which buffer is current is tracked by index rather than by moving
//! buffers around, so even and odd iteration counts behave the same.

use crate::core_types::Vec2;
use crate::error::FluidError;
use serde::{Deserialize, Serialize};

/// Numeric precision of stored field values.
///
/// `Half` models the half-float render targets used on mobile/low-power
/// devices: every stored value is rounded to the nearest `f16`-representable
/// number (saturating at ±65504).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoragePrecision {
    /// 32-bit float storage
    Full,
    /// 16-bit float storage
    Half,
}

const HALF_MAX: f32 = 65504.0;
const HALF_MIN_NORMAL: f32 = 6.103_515_6e-5; // 2^-14
const HALF_SUBNORMAL_STEP: f32 = 5.960_464_5e-8; // 2^-24

impl StoragePrecision {
    /// Round `value` to what this precision can store.
    #[inline]
    pub fn quantize(self, value: f32) -> f32 {
        match self {
            Self::Full => value,
            Self::Half => round_to_half(value),
        }
    }
}

fn round_to_half(value: f32) -> f32 {
    if value == 0.0 || value.is_nan() {
        return value;
    }
    let magnitude = value.abs();
    if magnitude >= HALF_MAX {
        return HALF_MAX.copysign(value);
    }
    if magnitude < HALF_MIN_NORMAL {
        return (value / HALF_SUBNORMAL_STEP).round() * HALF_SUBNORMAL_STEP;
    }
    // Drop 13 of the 23 mantissa bits, rounding half to even
    let bits = value.to_bits();
    let rounded = bits + 0x0000_0FFF + ((bits >> 13) & 1);
    let result = f32::from_bits(rounded & 0xFFFF_E000);
    result.clamp(-HALF_MAX, HALF_MAX)
}

/// A value stored in a single cell: a scalar or a 2-component vector.
pub trait Texel: Copy + Send + Sync + 'static {
    /// Number of `f32` components per cell
    const COMPONENTS: usize;

    /// All-zero value
    fn zero() -> Self;

    /// Read from a cell slice of length `COMPONENTS`
    fn load(src: &[f32]) -> Self;

    /// Overwrite a cell slice
    fn store(self, dst: &mut [f32], precision: StoragePrecision);

    /// Add onto a cell slice
    fn accumulate(self, dst: &mut [f32], precision: StoragePrecision);

    /// Linear interpolation between `a` and `b`
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Texel for f32 {
    const COMPONENTS: usize = 1;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn load(src: &[f32]) -> Self {
        src[0]
    }

    #[inline]
    fn store(self, dst: &mut [f32], precision: StoragePrecision) {
        dst[0] = precision.quantize(self);
    }

    #[inline]
    fn accumulate(self, dst: &mut [f32], precision: StoragePrecision) {
        dst[0] = precision.quantize(dst[0] + self);
    }

    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Texel for Vec2 {
    const COMPONENTS: usize = 2;

    #[inline]
    fn zero() -> Self {
        Vec2::zeros()
    }

    #[inline]
    fn load(src: &[f32]) -> Self {
        Vec2::new(src[0], src[1])
    }

    #[inline]
    fn store(self, dst: &mut [f32], precision: StoragePrecision) {
        dst[0] = precision.quantize(self.x);
        dst[1] = precision.quantize(self.y);
    }

    #[inline]
    fn accumulate(self, dst: &mut [f32], precision: StoragePrecision) {
        dst[0] = precision.quantize(dst[0] + self.x);
        dst[1] = precision.quantize(dst[1] + self.y);
    }

    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

#[inline]
fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

/// Read-only view of one buffer of a field.
///
/// This is the handle handed to consumers: it samples with the same
/// bilinear, clamp-to-edge rule a texture sampler would use.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
    components: usize,
}

static NEUTRAL_VELOCITY: [f32; 2] = [0.0; 2];

impl<'a> FieldView<'a> {
    /// Wrap a raw row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * components` or a dimension is zero.
    pub fn new(data: &'a [f32], width: usize, height: usize, components: usize) -> Self {
        assert!(width >= 1 && height >= 1, "Field dimensions must be at least 1");
        assert_eq!(
            data.len(),
            width * height * components,
            "Buffer length does not match field dimensions"
        );
        Self {
            data,
            width,
            height,
            components,
        }
    }

    /// A 1×1 zero velocity field, sampled when the effect is unavailable.
    pub fn neutral_velocity() -> FieldView<'static> {
        FieldView {
            data: &NEUTRAL_VELOCITY,
            width: 1,
            height: 1,
            components: 2,
        }
    }

    /// Grid width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Components per cell (1 or 2)
    pub fn components(&self) -> usize {
        self.components
    }

    /// Size of one cell in UV units: `(1/width, 1/height)`
    pub fn cell_scale(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Raw values in row-major order, components interleaved
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Raw bytes, for uploading into a consumer texture without copying
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.data)
    }

    /// Value stored at cell `(x, y)`.
    #[inline]
    pub fn texel<T: Texel>(&self, x: usize, y: usize) -> T {
        debug_assert_eq!(T::COMPONENTS, self.components);
        let start = (y * self.width + x) * self.components;
        T::load(&self.data[start..start + T::COMPONENTS])
    }

    /// Velocity at cell `(x, y)` (two-component fields)
    #[inline]
    pub fn vector_at(&self, x: usize, y: usize) -> Vec2 {
        self.texel(x, y)
    }

    /// Scalar at cell `(x, y)` (one-component fields)
    #[inline]
    pub fn scalar_at(&self, x: usize, y: usize) -> f32 {
        self.texel(x, y)
    }

    /// Bilinear sample at a UV position with clamp-to-edge addressing.
    ///
    /// Cell centers sit at `((x + 0.5) / width, (y + 0.5) / height)`.
    #[inline]
    pub fn sample<T: Texel>(&self, uv: Vec2) -> T {
        let gx = uv.x * self.width as f32 - 0.5;
        let gy = uv.y * self.height as f32 - 0.5;
        let fx = gx.floor();
        let fy = gy.floor();
        let tx = gx - fx;
        let ty = gy - fy;

        let x0 = clamp_index(fx as i64, self.width);
        let x1 = clamp_index(fx as i64 + 1, self.width);
        let y0 = clamp_index(fy as i64, self.height);
        let y1 = clamp_index(fy as i64 + 1, self.height);

        let bottom = T::lerp(self.texel(x0, y0), self.texel(x1, y0), tx);
        let top = T::lerp(self.texel(x0, y1), self.texel(x1, y1), tx);
        T::lerp(bottom, top, ty)
    }

    /// Sample velocity at a normalized `[-1, 1]` position, the coordinate
    /// convention used for pointer input.
    pub fn sample_normalized(&self, position: Vec2) -> Vec2 {
        let uv = (position + Vec2::new(1.0, 1.0)) * 0.5;
        self.sample(uv)
    }
}

/// Mutable handle on the buffer a pass writes.
pub struct FieldTarget<'a> {
    data: &'a mut [f32],
    width: usize,
    height: usize,
    components: usize,
    precision: StoragePrecision,
}

impl FieldTarget<'_> {
    /// Grid width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Components per cell
    pub fn components(&self) -> usize {
        self.components
    }

    /// Precision writes are rounded to
    pub fn precision(&self) -> StoragePrecision {
        self.precision
    }

    /// Raw values, mutable
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.data
    }

    /// Overwrite cell `(x, y)`.
    #[inline]
    pub fn store<T: Texel>(&mut self, x: usize, y: usize, value: T) {
        debug_assert_eq!(T::COMPONENTS, self.components);
        let start = (y * self.width + x) * self.components;
        value.store(&mut self.data[start..start + T::COMPONENTS], self.precision);
    }

    /// Copy every value from `source`, which must have the same shape.
    pub fn copy_from(&mut self, source: &FieldView<'_>) {
        assert_eq!(
            (source.width, source.height, source.components),
            (self.width, self.height, self.components),
            "Field shapes differ"
        );
        self.data.copy_from_slice(source.data);
    }
}

fn alloc_buffer(label: &'static str, len: usize) -> Result<Vec<f32>, FluidError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| FluidError::Allocation { field: label, len })?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}

/// Double-buffered 2D grid of scalars or 2-vectors.
#[derive(Debug, Clone)]
pub struct Field {
    label: &'static str,
    width: usize,
    height: usize,
    components: usize,
    precision: StoragePrecision,
    buffers: [Vec<f32>; 2],
    read: usize,
}

impl Field {
    /// Allocate a zero-initialized field.
    ///
    /// # Arguments
    ///
    /// * `label` - Debug name used in logs and errors
    /// * `width`, `height` - Grid dimensions in cells (at least 1)
    /// * `components` - 1 for scalars, 2 for velocity
    /// * `precision` - Storage precision applied on every write
    ///
    /// # Errors
    ///
    /// Returns `FluidError::Allocation` if the allocator refuses either buffer.
    pub fn new(
        label: &'static str,
        width: usize,
        height: usize,
        components: usize,
        precision: StoragePrecision,
    ) -> Result<Self, FluidError> {
        debug_assert!(components == 1 || components == 2);
        let width = width.max(1);
        let height = height.max(1);
        let len = width
            .checked_mul(height)
            .and_then(|cells| cells.checked_mul(components))
            .ok_or(FluidError::Allocation {
                field: label,
                len: usize::MAX,
            })?;

        Ok(Self {
            label,
            width,
            height,
            components,
            precision,
            buffers: [alloc_buffer(label, len)?, alloc_buffer(label, len)?],
            read: 0,
        })
    }

    /// Debug name
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Grid width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Components per cell
    pub fn components(&self) -> usize {
        self.components
    }

    /// Storage precision
    pub fn precision(&self) -> StoragePrecision {
        self.precision
    }

    /// Size of one cell in UV units
    pub fn cell_scale(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Index (0 or 1) of the current read buffer
    pub fn read_index(&self) -> usize {
        self.read
    }

    /// View of the current read buffer
    pub fn read(&self) -> FieldView<'_> {
        FieldView {
            data: &self.buffers[self.read],
            width: self.width,
            height: self.height,
            components: self.components,
        }
    }

    /// The current read buffer as a write target, for in-place blends.
    pub fn current_mut(&mut self) -> FieldTarget<'_> {
        FieldTarget {
            data: &mut self.buffers[self.read],
            width: self.width,
            height: self.height,
            components: self.components,
            precision: self.precision,
        }
    }

    /// Borrow the read buffer and the write buffer at the same time.
    pub fn split(&mut self) -> (FieldView<'_>, FieldTarget<'_>) {
        let (first, second) = self.buffers.split_at_mut(1);
        let (read, write) = if self.read == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };
        (
            FieldView {
                data: read,
                width: self.width,
                height: self.height,
                components: self.components,
            },
            FieldTarget {
                data: write,
                width: self.width,
                height: self.height,
                components: self.components,
                precision: self.precision,
            },
        )
    }

    /// The write buffer alone, for passes whose inputs live in other fields.
    pub fn write_target(&mut self) -> FieldTarget<'_> {
        self.split().1
    }

    /// Make the write buffer the read buffer.
    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }

    /// Zero both buffers.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_field_creation_is_zeroed() {
        let field = Field::new("velocity", 10, 20, 2, StoragePrecision::Full).unwrap();
        assert_eq!(field.width(), 10);
        assert_eq!(field.height(), 20);
        assert_eq!(field.read().as_slice().len(), 400);
        assert!(field.read().as_slice().iter().all(|&v| v == 0.0));
        assert_relative_eq!(field.cell_scale().x, 0.1);
        assert_relative_eq!(field.cell_scale().y, 0.05);
    }

    #[test]
    fn test_zero_dimensions_are_clamped() {
        let field = Field::new("pressure", 0, 0, 1, StoragePrecision::Full).unwrap();
        assert_eq!((field.width(), field.height()), (1, 1));
    }

    #[test]
    fn test_split_writes_other_buffer() {
        let mut field = Field::new("pressure", 4, 4, 1, StoragePrecision::Full).unwrap();
        {
            let (read, mut write) = field.split();
            assert_eq!(read.scalar_at(1, 1), 0.0);
            write.store(1, 1, 3.5_f32);
        }
        // Not visible until swapped
        assert_eq!(field.read().scalar_at(1, 1), 0.0);
        field.swap();
        assert_eq!(field.read().scalar_at(1, 1), 3.5);
        assert_eq!(field.read_index(), 1);

        // Swapping twice returns to the original buffer
        field.swap();
        assert_eq!(field.read_index(), 0);
        assert_eq!(field.read().scalar_at(1, 1), 0.0);
    }

    #[test]
    fn test_sample_at_cell_center_returns_texel() {
        let mut field = Field::new("velocity", 4, 4, 2, StoragePrecision::Full).unwrap();
        field.current_mut().store(2, 1, Vec2::new(1.0, -2.0));

        let uv = Vec2::new(2.5 / 4.0, 1.5 / 4.0);
        let v: Vec2 = field.read().sample(uv);
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, -2.0);
    }

    #[test]
    fn test_sample_interpolates_between_centers() {
        let mut field = Field::new("pressure", 2, 1, 1, StoragePrecision::Full).unwrap();
        field.current_mut().store(0, 0, 0.0_f32);
        field.current_mut().store(1, 0, 10.0_f32);

        let midpoint: f32 = field.read().sample(Vec2::new(0.5, 0.5));
        assert_relative_eq!(midpoint, 5.0);

        // Clamp-to-edge beyond the last center
        let outside: f32 = field.read().sample(Vec2::new(2.0, 0.5));
        assert_relative_eq!(outside, 10.0);
        let before: f32 = field.read().sample(Vec2::new(-1.0, 0.5));
        assert_relative_eq!(before, 0.0);
    }

    #[test]
    fn test_half_precision_rounding() {
        let half = StoragePrecision::Half;
        assert_eq!(half.quantize(1.0), 1.0);
        assert_eq!(half.quantize(0.0), 0.0);
        assert_eq!(half.quantize(1e6), 65504.0);
        assert_eq!(half.quantize(-1e6), -65504.0);
        // 1 + 2^-11 is halfway between 1 and the next half; ties round to even
        assert_eq!(half.quantize(1.0 + 2f32.powi(-11)), 1.0);
        // 1 + 2^-10 is exactly representable
        assert_eq!(half.quantize(1.0 + 2f32.powi(-10)), 1.0 + 2f32.powi(-10));
        // Relative error stays within half precision epsilon
        let value = 0.123_456_7_f32;
        assert!((half.quantize(value) - value).abs() / value < 1e-3);
        assert_eq!(StoragePrecision::Full.quantize(value), value);
    }

    #[test]
    fn test_half_precision_applies_on_store() {
        let mut field = Field::new("velocity", 2, 2, 2, StoragePrecision::Half).unwrap();
        field.current_mut().store(0, 0, Vec2::new(0.1, 0.2));
        let stored = field.read().vector_at(0, 0);
        assert_ne!(stored.x, 0.1);
        assert_relative_eq!(stored.x, 0.1, max_relative = 1e-3);
    }

    #[test]
    fn test_neutral_velocity_samples_zero() {
        let view = FieldView::neutral_velocity();
        assert_eq!((view.width(), view.height()), (1, 1));
        assert_eq!(view.sample_normalized(Vec2::new(0.3, -0.7)), Vec2::zeros());
    }

    #[test]
    fn test_as_bytes_matches_length() {
        let field = Field::new("velocity", 3, 3, 2, StoragePrecision::Full).unwrap();
        assert_eq!(field.read().as_bytes().len(), 3 * 3 * 2 * 4);
    }

    #[test]
    fn test_clear_zeroes_both_buffers() {
        let mut field = Field::new("pressure", 3, 3, 1, StoragePrecision::Full).unwrap();
        field.current_mut().store(1, 1, 4.0_f32);
        field.write_target().store(1, 1, 5.0_f32);
        field.clear();
        assert_eq!(field.read().scalar_at(1, 1), 0.0);
        field.swap();
        assert_eq!(field.read().scalar_at(1, 1), 0.0);
    }
}
