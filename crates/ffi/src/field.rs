//! Velocity field access for rendering.
//!
//! Hosts either copy the whole interleaved `(vx, vy)` grid once per frame
//! (as floats, or as raw bytes ready for a two-channel float texture upload)
//! or sample single points. While the effect is disabled all of them report
//! the neutral 1×1 zero field.

use fluid_cursor_core::Vec2;
use std::os::raw::c_float;
use std::slice;

use crate::error::{DefaultFluidCursorError, FluidCursorErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_cursor, write_out};
use crate::instance::FluidCursorInstance;

/// Copy `data` into a caller buffer of `capacity` elements.
///
/// # Safety
/// `buffer` must be non-null and valid for `capacity` writes of `T`.
unsafe fn copy_into<T: Copy>(
    data: &[T],
    buffer: *mut T,
    capacity: usize,
) -> Result<usize, DefaultFluidCursorError> {
    if data.len() > capacity {
        return Err(DefaultFluidCursorError::buffer_too_small(
            data.len(),
            capacity,
        ));
    }
    // SAFETY: non-null and `data.len() <= capacity` writable elements.
    let dst = unsafe { slice::from_raw_parts_mut(buffer, data.len()) };
    dst.copy_from_slice(data);
    Ok(data.len())
}

/// Shape of the current velocity field.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidCursorFieldInfo {
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Values per cell (2 for velocity)
    pub components: u32,
    /// Width of one cell in UV units
    pub cell_scale_x: f32,
    /// Height of one cell in UV units
    pub cell_scale_y: f32,
}

/// Describe the current velocity field.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `out_info` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_get_velocity_info(
    ptr: *const FluidCursorInstance,
    out_info: *mut FluidCursorFieldInfo,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let info = with_cursor(instance, |cursor| {
            let field = cursor.current_velocity_field();
            FluidCursorFieldInfo {
                width: field.width() as u32,
                height: field.height() as u32,
                components: field.components() as u32,
                cell_scale_x: field.cell_scale().x,
                cell_scale_y: field.cell_scale().y,
            }
        })?;
        unsafe { write_out(out_info, "out_info", info) }
    })
}

/// Copy the velocity field, row-major with rows bottom-up, into `buffer`.
///
/// `capacity` is the number of floats `buffer` holds; it must be at least
/// `width * height * components`. The number written goes to `out_len` when
/// non-null. Returns `BufferTooSmall` (writing nothing) otherwise.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `buffer` must be valid for `capacity` float writes.
/// - `out_len` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_copy_velocity(
    ptr: *const FluidCursorInstance,
    buffer: *mut c_float,
    capacity: usize,
    out_len: *mut usize,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if buffer.is_null() {
            return Err(DefaultFluidCursorError::null_pointer("buffer"));
        }
        let written = with_cursor(instance, |cursor| unsafe {
            copy_into(cursor.current_velocity_field().as_slice(), buffer, capacity)
        })??;
        if !out_len.is_null() {
            unsafe { write_out(out_len, "out_len", written) }?;
        }
        Ok(())
    })
}

/// Copy the velocity field as raw native-endian `f32` bytes into `buffer`.
///
/// Same layout as `fluid_cursor_copy_velocity`; `capacity` and `out_len`
/// count bytes, so the buffer needs `width * height * components * 4`.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `buffer` must be valid for `capacity` byte writes.
/// - `out_len` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_copy_velocity_bytes(
    ptr: *const FluidCursorInstance,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if buffer.is_null() {
            return Err(DefaultFluidCursorError::null_pointer("buffer"));
        }
        let written = with_cursor(instance, |cursor| unsafe {
            copy_into(cursor.current_velocity_field().as_bytes(), buffer, capacity)
        })??;
        if !out_len.is_null() {
            unsafe { write_out(out_len, "out_len", written) }?;
        }
        Ok(())
    })
}

/// Sample the velocity at a normalized position (`[-1, 1]`, y up) with
/// bilinear filtering.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `out_x` and `out_y` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_sample_velocity(
    ptr: *const FluidCursorInstance,
    x: f32,
    y: f32,
    out_x: *mut f32,
    out_y: *mut f32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if out_x.is_null() || out_y.is_null() {
            return Err(DefaultFluidCursorError::null_pointer("out_x/out_y"));
        }
        let velocity = with_cursor(instance, |cursor| {
            cursor
                .current_velocity_field()
                .sample_normalized(Vec2::new(x, y))
        })?;
        unsafe {
            write_out(out_x, "out_x", velocity.x)?;
            write_out(out_y, "out_y", velocity.y)
        }
    })
}
