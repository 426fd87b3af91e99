use fluid_cursor_core::{FluidCursor, SimulationConfig};
use std::ptr;
use std::sync::RwLock;

use crate::config::{fluid_cursor_default_config, FluidCursorConfig, FluidCursorDevice};
use crate::error::{DefaultFluidCursorError, FluidCursorErrorCode};
use crate::helpers::{clear_last_error, set_last_error, track_error};

/// Opaque fluid cursor handle.
///
/// # Thread Safety
/// The effect is protected by an `RwLock`: velocity queries take a read lock,
/// stepping, resizing and pointer input take the write lock. A host may feed
/// pointer events from its input thread while the render thread steps and
/// samples.
///
/// # Usage
/// ```cpp
/// FluidCursorInstance* cursor = nullptr;
/// FluidCursorConfig config = fluid_cursor_default_config();
/// if (fluid_cursor_new(&config, 1280, 720, Desktop, &cursor) != Ok) {
///     fprintf(stderr, "%s\n", fluid_cursor_get_last_error());
///     return;
/// }
///
/// // Input thread
/// fluid_cursor_pointer_move_pixels(cursor, mouse_x, mouse_y);
///
/// // Every frame
/// uint32_t steps = 0;
/// fluid_cursor_step(cursor, frame_seconds, &steps);
/// fluid_cursor_copy_velocity(cursor, buffer, buffer_len, &written);
///
/// fluid_cursor_destroy(cursor);
/// ```
pub struct FluidCursorInstance {
    pub(crate) cursor: RwLock<FluidCursor>,
}

impl FluidCursorInstance {
    /// Build the effect.
    ///
    /// An allocation failure does not fail construction: the instance comes
    /// back disabled and serving a neutral velocity field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an unrepresentable step interval and
    /// `InvalidConfig` for values `SimulationConfig::validate` rejects.
    pub(crate) fn new(
        config: &FluidCursorConfig,
        width: u32,
        height: u32,
        device: FluidCursorDevice,
    ) -> Result<Box<Self>, DefaultFluidCursorError> {
        let config = SimulationConfig::try_from(config)?;
        let cursor = FluidCursor::new(config, width, height, device.into())
            .map_err(|err| DefaultFluidCursorError::from(&err))?;
        Ok(Box::new(Self {
            cursor: RwLock::new(cursor),
        }))
    }
}

/// Create a fluid cursor and return it via out-parameter.
///
/// Parameters
/// - `config`: Configuration to use, or null for `fluid_cursor_default_config()`.
/// - `width`, `height`: Viewport in pixels (clamped to at least 1).
/// - `device`: Device class; selects half precision storage on mobile.
/// - `out_instance`: Receives the instance on success, null on failure.
///
/// Returns
/// - `Ok` on success. If the grid could not be allocated the instance is
///   still returned, disabled; `fluid_cursor_get_last_error_code()` then
///   reports `AllocationFailed`.
/// - `NullPointer` if `out_instance` is null.
/// - `InvalidConfig` / `InvalidParameter` if the configuration is rejected.
///
/// # Safety
///
/// - `config` must be null or point to a valid `FluidCursorConfig`.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned instance and MUST call `fluid_cursor_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_new(
    config: *const FluidCursorConfig,
    width: u32,
    height: u32,
    device: FluidCursorDevice,
    out_instance: *mut *mut FluidCursorInstance,
) -> FluidCursorErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFluidCursorError::null_pointer("out_instance"));
    }

    // SAFETY: Caller guarantees `config` is null or valid.
    let config = unsafe { config.as_ref() }
        .copied()
        .unwrap_or_else(|| fluid_cursor_default_config());

    match FluidCursorInstance::new(&config, width, height, device) {
        Ok(instance) => {
            let disabled = instance
                .cursor
                .read()
                .ok()
                .and_then(|cursor| cursor.last_error().map(DefaultFluidCursorError::from));
            match disabled {
                Some(err) => set_last_error(&err),
                None => clear_last_error(),
            }
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            FluidCursorErrorCode::Ok
        }
        Err(err) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            track_error(&err)
        }
    }
}

/// Destroy an instance created by `fluid_cursor_new`.
///
/// A null `ptr` is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `fluid_cursor_new`.
/// - The pointer MUST NOT be used again after this call.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_destroy(ptr: *mut FluidCursorInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` came from `Box::into_raw` in `fluid_cursor_new` and is
    // reclaimed exactly once.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::fluid_cursor_get_last_error_code;

    #[test]
    fn test_new_and_destroy() {
        let mut instance = ptr::null_mut();
        let code = unsafe {
            fluid_cursor_new(
                ptr::null(),
                320,
                240,
                FluidCursorDevice::Desktop,
                &mut instance,
            )
        };
        assert_eq!(code, FluidCursorErrorCode::Ok);
        assert!(!instance.is_null());
        assert_eq!(fluid_cursor_get_last_error_code(), FluidCursorErrorCode::Ok);
        unsafe { fluid_cursor_destroy(instance) };
    }

    #[test]
    fn test_null_out_instance() {
        let code = unsafe {
            fluid_cursor_new(
                ptr::null(),
                320,
                240,
                FluidCursorDevice::Desktop,
                ptr::null_mut(),
            )
        };
        assert_eq!(code, FluidCursorErrorCode::NullPointer);
        assert_eq!(
            fluid_cursor_get_last_error_code(),
            FluidCursorErrorCode::NullPointer
        );
    }

    #[test]
    fn test_invalid_config_returns_null() {
        let config = FluidCursorConfig {
            dissipation: 2.0,
            ..fluid_cursor_default_config()
        };
        let mut instance = ptr::null_mut();
        let code =
            unsafe { fluid_cursor_new(&config, 320, 240, FluidCursorDevice::Mobile, &mut instance) };
        assert_eq!(code, FluidCursorErrorCode::InvalidConfig);
        assert!(instance.is_null());
    }

    #[test]
    fn test_over_budget_grid_is_created_disabled() {
        let config = FluidCursorConfig {
            max_cells: 100,
            ..fluid_cursor_default_config()
        };
        let mut instance = ptr::null_mut();
        let code =
            unsafe { fluid_cursor_new(&config, 640, 480, FluidCursorDevice::Desktop, &mut instance) };
        assert_eq!(code, FluidCursorErrorCode::Ok);
        assert_eq!(
            fluid_cursor_get_last_error_code(),
            FluidCursorErrorCode::AllocationFailed
        );
        unsafe { fluid_cursor_destroy(instance) };
    }

    #[test]
    fn test_destroy_null_is_noop() {
        unsafe { fluid_cursor_destroy(ptr::null_mut()) };
    }
}
