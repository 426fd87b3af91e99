//! Stepping, resizing, pointer input and configuration of a live instance.

use fluid_cursor_core::{FluidCursor, FluidError, SimulationConfig, Vec2};
use std::time::Duration;

use crate::config::FluidCursorConfig;
use crate::error::{DefaultFluidCursorError, FluidCursorErrorCode};
use crate::helpers::{
    handle_ffi_result_error, instance_from_ptr, with_cursor, with_cursor_mut, write_out,
};
use crate::instance::FluidCursorInstance;

fn core_result(result: Result<(), FluidError>) -> Result<(), DefaultFluidCursorError> {
    result.map_err(|err| DefaultFluidCursorError::from(&err))
}

/// Advance the effect by the wall-clock seconds since the previous call.
///
/// Runs zero or more fixed simulation steps; the count is written to
/// `out_steps` when it is non-null.
///
/// Returns `InvalidParameter` for a negative or non-finite `elapsed_seconds`.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `out_steps` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_step(
    ptr: *const FluidCursorInstance,
    elapsed_seconds: f64,
    out_steps: *mut u32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let elapsed = Duration::try_from_secs_f64(elapsed_seconds).map_err(|err| {
            DefaultFluidCursorError::invalid_parameter(format!(
                "elapsed_seconds {elapsed_seconds}: {err}"
            ))
        })?;
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let steps = with_cursor_mut(instance, |cursor| cursor.step(elapsed))?;
        if !out_steps.is_null() {
            unsafe { write_out(out_steps, "out_steps", steps) }?;
        }
        Ok(())
    })
}

/// Resize to a new viewport in pixels, reallocating every field.
///
/// Returns `AllocationFailed` if the new grid cannot be allocated; the
/// effect is then disabled until a later resize succeeds.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_resize(
    ptr: *const FluidCursorInstance,
    width: u32,
    height: u32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        core_result(with_cursor_mut(instance, |cursor| {
            cursor.resize(width, height)
        })?)
    })
}

/// Record a pointer move in normalized coordinates, `[-1, 1]` with y up.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_pointer_move(
    ptr: *const FluidCursorInstance,
    x: f32,
    y: f32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_cursor_mut(instance, |cursor| cursor.pointer_move(Vec2::new(x, y)))
    })
}

/// Record a pointer move in viewport pixels, origin at the top-left corner.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_pointer_move_pixels(
    ptr: *const FluidCursorInstance,
    x: f32,
    y: f32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_cursor_mut(instance, |cursor| cursor.pointer_move_pixels(x, y))
    })
}

/// Record the start of a touch in normalized coordinates.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_touch_start(
    ptr: *const FluidCursorInstance,
    x: f32,
    y: f32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_cursor_mut(instance, |cursor| cursor.touch_start(Vec2::new(x, y)))
    })
}

/// Record a touch move in normalized coordinates.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_touch_move(
    ptr: *const FluidCursorInstance,
    x: f32,
    y: f32,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_cursor_mut(instance, |cursor| cursor.touch_move(Vec2::new(x, y)))
    })
}

/// Record the end of a touch.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_touch_end(
    ptr: *const FluidCursorInstance,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_cursor_mut(instance, FluidCursor::touch_end)
    })
}

/// Replace the configuration.
///
/// Stage parameters apply from the next step; grid sizing and precision
/// changes reallocate. An `InvalidConfig` result leaves the instance
/// untouched.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `config` must be null or point to a valid `FluidCursorConfig`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_update_config(
    ptr: *const FluidCursorInstance,
    config: *const FluidCursorConfig,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let config = unsafe { config.as_ref() }
            .ok_or_else(|| DefaultFluidCursorError::null_pointer("config"))?;
        let config = SimulationConfig::try_from(config)?;
        core_result(with_cursor_mut(instance, |cursor| {
            cursor.update_config(config)
        })?)
    })
}

/// Copy the active configuration into `out_config`.
///
/// # Safety
/// - `ptr` must be null or a live instance from `fluid_cursor_new`.
/// - `out_config` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_get_config(
    ptr: *const FluidCursorInstance,
    out_config: *mut FluidCursorConfig,
) -> FluidCursorErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let config = with_cursor(instance, |cursor| FluidCursorConfig::from(cursor.config()))?;
        unsafe { write_out(out_config, "out_config", config) }
    })
}

/// Whether the solver is allocated and running.
///
/// Returns false for a null pointer or a disabled effect.
///
/// # Safety
/// `ptr` must be null or a live instance from `fluid_cursor_new`.
#[no_mangle]
pub unsafe extern "C" fn fluid_cursor_is_enabled(ptr: *const FluidCursorInstance) -> bool {
    let Ok(instance) = (unsafe { instance_from_ptr(ptr) }) else {
        return false;
    };
    with_cursor(instance, FluidCursor::is_enabled).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{fluid_cursor_default_config, FluidCursorDevice};
    use crate::error::fluid_cursor_get_last_error_code;
    use crate::instance::{fluid_cursor_destroy, fluid_cursor_new};
    use std::ptr;

    fn create(config: &FluidCursorConfig, width: u32, height: u32) -> *mut FluidCursorInstance {
        let mut instance = ptr::null_mut();
        let code =
            unsafe { fluid_cursor_new(config, width, height, FluidCursorDevice::Desktop, &mut instance) };
        assert_eq!(code, FluidCursorErrorCode::Ok);
        instance
    }

    #[test]
    fn test_step_reports_fixed_steps() {
        let instance = create(&fluid_cursor_default_config(), 200, 100);
        let mut steps = 0;
        unsafe {
            assert_eq!(
                fluid_cursor_pointer_move(instance, 0.0, 0.0),
                FluidCursorErrorCode::Ok
            );
            assert_eq!(
                fluid_cursor_step(instance, 0.05, &mut steps),
                FluidCursorErrorCode::Ok
            );
            assert_eq!(steps, 3);

            assert_eq!(
                fluid_cursor_step(instance, -1.0, &mut steps),
                FluidCursorErrorCode::InvalidParameter
            );
            assert_eq!(
                fluid_cursor_step(instance, 0.0, ptr::null_mut()),
                FluidCursorErrorCode::Ok
            );
            fluid_cursor_destroy(instance);
        }
    }

    #[test]
    fn test_null_instance_is_rejected() {
        unsafe {
            assert_eq!(
                fluid_cursor_touch_end(ptr::null()),
                FluidCursorErrorCode::NullPointer
            );
            assert_eq!(
                fluid_cursor_get_last_error_code(),
                FluidCursorErrorCode::NullPointer
            );
            assert!(!fluid_cursor_is_enabled(ptr::null()));
        }
    }

    #[test]
    fn test_failed_resize_disables_until_next_success() {
        let config = FluidCursorConfig {
            max_cells: 64 * 64,
            ..fluid_cursor_default_config()
        };
        let instance = create(&config, 100, 100);
        unsafe {
            assert!(fluid_cursor_is_enabled(instance));
            assert_eq!(
                fluid_cursor_resize(instance, 1000, 1000),
                FluidCursorErrorCode::AllocationFailed
            );
            assert!(!fluid_cursor_is_enabled(instance));
            assert_eq!(
                fluid_cursor_resize(instance, 120, 120),
                FluidCursorErrorCode::Ok
            );
            assert!(fluid_cursor_is_enabled(instance));
            fluid_cursor_destroy(instance);
        }
    }

    #[test]
    fn test_update_config_round_trip() {
        let instance = create(&fluid_cursor_default_config(), 160, 120);
        unsafe {
            let mut config = fluid_cursor_default_config();
            fluid_cursor_get_config(instance, &mut config);
            config.mouse_force = 35.0;
            config.is_viscous = true;
            assert_eq!(
                fluid_cursor_update_config(instance, &config),
                FluidCursorErrorCode::Ok
            );

            let mut applied = fluid_cursor_default_config();
            fluid_cursor_get_config(instance, &mut applied);
            assert_eq!(applied.mouse_force, 35.0);
            assert!(applied.is_viscous);

            config.iterations_poisson = 0;
            assert_eq!(
                fluid_cursor_update_config(instance, &config),
                FluidCursorErrorCode::InvalidConfig
            );
            assert_eq!(
                fluid_cursor_update_config(instance, ptr::null()),
                FluidCursorErrorCode::NullPointer
            );
            fluid_cursor_destroy(instance);
        }
    }

    #[test]
    fn test_touch_sequence() {
        let instance = create(&fluid_cursor_default_config(), 128, 128);
        unsafe {
            assert_eq!(
                fluid_cursor_touch_start(instance, 0.2, 0.2),
                FluidCursorErrorCode::Ok
            );
            assert_eq!(
                fluid_cursor_touch_move(instance, 0.25, 0.2),
                FluidCursorErrorCode::Ok
            );
            assert_eq!(
                fluid_cursor_pointer_move_pixels(instance, 10.0, 10.0),
                FluidCursorErrorCode::Ok
            );
            assert_eq!(fluid_cursor_touch_end(instance), FluidCursorErrorCode::Ok);
            fluid_cursor_destroy(instance);
        }
    }
}
