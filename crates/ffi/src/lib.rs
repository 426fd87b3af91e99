//! C ABI for the fluid cursor effect.
//!
//! Every fallible call returns a `FluidCursorErrorCode` (0 = success) and
//! records a message retrievable with `fluid_cursor_get_last_error()` on the
//! same thread. Instances are opaque and owned by the caller between
//! `fluid_cursor_new` and `fluid_cursor_destroy`.
//!
//! The C header `FluidCursorFFI.h` is generated at the workspace root by
//! `build.rs`.

mod config;
mod cursor;
mod error;
mod field;
mod helpers;
mod instance;

pub use config::{
    fluid_cursor_default_config, FluidCursorAdvection, FluidCursorBoundary, FluidCursorConfig,
    FluidCursorDevice, FluidCursorPrecision,
};
pub use cursor::{
    fluid_cursor_get_config, fluid_cursor_is_enabled, fluid_cursor_pointer_move,
    fluid_cursor_pointer_move_pixels, fluid_cursor_resize, fluid_cursor_step,
    fluid_cursor_touch_end, fluid_cursor_touch_move, fluid_cursor_touch_start,
    fluid_cursor_update_config,
};
pub use error::{fluid_cursor_get_last_error, fluid_cursor_get_last_error_code, FluidCursorErrorCode};
pub use field::{
    fluid_cursor_copy_velocity, fluid_cursor_copy_velocity_bytes, fluid_cursor_get_velocity_info,
    fluid_cursor_sample_velocity, FluidCursorFieldInfo,
};
pub use instance::{fluid_cursor_destroy, fluid_cursor_new, FluidCursorInstance};
