use crate::error::{
    with_last_error_mut, DefaultFluidCursorError, FluidCursorError, FluidCursorErrorCode,
};
use crate::instance::FluidCursorInstance;
use fluid_cursor_core::FluidCursor;
use std::ffi::CString;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FluidCursorError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = FluidCursorErrorCode::Ok;
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl FluidCursorError) -> FluidCursorErrorCode {
    set_last_error(error);
    error.code()
}

/// Collapse a result into an FFI code, recording or clearing the last error.
pub(crate) fn track_result(result: Result<(), DefaultFluidCursorError>) -> FluidCursorErrorCode {
    match result {
        Ok(()) => {
            clear_last_error();
            FluidCursorErrorCode::Ok
        }
        Err(err) => track_error(&err),
    }
}

/// Run an FFI body and collapse its result into an error code.
#[inline]
pub(crate) fn handle_ffi_result_error<F>(f: F) -> FluidCursorErrorCode
where
    F: FnOnce() -> Result<(), DefaultFluidCursorError>,
{
    track_result(f())
}

/// Borrow an instance from a raw pointer.
///
/// # Safety
/// `ptr` must be null or point to a live instance from `fluid_cursor_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const FluidCursorInstance,
) -> Result<&'a FluidCursorInstance, DefaultFluidCursorError> {
    // SAFETY: Caller guarantees `ptr` is null or valid; null is rejected here.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultFluidCursorError::null_pointer("ptr"))
}

/// Run `f` with shared access to the cursor.
pub(crate) fn with_cursor<F, T>(
    instance: &FluidCursorInstance,
    f: F,
) -> Result<T, DefaultFluidCursorError>
where
    F: FnOnce(&FluidCursor) -> T,
{
    let cursor = instance
        .cursor
        .read()
        .map_err(|_| DefaultFluidCursorError::lock_poisoned("RwLock"))?;
    Ok(f(&cursor))
}

/// Run `f` with exclusive access to the cursor.
pub(crate) fn with_cursor_mut<F, T>(
    instance: &FluidCursorInstance,
    f: F,
) -> Result<T, DefaultFluidCursorError>
where
    F: FnOnce(&mut FluidCursor) -> T,
{
    let mut cursor = instance
        .cursor
        .write()
        .map_err(|_| DefaultFluidCursorError::lock_poisoned("RwLock"))?;
    Ok(f(&mut cursor))
}

/// Write `value` through an out-pointer.
///
/// # Safety
/// `out` must be null or valid for writes.
pub(crate) unsafe fn write_out<T>(
    out: *mut T,
    name: &str,
    value: T,
) -> Result<(), DefaultFluidCursorError> {
    if out.is_null() {
        return Err(DefaultFluidCursorError::null_pointer(name));
    }
    // SAFETY: Non-null checked above; caller guarantees validity.
    unsafe { out.write(value) };
    Ok(())
}
