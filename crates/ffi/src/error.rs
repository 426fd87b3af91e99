use fluid_cursor_core::FluidError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` - The error code handed back to the caller
/// - `msg()` - The diagnostic message stored for `fluid_cursor_get_last_error`
///
/// # Example
/// ```ignore
/// let err = DefaultFluidCursorError::null_pointer("out_instance");
/// assert_eq!(err.code(), FluidCursorErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'out_instance' cannot be null");
/// ```
pub(crate) trait FluidCursorError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> FluidCursorErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default `FluidCursorError` carrying a code and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFluidCursorError {
    code: FluidCursorErrorCode,
    msg: String,
}

impl DefaultFluidCursorError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: FluidCursorErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"RwLock"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: FluidCursorErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: FluidCursorErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Create error for a destination buffer that cannot hold the field.
    pub fn buffer_too_small(required: usize, capacity: usize) -> Self {
        Self {
            code: FluidCursorErrorCode::BufferTooSmall,
            msg: format!("Buffer holds {capacity} values but {required} are required"),
        }
    }
}

impl From<&FluidError> for DefaultFluidCursorError {
    fn from(error: &FluidError) -> Self {
        let code = match error {
            FluidError::InvalidConfig { .. } => FluidCursorErrorCode::InvalidConfig,
            FluidError::GridTooLarge { .. } | FluidError::Allocation { .. } => {
                FluidCursorErrorCode::AllocationFailed
            }
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl FluidCursorError for DefaultFluidCursorError {
    fn code(&self) -> FluidCursorErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by fluid cursor functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidCursorErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// A configuration value is outside its valid range. Nothing changed.
    InvalidConfig = 3,

    /// Invalid parameter passed to function.
    InvalidParameter = 4,

    /// The velocity grid could not be allocated. The effect is disabled and
    /// serves a neutral field until a later resize or config change succeeds.
    AllocationFailed = 5,

    /// Caller-provided buffer is smaller than the data to copy.
    BufferTooSmall = 6,
}

impl From<DefaultFluidCursorError> for FluidCursorErrorCode {
    fn from(error: DefaultFluidCursorError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is kept here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, FluidCursorErrorCode)> = const { RefCell::new((None, FluidCursorErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, FluidCursorErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, FluidCursorErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Thread Safety
/// Error state is per-thread. Each thread has its own independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// FluidCursorInstance* cursor = nullptr;
/// FluidCursorErrorCode err = fluid_cursor_new(nullptr, 1280, 720, Desktop, &cursor);
/// if (err != Ok) {
///     const char* error = fluid_cursor_get_last_error();
///     if (error) {
///         printf("Fluid cursor creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn fluid_cursor_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `FluidCursorErrorCode::Ok` (0) if the last call on this thread
/// succeeded, otherwise the code it returned.
#[no_mangle]
pub extern "C" fn fluid_cursor_get_last_error_code() -> FluidCursorErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
