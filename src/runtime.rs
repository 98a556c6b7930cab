//! Interpreter bootstrap and caller-side serialization.
//!
//! The runtime serializes all of its own operations behind one lock; this
//! layer never locks on its own. Callers enter through [`with_gil`] (or hold
//! the lock themselves) around every use of the bridge.

use std::ffi::CString;
use std::sync::Once;

use pyo3_ffi::{
    PyErr_Occurred, PyEval_SaveThread, PyGILState_Ensure, PyGILState_Release, PyGILState_STATE,
    PyRun_SimpleString, Py_InitializeEx,
};

use crate::error::{Error, Result};

static START: Once = Once::new();

/// Initializes the embedded interpreter once per process and releases its
/// lock so any thread can enter through [`with_gil`].
pub fn initialize() {
    START.call_once(|| unsafe {
        // Leave signal handling to the host process.
        Py_InitializeEx(0);
        PyEval_SaveThread();
    });
}

/// Holds the runtime's serialization lock for its lifetime.
pub struct GilGuard {
    state: PyGILState_STATE,
}

impl GilGuard {
    pub fn acquire() -> GilGuard {
        initialize();
        GilGuard {
            state: unsafe { PyGILState_Ensure() },
        }
    }
}

impl Drop for GilGuard {
    fn drop(&mut self) {
        unsafe { PyGILState_Release(self.state) };
    }
}

/// Runs `f` with the runtime serialized, initializing it first if needed.
///
/// The lock is released on every exit path, including a panicking `f`.
pub fn with_gil<T>(f: impl FnOnce() -> T) -> T {
    let _gil = GilGuard::acquire();
    f()
}

/// Executes script source in the runtime's top-level namespace.
///
/// The caller must hold the runtime's serialization. A raising script maps
/// to [`Error::Execution`]; the runtime prints and clears the error itself.
pub fn run(source: &str) -> Result<()> {
    let source = CString::new(source)?;
    let status = unsafe { PyRun_SimpleString(source.as_ptr()) };
    if status == 0 { Ok(()) } else { Err(Error::Execution) }
}

/// Whether the runtime has an error pending. Test and diagnostic support.
pub fn error_pending() -> bool {
    !unsafe { PyErr_Occurred() }.is_null()
}
