//! Long-lived handle to an imported script module.

use std::ffi::CString;
use std::ptr;

use pyo3_ffi::{PyErr_Clear, PyImport_ImportModule, PyObject, Py_XDECREF};

use crate::invoker::Invoker;

/// Owns one reference to a script module object and resolves callables out
/// of it by name.
///
/// A module is typically process-scoped, so the handle is a single
/// unambiguous owner: it cannot be cloned, and the reference is released
/// when the handle drops.
pub struct Module {
    module: *mut PyObject,
}

impl Module {
    /// Imports `name`. An unresolvable module yields an invalid handle with
    /// the runtime's pending error cleared.
    pub fn import(name: &str) -> Module {
        let Ok(c_name) = CString::new(name) else {
            return Module {
                module: ptr::null_mut(),
            };
        };
        let module = unsafe { PyImport_ImportModule(c_name.as_ptr()) };
        if module.is_null() {
            unsafe { PyErr_Clear() };
        }
        Module { module }
    }

    pub fn is_valid(&self) -> bool {
        !self.module.is_null()
    }

    /// Resolves a callable attribute; the invoker is invalid when the
    /// attribute does not exist (or this handle is itself invalid).
    pub fn get(&self, name: &str) -> Invoker {
        Invoker::from_object(self.module, name)
    }

    pub fn as_ptr(&self) -> *mut PyObject {
        self.module
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        unsafe { Py_XDECREF(self.module) };
    }
}
