//! Host-to-script calls through a resolved callable.

use std::ffi::CString;
use std::ptr;

use pyo3_ffi::{
    PyErr_Clear, PyErr_Print, PyImport_ImportModule, PyObject, PyObject_GetAttrString, Py_XDECREF,
    Py_XINCREF,
};

use crate::guard::OwnedRef;
use crate::signature::ArgPack;
use crate::types::FromScript;

/// A resolved, callable handle into the runtime.
///
/// Resolution failure is silent: the invoker is simply not valid, and the
/// caller must check [`is_valid`](Invoker::is_valid) before calling through
/// it. The held reference is incremented on clone, released on drop, and
/// transferred by a move — `std::mem::take` leaves the source in the
/// default, invalid state.
pub struct Invoker {
    func: *mut PyObject,
}

impl Invoker {
    /// Resolves `name` inside the module `module`, importing it first.
    ///
    /// The temporary module reference is released once the attribute lookup
    /// is done; on failure the runtime's pending error is cleared so later
    /// calls do not observe it.
    pub fn new(module: &str, name: &str) -> Invoker {
        let Ok(c_module) = CString::new(module) else {
            return Invoker::default();
        };
        let module = OwnedRef::from_raw(unsafe { PyImport_ImportModule(c_module.as_ptr()) });
        if module.is_null() {
            unsafe { PyErr_Clear() };
            return Invoker::default();
        }
        Invoker::from_object(module.as_ptr(), name)
    }

    /// Resolves `name` as an attribute of an already-held runtime object.
    pub(crate) fn from_object(object: *mut PyObject, name: &str) -> Invoker {
        if object.is_null() {
            return Invoker::default();
        }
        let Ok(c_name) = CString::new(name) else {
            return Invoker::default();
        };
        let func = unsafe { PyObject_GetAttrString(object, c_name.as_ptr()) };
        if func.is_null() {
            unsafe { PyErr_Clear() };
        }
        Invoker { func }
    }

    pub fn is_valid(&self) -> bool {
        !self.func.is_null()
    }

    /// Calls the callable and extracts the result unconditionally.
    ///
    /// No failure path: if the call raises, extraction runs on the null
    /// result and the outcome is unspecified. Reserved for call sites where
    /// failure is impossible by construction; everything else should go
    /// through [`pcall`](Invoker::pcall).
    pub fn call<R, A>(&self, args: A) -> R
    where
        R: FromScript,
        A: ArgPack,
    {
        unsafe {
            let result = args.invoke(self.func);
            let _result = OwnedRef::from_raw(result);
            R::extract(result)
        }
    }

    /// Calls the callable, recovering from every runtime-side failure.
    ///
    /// A raised error is printed and cleared; a result failing `R`'s type
    /// check is reported with the expected type name and never extracted.
    /// Both cases return `R::default()`.
    pub fn pcall<R, A>(&self, args: A) -> R
    where
        R: FromScript + Default,
        A: ArgPack,
    {
        unsafe {
            let result = args.invoke(self.func);
            if result.is_null() {
                PyErr_Print();
                PyErr_Clear();
                return R::default();
            }
            let _result = OwnedRef::from_raw(result);
            if !R::check(result) {
                tracing::error!(expected = R::NAME, "script call returned a mismatched type");
                return R::default();
            }
            R::extract(result)
        }
    }
}

impl Default for Invoker {
    /// The invalid invoker.
    fn default() -> Invoker {
        Invoker {
            func: ptr::null_mut(),
        }
    }
}

impl Clone for Invoker {
    fn clone(&self) -> Invoker {
        unsafe { Py_XINCREF(self.func) };
        Invoker { func: self.func }
    }
}

impl Drop for Invoker {
    fn drop(&mut self) {
        unsafe { Py_XDECREF(self.func) };
    }
}
