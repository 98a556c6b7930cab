//! Per-type conversion between host values and runtime objects.
//!
//! Each host type usable across the bridge has exactly one descriptor,
//! split along the two call directions: [`ToScript`] carries a value into
//! the runtime (format tag plus argument conversion), [`FromScript`] brings
//! a runtime value back (dynamic check plus extraction), and
//! [`ScriptReturn`] converts an exported function's result into a new
//! runtime reference. The modeled set is closed: no value, `i32`, `u32`,
//! `f32`, `f64`, `&str` and `String`.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int, c_uint};

use pyo3_ffi::{
    PyFloat_AsDouble, PyFloat_Check, PyLong_AsLong, PyLong_AsUnsignedLong, PyLong_Check, PyObject,
    PyUnicode_AsUTF8, PyUnicode_Check, PyUnicode_FromStringAndSize, Py_BuildValue, Py_None,
    Py_XINCREF, Py_ssize_t,
};

use crate::guard::OwnedRef;

/// Host-to-runtime conversion for argument values.
///
/// `TAG` is the single format character the runtime's call API uses to
/// interpret the matching variadic slot; [`convert`](ToScript::convert)
/// produces the value that must stay alive for the duration of the call.
pub trait ToScript {
    /// One format tag character.
    const TAG: &'static str;

    /// What `convert` yields: either the value itself (scalars) or a holder
    /// that keeps a temporary alive across the call.
    type Arg: RawArg;

    fn convert(self) -> Self::Arg;
}

/// Runtime-to-host extraction for result values.
pub trait FromScript: Sized {
    /// Human-readable type name, used in mismatch diagnostics.
    const NAME: &'static str;

    /// Dynamic type test. Must gate [`extract`](FromScript::extract) for any
    /// value that originated in script code.
    ///
    /// # Safety
    ///
    /// `value` must be a live runtime reference (it is only borrowed).
    unsafe fn check(value: *mut PyObject) -> bool;

    /// Extracts the host value. Never fails loudly: on invalid input this
    /// yields whatever sentinel the runtime's own conversion produces.
    ///
    /// # Safety
    ///
    /// `value` must be a live runtime reference (it is only borrowed).
    unsafe fn extract(value: *mut PyObject) -> Self;
}

/// Conversion of an exported host function's result into a runtime value.
///
/// # Safety contract
///
/// `into_value` returns a new reference (or null with a pending error);
/// the caller owns it.
pub trait ScriptReturn {
    /// # Safety
    ///
    /// Requires the runtime to be initialized and serialized by the caller.
    unsafe fn into_value(self) -> *mut PyObject;
}

/// The FFI-safe shape a converted argument exposes to the variadic call.
pub trait RawArg {
    type Raw: Copy;

    fn as_raw(&self) -> Self::Raw;
}

impl RawArg for c_int {
    type Raw = c_int;

    fn as_raw(&self) -> c_int {
        *self
    }
}

impl RawArg for c_uint {
    type Raw = c_uint;

    fn as_raw(&self) -> c_uint {
        *self
    }
}

impl RawArg for c_double {
    type Raw = c_double;

    fn as_raw(&self) -> c_double {
        *self
    }
}

impl RawArg for CString {
    type Raw = *const c_char;

    fn as_raw(&self) -> *const c_char {
        self.as_ptr()
    }
}

impl RawArg for OwnedRef {
    type Raw = *mut PyObject;

    fn as_raw(&self) -> *mut PyObject {
        self.as_ptr()
    }
}

/// One registry entry per scalar type. Extending the bridge to another
/// scalar is one more invocation; nothing else changes.
macro_rules! scalar_descriptor {
    ($ty:ty, $name:literal, $tag:literal, $raw:ty, $check:path, $extract:path) => {
        impl ToScript for $ty {
            const TAG: &'static str = $tag;
            type Arg = $raw;

            #[inline]
            fn convert(self) -> $raw {
                // Identity apart from the C variadic promotion.
                self as $raw
            }
        }

        impl FromScript for $ty {
            const NAME: &'static str = $name;

            #[inline]
            unsafe fn check(value: *mut PyObject) -> bool {
                unsafe { $check(value) != 0 }
            }

            #[inline]
            unsafe fn extract(value: *mut PyObject) -> Self {
                unsafe { $extract(value) as $ty }
            }
        }

        impl ScriptReturn for $ty {
            #[inline]
            unsafe fn into_value(self) -> *mut PyObject {
                unsafe {
                    Py_BuildValue(
                        concat!($tag, "\0").as_ptr().cast::<c_char>(),
                        self.convert().as_raw(),
                    )
                }
            }
        }
    };
}

scalar_descriptor!(i32, "int", "i", c_int, PyLong_Check, PyLong_AsLong);
scalar_descriptor!(u32, "uint", "I", c_uint, PyLong_Check, PyLong_AsUnsignedLong);
scalar_descriptor!(f32, "float", "f", c_double, PyFloat_Check, PyFloat_AsDouble);
scalar_descriptor!(f64, "double", "d", c_double, PyFloat_Check, PyFloat_AsDouble);

impl ToScript for &str {
    const TAG: &'static str = "s";
    type Arg = CString;

    fn convert(self) -> CString {
        // An interior nul cannot cross the C boundary; the empty string is
        // the sentinel.
        CString::new(self).unwrap_or_default()
    }
}

impl ScriptReturn for &str {
    unsafe fn into_value(self) -> *mut PyObject {
        unsafe { PyUnicode_FromStringAndSize(self.as_ptr().cast::<c_char>(), self.len() as Py_ssize_t) }
    }
}

impl ToScript for String {
    const TAG: &'static str = "O";
    type Arg = OwnedRef;

    fn convert(self) -> OwnedRef {
        // Allocates a new runtime string; the guard releases it after the
        // call has taken its own reference.
        OwnedRef::from_raw(unsafe {
            PyUnicode_FromStringAndSize(self.as_ptr().cast::<c_char>(), self.len() as Py_ssize_t)
        })
    }
}

impl FromScript for String {
    const NAME: &'static str = "str";

    unsafe fn check(value: *mut PyObject) -> bool {
        unsafe { PyUnicode_Check(value) != 0 }
    }

    unsafe fn extract(value: *mut PyObject) -> String {
        let data = unsafe { PyUnicode_AsUTF8(value) };
        if data.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(data) }.to_string_lossy().into_owned()
    }
}

impl ScriptReturn for String {
    unsafe fn into_value(self) -> *mut PyObject {
        unsafe { PyUnicode_FromStringAndSize(self.as_ptr().cast::<c_char>(), self.len() as Py_ssize_t) }
    }
}

impl FromScript for () {
    const NAME: &'static str = "none";

    unsafe fn check(_value: *mut PyObject) -> bool {
        true
    }

    unsafe fn extract(_value: *mut PyObject) {}
}

impl ScriptReturn for () {
    unsafe fn into_value(self) -> *mut PyObject {
        unsafe {
            let none = Py_None();
            Py_XINCREF(none);
            none
        }
    }
}
