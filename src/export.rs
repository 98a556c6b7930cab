//! Exposing host functions as script-callable module functions.
//!
//! One exported function is one compile-time binding: the [`def!`](crate::def)
//! macro generates a dedicated `extern "C"` trampoline around the named host
//! function, [`NativeFn`] supplies the arity-generic unpack/invoke/convert
//! body, and [`ModuleDef`] assembles the descriptors into the
//! null-terminated method table the runtime enumerates.

use std::ffi::CString;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;

use pyo3_ffi::{
    METH_VARARGS, PyCFunction, PyErr_Clear, PyErr_SetString, PyExc_RuntimeError, PyExc_TypeError,
    PyImport_AddModule, PyMethodDef, PyMethodDefPointer, PyModule_AddFunctions, PyObject,
    PyTuple_GetItem, PyTuple_Size,
};

use crate::error::{Error, Result};
use crate::types::{FromScript, ScriptReturn};

/// A host function invocable from the script side.
///
/// Implemented for every plain function (and non-capturing closure) of
/// arity 0..=8 whose arguments extract via [`FromScript`] and whose result
/// converts via [`ScriptReturn`]. The `Args` parameter only disambiguates
/// the arity; inference resolves it from the function's signature.
pub trait NativeFn<Args> {
    /// Unpacks the incoming argument tuple, invokes the host function and
    /// converts its result into a new runtime reference.
    ///
    /// The argument count is a hard contract: on mismatch a runtime-level
    /// type error is set and the host function is never invoked.
    ///
    /// # Safety
    ///
    /// `args` must be a live argument tuple handed in by the runtime's
    /// method dispatch.
    unsafe fn invoke(&self, args: *mut PyObject) -> *mut PyObject;
}

macro_rules! impl_native_fn {
    ($arity:literal $(, $ty:ident $idx:tt)*) => {
        impl<Fun, Ret $(, $ty)*> NativeFn<($($ty,)*)> for Fun
        where
            Fun: Fn($($ty),*) -> Ret,
            Ret: ScriptReturn,
            $($ty: FromScript,)*
        {
            unsafe fn invoke(&self, args: *mut PyObject) -> *mut PyObject {
                unsafe {
                    if PyTuple_Size(args) != $arity {
                        PyErr_SetString(
                            PyExc_TypeError,
                            concat!("expected exactly ", $arity, " argument(s)\0")
                                .as_ptr()
                                .cast(),
                        );
                        return ptr::null_mut();
                    }
                    let result = (self)($($ty::extract(PyTuple_GetItem(args, $idx))),*);
                    result.into_value()
                }
            }
        }
    };
}

impl_native_fn!(0);
impl_native_fn!(1, A0 0);
impl_native_fn!(2, A0 0, A1 1);
impl_native_fn!(3, A0 0, A1 1, A2 2);
impl_native_fn!(4, A0 0, A1 1, A2 2, A3 3);
impl_native_fn!(5, A0 0, A1 1, A2 2, A3 3, A4 4);
impl_native_fn!(6, A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);
impl_native_fn!(7, A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);
impl_native_fn!(8, A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7);

/// Trampoline body shared by every [`def!`](crate::def) expansion.
///
/// A panicking host function must not unwind into the runtime; it is caught
/// here and surfaced as a runtime-level error instead.
#[doc(hidden)]
pub unsafe fn dispatch<Args>(fun: &impl NativeFn<Args>, args: *mut PyObject) -> *mut PyObject {
    match catch_unwind(AssertUnwindSafe(|| unsafe { fun.invoke(args) })) {
        Ok(value) => value,
        Err(_) => {
            unsafe {
                PyErr_SetString(PyExc_RuntimeError, c"native callable panicked".as_ptr());
            }
            ptr::null_mut()
        }
    }
}

/// Describes one exportable host function.
///
/// Built by [`def!`](crate::def); immutable once built.
#[derive(Clone, Copy)]
pub struct MethodDescriptor {
    name: &'static str,
    meth: PyCFunction,
    doc: Option<&'static str>,
}

impl MethodDescriptor {
    pub fn new(
        name: &'static str,
        meth: PyCFunction,
        doc: Option<&'static str>,
    ) -> MethodDescriptor {
        MethodDescriptor { name, meth, doc }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Describes one exportable function: `def!(name, function)` or
/// `def!(name, function, doc)`.
///
/// `function` must be a path to a plain function; its identity is baked
/// into a dedicated trampoline at expansion, so every (module, function)
/// pair gets its own fixed entry point.
#[macro_export]
macro_rules! def {
    ($name:expr, $fun:path, @doc $doc:expr) => {{
        unsafe extern "C" fn trampoline(
            _slf: *mut $crate::ffi::PyObject,
            args: *mut $crate::ffi::PyObject,
        ) -> *mut $crate::ffi::PyObject {
            unsafe { $crate::export::dispatch(&$fun, args) }
        }
        $crate::export::MethodDescriptor::new($name, trampoline, $doc)
    }};
    ($name:expr, $fun:path) => {
        $crate::def!($name, $fun, @doc ::core::option::Option::None)
    };
    ($name:expr, $fun:path, $doc:expr) => {
        $crate::def!($name, $fun, @doc ::core::option::Option::Some($doc))
    };
}

/// A named module assembled from [`def!`](crate::def) descriptors.
///
/// [`init`](ModuleDef::init) builds the method table — one entry per
/// descriptor plus the null sentinel the runtime's enumeration expects —
/// and registers it under the module name.
pub struct ModuleDef {
    name: CString,
    methods: Vec<MethodDescriptor>,
}

impl ModuleDef {
    pub fn new(name: &str, methods: Vec<MethodDescriptor>) -> Result<ModuleDef> {
        Ok(ModuleDef {
            name: CString::new(name)?,
            methods,
        })
    }

    /// Registers every described function with the runtime.
    ///
    /// Call once, after the runtime is initialized, with the caller holding
    /// the runtime's serialization. The method table and its name strings
    /// are handed to the runtime for the remainder of the process, which is
    /// the only lifetime the runtime supports for them.
    pub fn init(&self) -> Result<()> {
        let mut table = Vec::with_capacity(self.methods.len() + 1);
        for method in &self.methods {
            let name = CString::new(method.name)?;
            let doc = match method.doc {
                Some(doc) => CString::new(doc)?.into_raw().cast_const(),
                None => ptr::null(),
            };
            table.push(PyMethodDef {
                ml_name: name.into_raw().cast_const(),
                ml_meth: PyMethodDefPointer {
                    PyCFunction: method.meth,
                },
                ml_flags: METH_VARARGS,
                ml_doc: doc,
            });
        }
        table.push(PyMethodDef::zeroed());
        let table = Vec::leak(table);

        unsafe {
            let module = PyImport_AddModule(self.name.as_ptr());
            if module.is_null() {
                PyErr_Clear();
                return Err(Error::Registration(self.display_name()));
            }
            if PyModule_AddFunctions(module, table.as_mut_ptr()) != 0 {
                PyErr_Clear();
                return Err(Error::Registration(self.display_name()));
            }
        }

        tracing::debug!(
            module = %self.display_name(),
            functions = self.methods.len(),
            "registered native module"
        );
        Ok(())
    }

    fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}
