//! Compile-time assembly of call signatures.
//!
//! The runtime's generic call API takes one null-terminated format string
//! describing the variadic argument list that follows. [`FormatTags`]
//! concatenates per-type tags into that string in `const` evaluation, and
//! [`ArgPack`] — implemented for argument tuples up to arity 8 — exposes the
//! assembled sequence as a per-instantiation constant and performs the
//! matching variadic call, so a given argument-type tuple pays no runtime
//! cost for signature construction.

use std::os::raw::c_char;

use pyo3_ffi::{PyObject, PyObject_CallFunction};

use crate::types::{RawArg, ToScript};

/// Capacity of one assembled tag sequence, terminator included.
pub const FORMAT_CAPACITY: usize = 16;

/// Highest argument count an [`ArgPack`] tuple may carry.
pub const MAX_ARITY: usize = 8;

/// A null-terminated format tag sequence in a fixed buffer.
///
/// Unused trailing bytes stay zero, which the runtime's call API treats as
/// the terminator; the zero-argument sequence is therefore the empty string,
/// a valid no-argument call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FormatTags {
    buf: [u8; FORMAT_CAPACITY],
}

impl FormatTags {
    pub const EMPTY: FormatTags = FormatTags {
        buf: [0; FORMAT_CAPACITY],
    };

    /// Concatenates `tags` in order. Evaluated at compile time when used in
    /// const position; overflowing the buffer is a compile-time panic.
    pub const fn join(tags: &[&str]) -> FormatTags {
        let mut buf = [0u8; FORMAT_CAPACITY];
        let mut written = 0;
        let mut i = 0;
        while i < tags.len() {
            let bytes = tags[i].as_bytes();
            let mut j = 0;
            while j < bytes.len() {
                assert!(
                    written < FORMAT_CAPACITY - 1,
                    "format tag sequence overflows its buffer"
                );
                buf[written] = bytes[j];
                written += 1;
                j += 1;
            }
            i += 1;
        }
        FormatTags { buf }
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.buf.as_ptr().cast()
    }

    /// The tag sequence up to the terminator.
    pub fn as_str(&self) -> &str {
        let len = self
            .buf
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(FORMAT_CAPACITY);
        std::str::from_utf8(&self.buf[..len]).unwrap_or("")
    }
}

/// An ordered tuple of call arguments.
///
/// `FORMAT` is the concatenation of each element's tag in tuple order, and
/// [`invoke`](ArgPack::invoke) passes the converted values to the runtime in
/// exactly that order — the pairing is fixed by construction, which is what
/// keeps the variadic call sound.
pub trait ArgPack {
    const FORMAT: FormatTags;

    /// Calls `callable` through the runtime's format-string call API,
    /// returning a new reference, or null when the call raised.
    ///
    /// # Safety
    ///
    /// `callable` must be a live runtime reference and the caller must hold
    /// the runtime's serialization (the GIL).
    unsafe fn invoke(self, callable: *mut PyObject) -> *mut PyObject;
}

macro_rules! impl_arg_pack {
    ($($ty:ident $value:ident),*) => {
        impl<$($ty: ToScript),*> ArgPack for ($($ty,)*) {
            const FORMAT: FormatTags = FormatTags::join(&[$($ty::TAG),*]);

            #[inline]
            unsafe fn invoke(self, callable: *mut PyObject) -> *mut PyObject {
                let ($($value,)*) = self;
                // Converted holders stay alive on this frame until the call
                // returns; the runtime copies or references what it needs.
                $(let $value = $value.convert();)*
                unsafe {
                    PyObject_CallFunction(callable, Self::FORMAT.as_ptr() $(, $value.as_raw())*)
                }
            }
        }
    };
}

impl_arg_pack!();
impl_arg_pack!(T0 a0);
impl_arg_pack!(T0 a0, T1 a1);
impl_arg_pack!(T0 a0, T1 a1, T2 a2);
impl_arg_pack!(T0 a0, T1 a1, T2 a2, T3 a3);
impl_arg_pack!(T0 a0, T1 a1, T2 a2, T3 a3, T4 a4);
impl_arg_pack!(T0 a0, T1 a1, T2 a2, T3 a3, T4 a4, T5 a5);
impl_arg_pack!(T0 a0, T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6);
impl_arg_pack!(T0 a0, T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7);
