use pyo3_ffi::{PyObject, Py_XDECREF};

/// Exclusive owner of one runtime reference, released exactly once on drop.
///
/// Wrap every reference acquired from the runtime — conversion temporaries,
/// call results — so the release happens on every exit path. The guard is
/// deliberately not clonable; transferring ownership is a move, and
/// [`OwnedRef::into_raw`] hands the reference back out without releasing it.
pub struct OwnedRef {
    object: *mut PyObject,
}

impl OwnedRef {
    /// Takes ownership of `object`. A null handle is accepted and simply
    /// means there is nothing to release.
    pub fn from_raw(object: *mut PyObject) -> OwnedRef {
        OwnedRef { object }
    }

    /// Lends the raw handle without giving up ownership.
    pub fn as_ptr(&self) -> *mut PyObject {
        self.object
    }

    pub fn is_null(&self) -> bool {
        self.object.is_null()
    }

    /// Transfers the reference out; the guard no longer releases it.
    pub fn into_raw(self) -> *mut PyObject {
        let object = self.object;
        std::mem::forget(self);
        object
    }
}

impl Drop for OwnedRef {
    fn drop(&mut self) {
        unsafe { Py_XDECREF(self.object) };
    }
}
