//! Conversion, guard and bootstrap tests against a live interpreter.

use pybridge::ffi::{Py_None, Py_REFCNT};
use pybridge::{FromScript, OwnedRef, ScriptReturn, ToScript, runtime};

// =============================================================================
// Owned-string conversion
// =============================================================================

#[test]
fn test_owned_string_round_trip() {
    runtime::with_gil(|| {
        let text = "owned marshal round trip \u{2713}".to_string();
        let converted = text.clone().convert();
        unsafe {
            // The conversion produced the only reference; the guard owns it.
            assert_eq!(Py_REFCNT(converted.as_ptr()), 1);
            assert!(String::check(converted.as_ptr()));
            assert_eq!(String::extract(converted.as_ptr()), text);
        }
    });
}

#[test]
fn test_guard_transfers_ownership_exactly_once() {
    runtime::with_gil(|| {
        let converted = "guard transfer value".to_string().convert();
        let raw = converted.into_raw();
        // Re-wrapping restores the release-on-drop obligation.
        let adopted = OwnedRef::from_raw(raw);
        unsafe {
            assert_eq!(Py_REFCNT(adopted.as_ptr()), 1);
            assert_eq!(String::extract(adopted.as_ptr()), "guard transfer value");
        }
    });
}

// =============================================================================
// Return-value conversion
// =============================================================================

#[test]
fn test_int_return_conversion() {
    runtime::with_gil(|| unsafe {
        let value = OwnedRef::from_raw(42i32.into_value());
        assert!(i32::check(value.as_ptr()));
        assert_eq!(i32::extract(value.as_ptr()), 42);
    });
}

#[test]
fn test_unsigned_return_conversion() {
    runtime::with_gil(|| unsafe {
        let value = OwnedRef::from_raw(7u32.into_value());
        assert!(u32::check(value.as_ptr()));
        assert_eq!(u32::extract(value.as_ptr()), 7);
    });
}

#[test]
fn test_float_return_conversions() {
    runtime::with_gil(|| unsafe {
        let double = OwnedRef::from_raw(2.5f64.into_value());
        assert!(f64::check(double.as_ptr()));
        assert_eq!(f64::extract(double.as_ptr()), 2.5);

        let single = OwnedRef::from_raw(1.5f32.into_value());
        assert!(f32::check(single.as_ptr()));
        assert_eq!(f32::extract(single.as_ptr()), 1.5);
    });
}

#[test]
fn test_str_return_conversion() {
    runtime::with_gil(|| unsafe {
        let value = OwnedRef::from_raw("borrowed text".into_value());
        assert!(String::check(value.as_ptr()));
        assert_eq!(String::extract(value.as_ptr()), "borrowed text");
    });
}

#[test]
fn test_no_value_return_is_the_none_singleton() {
    runtime::with_gil(|| unsafe {
        let value = OwnedRef::from_raw(().into_value());
        assert_eq!(value.as_ptr(), Py_None());
        assert!(<() as FromScript>::check(value.as_ptr()));
    });
}

// =============================================================================
// Dynamic checks
// =============================================================================

#[test]
fn test_check_distinguishes_runtime_shapes() {
    runtime::with_gil(|| unsafe {
        let number = OwnedRef::from_raw(5i32.into_value());
        let text = OwnedRef::from_raw("text".into_value());

        assert!(i32::check(number.as_ptr()));
        assert!(!String::check(number.as_ptr()));
        assert!(String::check(text.as_ptr()));
        assert!(!i32::check(text.as_ptr()));
        assert!(!f64::check(number.as_ptr()));
    });
}

// =============================================================================
// Bootstrap
// =============================================================================

#[test]
fn test_no_error_pending_on_entry() {
    runtime::with_gil(|| {
        assert!(!runtime::error_pending());
    });
}

#[test]
fn test_run_executes_source() {
    runtime::with_gil(|| {
        runtime::run("bridge_probe = 1 + 1").expect("assignment runs");
    });
}
