//! Script-to-host export tests.
//!
//! Host functions are registered once into the native module `m`; tests
//! drive them from the script side (probe callables defined in `__main__`)
//! and through the resolution surface, exercising the full loop in both
//! directions.

use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use pybridge::{Error, Module, ModuleDef, def, runtime};

fn joined(a: i32, b: i32) -> String {
    format!("{a}+{b}")
}

// Result fixed by the implementation, independent of the argument.
fn fixed_two(_value: i32) -> i32 {
    2
}

fn shout(text: String) -> String {
    text.to_uppercase()
}

fn accumulate(a: i32, b: i32, c: i32) -> i32 {
    a + b + c
}

fn nop() {}

fn panicking(_value: i32) -> i32 {
    panic!("host function went down")
}

static CALLS: AtomicUsize = AtomicUsize::new(0);

fn counted(value: i32) -> i32 {
    CALLS.fetch_add(1, Ordering::SeqCst);
    value
}

const PROBES: &str = r#"
import m

def arity_probe():
    try:
        m.counted(1, 2)
        return 0
    except TypeError:
        return 1

def panic_probe():
    try:
        m.panicking(7)
        return 0
    except RuntimeError:
        return 1

def call_joined(a, b):
    return m.joined(a, b)
"#;

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        runtime::with_gil(|| {
            ModuleDef::new(
                "m",
                vec![
                    def!("joined", joined),
                    def!("fixed_two", fixed_two, "always returns two"),
                    def!("shout", shout),
                    def!("accumulate", accumulate),
                    def!("nop", nop),
                    def!("panicking", panicking),
                    def!("counted", counted),
                ],
            )
            .expect("module name")
            .init()
            .expect("module registration");
            runtime::run(PROBES).expect("failed to define probe callables");
        });
    });
}

fn exported() -> Module {
    Module::import("m")
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_exported_module_resolves() {
    setup();
    runtime::with_gil(|| {
        assert!(exported().is_valid());
        assert!(exported().get("joined").is_valid());
    });
}

#[test]
fn test_export_round_trip() {
    setup();
    runtime::with_gil(|| {
        let joined_from_script = exported().get("joined");
        assert_eq!(joined_from_script.pcall::<String, _>((1, 2)), joined(1, 2));
    });
}

#[test]
fn test_export_called_through_script_code() {
    setup();
    runtime::with_gil(|| {
        let call_joined = Module::import("__main__").get("call_joined");
        assert_eq!(call_joined.pcall::<String, _>((3, 4)), "3+4");
    });
}

#[test]
fn test_result_is_not_coupled_to_the_argument() {
    setup();
    runtime::with_gil(|| {
        let fixed = exported().get("fixed_two");
        assert_eq!(fixed.pcall::<i32, _>((5,)), 2);
        assert_eq!(fixed.pcall::<i32, _>((99,)), 2);
    });
}

#[test]
fn test_string_argument_through_exporter() {
    setup();
    runtime::with_gil(|| {
        let shout = exported().get("shout");
        assert_eq!(shout.pcall::<String, _>(("quiet".to_string(),)), "QUIET");
    });
}

#[test]
fn test_three_argument_export() {
    setup();
    runtime::with_gil(|| {
        let accumulate = exported().get("accumulate");
        assert_eq!(accumulate.pcall::<i32, _>((1, 2, 3)), 6);
    });
}

#[test]
fn test_void_export_returns_no_value() {
    setup();
    runtime::with_gil(|| {
        let nop = exported().get("nop");
        nop.pcall::<(), _>(());
        assert!(!runtime::error_pending());
    });
}

// =============================================================================
// Arity contract
// =============================================================================

#[test]
fn test_arity_mismatch_never_reaches_the_host() {
    setup();
    runtime::with_gil(|| {
        let before = CALLS.load(Ordering::SeqCst);
        let arity_probe = Module::import("__main__").get("arity_probe");
        assert_eq!(arity_probe.pcall::<i32, _>(()), 1);
        assert_eq!(CALLS.load(Ordering::SeqCst), before);
    });
}

#[test]
fn test_matching_arity_reaches_the_host() {
    setup();
    runtime::with_gil(|| {
        let before = CALLS.load(Ordering::SeqCst);
        let counted = exported().get("counted");
        assert_eq!(counted.pcall::<i32, _>((11,)), 11);
        assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);
    });
}

// =============================================================================
// Failure containment
// =============================================================================

#[test]
fn test_host_panic_surfaces_as_script_error() {
    setup();
    runtime::with_gil(|| {
        let panic_probe = Module::import("__main__").get("panic_probe");
        assert_eq!(panic_probe.pcall::<i32, _>(()), 1);
    });
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_module_name_with_interior_nul_is_rejected() {
    let result = ModuleDef::new("bad\0name", vec![]);
    assert!(matches!(result, Err(Error::InvalidName(_))));
}

#[test]
fn test_descriptor_keeps_its_name() {
    let descriptor = def!("joined", joined);
    assert_eq!(descriptor.name(), "joined");
}
