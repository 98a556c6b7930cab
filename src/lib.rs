//! Bidirectional marshaling bridge for an embedded Python interpreter.
//!
//! Two directions, one per-type conversion registry:
//!
//! - **Host → script**: [`Module`] resolves callables into [`Invoker`]s;
//!   [`Invoker::pcall`] marshals Rust arguments through the runtime's
//!   format-string call API and extracts a Rust-typed result, recovering
//!   from script-side failures. [`Invoker::call`] is the unchecked variant
//!   for call sites where failure is impossible by construction.
//! - **Script → host**: [`def!`] wraps a plain Rust function into a
//!   script-callable entry point; [`ModuleDef`] registers a compile-time
//!   fixed list of them as a script module.
//!
//! Argument signatures are assembled at compile time ([`signature`]), and
//! every runtime reference this layer acquires is released exactly once
//! ([`guard::OwnedRef`], clone/move/drop symmetry on the handle types).
//!
//! The runtime serializes everything behind its global lock; wrap every use
//! of the bridge in [`runtime::with_gil`] or an equivalent caller-held
//! scope. Handle types are deliberately not `Send`/`Sync`.
//!
//! ```no_run
//! use pybridge::{Module, ModuleDef, def, runtime};
//!
//! fn double(value: i32) -> i32 {
//!     value * 2
//! }
//!
//! fn main() -> pybridge::Result<()> {
//!     runtime::with_gil(|| -> pybridge::Result<()> {
//!         ModuleDef::new("host", vec![def!("double", double)])?.init()?;
//!         runtime::run("import host\ndef quadruple(value):\n    return host.double(2 * value)\n")?;
//!         let quadruple = Module::import("__main__").get("quadruple");
//!         assert_eq!(quadruple.pcall::<i32, _>((5,)), 20);
//!         Ok(())
//!     })
//! }
//! ```

pub mod error;
pub mod export;
pub mod guard;
pub mod invoker;
pub mod module;
pub mod runtime;
pub mod signature;
pub mod types;

pub use error::{Error, Result};
pub use export::{MethodDescriptor, ModuleDef, NativeFn};
pub use guard::OwnedRef;
pub use invoker::Invoker;
pub use module::Module;
pub use signature::{ArgPack, FormatTags, MAX_ARITY};
pub use types::{FromScript, RawArg, ScriptReturn, ToScript};

/// Raw interpreter bindings, re-exported for macro expansions and advanced
/// callers.
pub use pyo3_ffi as ffi;
