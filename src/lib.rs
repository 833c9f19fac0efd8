//! # kernlib
//!
//! Load a prebuilt native kernel library at runtime and call its vector-add
//! entry point across the FFI boundary.
//!
//! The library exports one function taking a `double` and returning a pointer
//! to a `{ double amount; double time; }` record. `kernlib` resolves it by its
//! exact (possibly mangled) name, null- and alignment-checks the returned
//! pointer, and copies the record out before handing it back, so no native
//! memory outlives the call.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kernlib::{Input, Invocation, SymbolName};
//!
//! let outcomes = Invocation::new()
//!     .set_library_path("build/Debug/libcuda-python.so")
//!     .set_symbol(SymbolName::new("VectorAdd")?)
//!     .set_input(Input::Random)
//!     .run()?;
//!
//! for outcome in &outcomes {
//!     println!("{}", outcome.result);
//! }
//! # Ok::<(), kernlib::Error>(())
//! ```
//!
//! ```no_run
//! use kernlib::NativeBuild;
//!
//! // Build the native library first, then load what it produced.
//! let library = NativeBuild::new()
//!     .set_source_path("./native")
//!     .set_preset("default")
//!     .build()?;
//!
//! let rx = kernlib::Invocation::new().set_library_path(library).spawn();
//! let outcomes = rx.recv().unwrap()?;
//! # Ok::<(), kernlib::Error>(())
//! ```

pub mod build;
pub mod cli;
pub mod cmake;
pub mod config;
pub mod error;
pub mod invoke;
pub mod library;
pub mod record;
pub mod report;
pub mod symbol;

pub use build::NativeBuild;
pub use config::LaunchConfig;
pub use error::{Error, Result};
pub use invoke::{Input, Invocation, Outcome};
pub use library::{KernelLibrary, ResultOwnership, VectorAddKernel};
pub use record::VectorAddResult;
pub use symbol::SymbolName;
