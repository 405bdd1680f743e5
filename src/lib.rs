//! # condarc-context
//!
//! Layered configuration resolution for a package-manager CLI.
//!
//! ## Overview
//!
//! `condarc-context` answers every configuration read from one [`Context`]
//! that sits over an ordered list of sources:
//! - Parsed command-line arguments (flags left at their default never count)
//! - Environment variables (`CONDA_*`, list settings split on a per-key delimiter)
//! - Configuration ("condarc") files, merged into one document
//! - System defaults and platform facts
//!
//! The first source that has a key answers. Files are merged among
//! themselves: earlier files win for scalars and sequences such as
//! `channels` are concatenated in file order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use condarc_context::prelude::*;
//!
//! # fn example() -> condarc_context::error::Result<()> {
//! let context = Context::builder()
//!     .with_args(ParsedArgs::new().set("json", true).unset("quiet"))
//!     .with_file("/home/me/.condarc")
//!     .with_file("/opt/conda/.condarc")
//!     .build();
//!
//! for err in context.diagnostics() {
//!     eprintln!("warning: {err}");
//! }
//!
//! let channels = context.channel_names()?;
//! let always_yes = context.get_bool("always_yes")?;
//! println!("{channels:?} {always_yes}");
//! # Ok(())
//! # }
//! ```
//!
//! [`Context`]: crate::core::Context

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod keys;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ChannelEntry, Context, ContextBuilder, ContextHandle, ReporterSelection, SystemDefaults,
    };
    pub use crate::error::{ContextError, FileParseError, Result};
    pub use crate::sources::{
        CliConfigSource, ConfigSource, EnvConfigSource, FileConfigSource, ParsedArgs, SourceKind,
    };
}
