//! # irproto-core
//!
//! A library for rendering a protocol-schema intermediate representation into
//! deterministic proto3 source text.
//!
//! This crate provides the core functionality for:
//! - Modelling namespaces, messages, enums and fields as an in-memory IR
//! - Resolving namespaces to packages, output paths and imports
//! - Emitting byte-stable `.proto` files, one per namespace or a single dump
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`ir`]: The intermediate representation handed over by a front-end
//! - [`compare`]: Locale-independent byte ordering used for every sort
//! - [`resolver`]: Namespace to path/package/import resolution
//! - [`proto`]: Enum, message and file emission
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use irproto_core::ir::{Class, ClassProperty, Namespace, Program, ScalarType};
//! use irproto_core::{CompilerConfig, Proto3Compiler};
//!
//! let program = Program::new().namespace(
//!     Namespace::new("Game.Net")
//!         .class(Class::new("Ping").property(ClassProperty::scalar("Seq", ScalarType::Uint32, 1))),
//! );
//!
//! let config = CompilerConfig::new()
//!     .output_dir("./out")
//!     .package_structured(true);
//! let report = Proto3Compiler::new(&program, config).compile()?;
//! for path in &report.written {
//!     println!("Wrote {}", path);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Determinism
//!
//! Output depends only on the IR and the configuration. Type names and import
//! paths are ordered with [`compare::byte_cmp`], never with locale-aware
//! collation, and the IR is never mutated during emission.
//!
//! ## Known limitations
//!
//! - Only the first nested enum named [`ir::ONEOF_MARKER`] in a class is used
//!   for oneof synthesis; any further ones are emitted as ordinary enums.
//! - When an enum has several zero-valued properties, the first one declared
//!   is written first and the others follow as aliases.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod compare;
pub mod error;
pub mod ir;
pub mod proto;
pub mod resolver;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use proto::{
    CompileMode, CompileReport, CompileStats, CompilerConfig, LayoutStrategy, Proto3Compiler,
    RenderedUnit,
};
pub use resolver::{DefaultResolver, NamespacePaths, NamespaceResolver};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
