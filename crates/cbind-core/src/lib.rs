//! Type model and module preparation for C binding generation.
//!
//! A C front end hands over a [`Module`] of fully resolved declarations.
//! This crate decides which of them the public interface actually needs
//! and reshapes nested containers so each can be emitted on its own.
//!
//! ## Modules
//!
//! - [`types`] — The closed set of C type shapes
//! - [`module`] — Containers, enums, aliases, fields, and methods
//! - [`primitives`] — C scalar spellings resolvable without a declaration
//! - [`prune`] — Reachability pruning from the public interface
//! - [`flatten`] — Promotion of inline containers to the top level
//! - [`graph`] — Layered topological sorting over keyed nodes
//! - [`hash`] — Content digests of modules

pub mod error;
pub mod flatten;
pub mod graph;
pub mod hash;
pub mod module;
pub mod primitives;
pub mod prune;
pub mod types;

pub use error::CoreError;
pub use flatten::flatten;
pub use module::{Container, Enum, EnumEntry, Field, Method, Module, Property, TypeAlias};
pub use primitives::Primitive;
pub use prune::prune;
pub use types::{ContainerKind, FunctionParameter, Type};
