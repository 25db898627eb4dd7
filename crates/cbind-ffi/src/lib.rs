//! FFI binding generation from a prepared C module.
//!
//! Maps C types to foreign-call descriptors, turns declarations into
//! emission elements, orders them so that every element only refers to
//! names already provided (splitting containers to break cycles), and
//! renders the result as Python `ctypes` source.
//!
//! ## Modules
//!
//! - [`descriptor`] — Target-side type descriptors
//! - [`mapper`] — C type → descriptor mapping with a remapping table
//! - [`element`] — Emission units and container splitting
//! - [`generate`] — Element generation from a pruned module
//! - [`dependency`] — Dependency graph construction over elements
//! - [`arrange`] — Cycle-breaking topological ordering
//! - [`system`] — Library surface: globals, functions, and the full pipeline
//! - [`emit`] — Python `ctypes` rendering

pub mod arrange;
pub mod dependency;
pub mod descriptor;
pub mod element;
pub mod emit;
pub mod error;
pub mod generate;
pub mod mapper;
pub mod system;

pub use arrange::{arrange, Arrangement};
pub use dependency::{DependencyGraphBuilder, DependencyKey};
pub use descriptor::FfiType;
pub use element::{ContainerElement, ContainerField, Element};
pub use error::FfiError;
pub use generate::{generate_elements, GeneratedElements};
pub use mapper::{map_type, RemappingTable};
pub use system::{generate_system, GenerateOptions, SystemBinding, SystemField, SystemMethod};
