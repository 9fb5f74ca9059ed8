//! Core traits, settings, and module registry shared by every bookswap crate.

pub mod capabilities;
pub mod module;
pub mod registry;
pub mod settings;

pub use capabilities::{Capabilities, Clock, IdGenerator};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
