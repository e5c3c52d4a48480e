//! Project configuration persistence.
//!
//! - [`atomic`] - Atomic JSON read/write primitives
//! - [`ConfigStore`] / [`ProjectConfig`] - declared-model state

pub mod atomic;
mod store;

pub use store::{ConfigStore, ProjectConfig};
