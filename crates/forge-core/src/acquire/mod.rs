//! External acquisition step: download or configure one model.
//!
//! The commit stage drives acquisitions through the [`Acquirer`] trait.
//! [`ScriptAcquirer`] is the real implementation: it deploys an embedded
//! Python downloader into the project and runs it with the project
//! virtualenv's interpreter.

mod args;
mod executor;
pub mod scripts;

pub use args::{AcquireArgs, AcquireReport};
pub use executor::ScriptAcquirer;

use crate::error::Result;
use async_trait::async_trait;

/// Performs the download/materialization for one resolved model.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Run one acquisition.
    ///
    /// `Ok(None)` means the step completed without producing anything to
    /// record; the commit stage treats it like a failure for that model.
    async fn acquire(&self, args: &AcquireArgs) -> Result<Option<AcquireReport>>;
}
