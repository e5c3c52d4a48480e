//! Reconciliation pipeline.
//!
//! Two stages: [`ReconcileEngine`] turns requested names plus catalog,
//! disk and configuration state into an approved set, and [`commit`]
//! drives acquisitions then persists every success in one write.
//! [`plan_update`] re-checks declared models against the catalog and
//! feeds the stale ones back through [`commit`].

mod commit;
mod engine;
mod update;

pub use commit::{commit, mark_install_now, CommitOutcome};
pub use engine::{ReconcileEngine, ReconcileOptions, Reconciliation};
pub use update::{plan_update, UpdatePlan};
