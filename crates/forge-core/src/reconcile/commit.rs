//! Commit stage: drive acquisitions and persist the outcome in one write.

use crate::acquire::{AcquireArgs, Acquirer};
use crate::error::{ForgeError, Result};
use crate::model::{ModelRecord, ModelSet};
use crate::project::ConfigStore;
use tracing::{info, warn};

/// What the commit stage did with each approved model.
#[derive(Debug, Default)]
pub struct CommitOutcome {
    /// Records written to the project configuration.
    pub succeeded: ModelSet,
    /// Records whose acquisition failed; nothing was persisted for these.
    pub failed: ModelSet,
}

/// Acquire every approved model, then persist all successes in a single
/// configuration write.
///
/// Per-model acquisition failures are soft: the model lands in
/// `failed` and the loop continues. The one hard failure is the final
/// persistence write, which aborts with the names that were acquired
/// but not recorded.
pub async fn commit(
    store: &dyn ConfigStore,
    acquirer: &dyn Acquirer,
    approved: ModelSet,
) -> Result<CommitOutcome> {
    let models_dir = store.models_dir();
    let mut outcome = CommitOutcome::default();

    for mut record in approved {
        let args = match AcquireArgs::for_record(&record, models_dir.clone()) {
            Ok(args) => args,
            Err(e) => {
                warn!("Cannot acquire {}: {}", record.name, e);
                record.install_now = false;
                outcome.failed.push(record);
                continue;
            }
        };

        match acquirer.acquire(&args).await {
            Ok(Some(report)) => {
                report.apply_to(&mut record);
                record.downloaded = record.install_now;
                info!("Acquired {}", record.name);
                outcome.succeeded.push(record);
            }
            Ok(None) => {
                warn!("Acquisition of {} produced no report", record.name);
                record.install_now = false;
                outcome.failed.push(record);
            }
            // Acquisition errors never abort the batch; models already
            // acquired still reach the configuration write below.
            Err(e) => {
                warn!("Acquisition of {} failed: {}", record.name, e);
                record.install_now = false;
                outcome.failed.push(record);
            }
        }
    }

    // All-or-nothing: everything that succeeded enters the
    // configuration in one write.
    if !outcome.succeeded.is_empty() {
        let names = outcome.succeeded.names();
        if let Err(e) = store.append_declared(&outcome.succeeded) {
            warn!("Persisting configuration failed: {}", e);
            return Err(ForgeError::PersistFailed { names });
        }
        info!("Declared {} model(s)", names.len());
    }

    Ok(outcome)
}

/// Mark records for immediate download before committing, as the
/// update flow does for stale models.
pub fn mark_install_now(records: Vec<ModelRecord>) -> ModelSet {
    let mut marked = ModelSet::new();
    for mut record in records {
        record.install_now = true;
        marked.push(record);
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::AcquireReport;
    use crate::project::ProjectConfig;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Succeeds for every model except the names listed in `failing`
    /// (script exit) and `malformed` (unreadable report).
    #[derive(Default)]
    struct FakeAcquirer {
        failing: HashSet<String>,
        malformed: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Acquirer for FakeAcquirer {
        async fn acquire(&self, args: &AcquireArgs) -> Result<Option<AcquireReport>> {
            self.calls.lock().unwrap().push(args.model_name.clone());
            if self.failing.contains(&args.model_name) {
                return Err(ForgeError::AcquisitionFailed {
                    name: args.model_name.clone(),
                    message: "exit status 2".into(),
                });
            }
            if self.malformed.contains(&args.model_name) {
                return Err(ForgeError::Json {
                    message: "Downloader returned malformed report".into(),
                    source: None,
                });
            }
            Ok(Some(AcquireReport {
                path: Some(format!("models/{}", args.model_name)),
                module: Some(args.module.clone()),
                class: Some("AutoModel".into()),
                options: Vec::new(),
            }))
        }
    }

    /// Store that counts appends and optionally rejects them.
    struct CountingStore {
        inner: ProjectConfig,
        appends: AtomicUsize,
        reject: bool,
    }

    impl CountingStore {
        fn new(inner: ProjectConfig) -> Self {
            CountingStore {
                inner,
                appends: AtomicUsize::new(0),
                reject: false,
            }
        }
    }

    impl ConfigStore for CountingStore {
        fn list_declared(&self) -> Result<ModelSet> {
            self.inner.list_declared()
        }

        fn append_declared(&self, models: &ModelSet) -> Result<()> {
            self.appends.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(ForgeError::Config {
                    message: "disk full".into(),
                });
            }
            self.inner.append_declared(models)
        }

        fn remove_physical(&self, name: &str) -> Result<()> {
            self.inner.remove_physical(name)
        }

        fn models_dir(&self) -> PathBuf {
            self.inner.models_dir()
        }
    }

    fn record(name: &str) -> ModelRecord {
        ModelRecord {
            name: name.into(),
            module: Some("transformers".into()),
            install_now: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_partial_failure_persists_only_successes() {
        let dir = TempDir::new().unwrap();
        let store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        let acquirer = FakeAcquirer {
            failing: HashSet::from(["org/bad".to_string()]),
            ..Default::default()
        };

        let approved: ModelSet = vec![record("org/good"), record("org/bad")].into();
        let outcome = commit(&store, &acquirer, approved).await.unwrap();

        assert_eq!(outcome.succeeded.names(), vec!["org/good"]);
        assert_eq!(outcome.failed.names(), vec!["org/bad"]);
        assert_eq!(store.appends.load(Ordering::SeqCst), 1);
        assert_eq!(store.list_declared().unwrap().names(), vec!["org/good"]);
    }

    #[tokio::test]
    async fn test_malformed_report_does_not_abort_the_batch() {
        let dir = TempDir::new().unwrap();
        let store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        let acquirer = FakeAcquirer {
            malformed: HashSet::from(["org/second".to_string()]),
            ..Default::default()
        };

        let approved: ModelSet = vec![record("org/first"), record("org/second")].into();
        let outcome = commit(&store, &acquirer, approved).await.unwrap();

        assert_eq!(outcome.succeeded.names(), vec!["org/first"]);
        assert_eq!(outcome.failed.names(), vec!["org/second"]);
        // The acquired model is persisted even though the other one
        // errored outside the script's own exit status.
        assert_eq!(store.appends.load(Ordering::SeqCst), 1);
        assert_eq!(store.list_declared().unwrap().names(), vec!["org/first"]);
    }

    #[tokio::test]
    async fn test_all_failures_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        let acquirer = FakeAcquirer {
            failing: HashSet::from(["org/a".to_string(), "org/b".to_string()]),
            ..Default::default()
        };

        let approved: ModelSet = vec![record("org/a"), record("org/b")].into();
        let outcome = commit(&store, &acquirer, approved).await.unwrap();

        assert!(outcome.succeeded.is_empty());
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(store.appends.load(Ordering::SeqCst), 0);
        assert!(store.list_declared().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_names_acquired_models() {
        let dir = TempDir::new().unwrap();
        let mut store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        store.reject = true;
        let acquirer = FakeAcquirer::default();

        let approved: ModelSet = vec![record("org/a"), record("org/b")].into();
        let err = commit(&store, &acquirer, approved).await.unwrap_err();

        match err {
            ForgeError::PersistFailed { names } => {
                assert_eq!(names, vec!["org/a", "org/b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_report_fields_land_on_record() {
        let dir = TempDir::new().unwrap();
        let store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        let acquirer = FakeAcquirer::default();

        let approved: ModelSet = vec![record("org/a")].into();
        let outcome = commit(&store, &acquirer, approved).await.unwrap();

        let committed = outcome.succeeded.iter().next().unwrap();
        assert_eq!(committed.path.as_deref(), Some("models/org/a"));
        assert_eq!(committed.class.as_deref(), Some("AutoModel"));
        assert!(committed.downloaded);
    }

    #[tokio::test]
    async fn test_declare_only_record_is_not_downloaded() {
        let dir = TempDir::new().unwrap();
        let store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        let acquirer = FakeAcquirer::default();

        let mut deferred = record("org/later");
        deferred.install_now = false;

        let outcome = commit(&store, &acquirer, vec![deferred].into())
            .await
            .unwrap();

        let committed = outcome.succeeded.iter().next().unwrap();
        assert!(!committed.downloaded);
        // Configuration-only acquisition still ran the downloader.
        assert_eq!(
            acquirer.calls.lock().unwrap().as_slice(),
            ["org/later".to_string()]
        );
    }

    #[tokio::test]
    async fn test_record_without_module_fails_soft() {
        let dir = TempDir::new().unwrap();
        let store = CountingStore::new(ProjectConfig::open(dir.path()).unwrap());
        let acquirer = FakeAcquirer::default();

        let bare = ModelRecord::named("org/unknown");
        let outcome = commit(&store, &acquirer, vec![bare].into()).await.unwrap();

        assert_eq!(outcome.failed.names(), vec!["org/unknown"]);
        assert!(acquirer.calls.lock().unwrap().is_empty());
        assert_eq!(store.appends.load(Ordering::SeqCst), 0);
    }
}
