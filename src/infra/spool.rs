//! Notification intake.
//!
//! Change notifications arrive as JSON files dropped into a spool
//! directory (the free-standing analog of a repository node-added event
//! under a fixed working area). The watcher polls the directory, hands
//! each notification to the invalidation service, and removes the file.
//! A malformed file is quarantined with a `.rejected` suffix and never
//! crashes the watcher; subsequent notifications always proceed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tracing::{error, info, warn};

use crate::domain::ChangeNotification;
use crate::engine::InvalidationService;

const NOTIFICATION_EXTENSION: &str = "json";
const REJECTED_EXTENSION: &str = "rejected";

pub struct SpoolWatcher {
    service: Arc<InvalidationService>,
    spool_dir: PathBuf,
    poll_interval: Duration,
}

impl SpoolWatcher {
    pub fn new(
        service: Arc<InvalidationService>,
        spool_dir: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            spool_dir,
            poll_interval,
        }
    }

    /// Poll the spool directory until the shutdown future resolves.
    pub async fn run(&self, shutdown: impl std::future::Future<Output = ()>) {
        info!(spool_dir = %self.spool_dir.display(), "spool watcher started");
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("spool watcher shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.drain_once().await;
                }
            }
        }
    }

    /// Process every pending notification file once, in name order.
    pub async fn drain_once(&self) -> usize {
        let mut pending = match self.pending_files().await {
            Ok(files) => files,
            Err(err) => {
                error!(
                    spool_dir = %self.spool_dir.display(),
                    error = %err,
                    "failed to list spool directory"
                );
                return 0;
            }
        };
        pending.sort();

        let mut processed = 0;
        for file in pending {
            if self.process_file(&file).await {
                processed += 1;
            }
        }
        processed
    }

    async fn pending_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.spool_dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == NOTIFICATION_EXTENSION)
            {
                files.push(path);
            }
        }
        Ok(files)
    }

    async fn process_file(&self, file: &Path) -> bool {
        let raw = match fs::read_to_string(file).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(file = %file.display(), error = %err, "failed to read notification file");
                return false;
            }
        };

        let notification: ChangeNotification = match serde_json::from_str(&raw) {
            Ok(notification) => notification,
            Err(err) => {
                warn!(
                    file = %file.display(),
                    error = %err,
                    "quarantining malformed notification"
                );
                self.quarantine(file).await;
                return false;
            }
        };

        let report = self.service.process(&notification).await;
        info!(
            file = %file.display(),
            pass_id = %report.pass_id,
            targets = report.targets.len(),
            failed = report.failed,
            "notification processed"
        );

        if let Err(err) = fs::remove_file(file).await {
            warn!(file = %file.display(), error = %err, "failed to remove processed notification");
        }
        true
    }

    async fn quarantine(&self, file: &Path) {
        let rejected = file.with_extension(REJECTED_EXTENSION);
        if let Err(err) = fs::rename(file, &rejected).await {
            warn!(
                file = %file.display(),
                error = %err,
                "failed to quarantine notification; removing instead"
            );
            let _ = fs::remove_file(file).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FlushError, StoreContext, StoreRegistry};
    use crate::engine::ports::FlushTransport;
    use crate::engine::{FullClearDecider, StrategyRegistry};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFlush {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FlushTransport for RecordingFlush {
        async fn flush(&self, path: &str) -> Result<(), FlushError> {
            self.calls
                .lock()
                .expect("flush recorder lock")
                .push(path.to_string());
            Ok(())
        }
    }

    fn watcher(dir: PathBuf, flush: Arc<RecordingFlush>) -> SpoolWatcher {
        let registry = Arc::new(StrategyRegistry::new());
        let stores = Arc::new(StoreRegistry::new([StoreContext {
            store_path: "/content/site/en".to_string(),
            client_id: "default".to_string(),
            store_view: "en".to_string(),
            product_page: "/content/site/en/product-page".to_string(),
            category_page: "/content/site/en/category-page".to_string(),
        }]));
        let service = Arc::new(InvalidationService::new(
            registry,
            stores,
            FullClearDecider::default(),
            flush,
        ));
        SpoolWatcher::new(service, dir, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn drains_pending_notifications_and_removes_files() {
        let dir = tempfile::tempdir().expect("spool dir");
        let file = dir.path().join("0001.json");
        std::fs::write(
            &file,
            r#"{"storePath": "/content/site/en", "fullClear": true}"#,
        )
        .expect("write notification");

        let flush = Arc::new(RecordingFlush::default());
        let watcher = watcher(dir.path().to_path_buf(), Arc::clone(&flush));

        assert_eq!(watcher.drain_once().await, 1);
        assert!(!file.exists());
        assert_eq!(
            *flush.calls.lock().expect("flush recorder lock"),
            vec!["/content/site/en".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_notification_is_quarantined_not_fatal() {
        let dir = tempfile::tempdir().expect("spool dir");
        let bad = dir.path().join("0001.json");
        std::fs::write(&bad, "not json").expect("write bad file");
        let good = dir.path().join("0002.json");
        std::fs::write(
            &good,
            r#"{"storePath": "/content/site/en", "fullClear": true}"#,
        )
        .expect("write good file");

        let flush = Arc::new(RecordingFlush::default());
        let watcher = watcher(dir.path().to_path_buf(), Arc::clone(&flush));

        assert_eq!(watcher.drain_once().await, 1);
        assert!(!bad.exists());
        assert!(dir.path().join("0001.rejected").exists());
        assert!(!good.exists());
    }

    #[tokio::test]
    async fn empty_spool_is_a_quiet_no_op() {
        let dir = tempfile::tempdir().expect("spool dir");
        let flush = Arc::new(RecordingFlush::default());
        let watcher = watcher(dir.path().to_path_buf(), Arc::clone(&flush));

        assert_eq!(watcher.drain_once().await, 0);
        assert!(flush.calls.lock().expect("flush recorder lock").is_empty());
    }
}
