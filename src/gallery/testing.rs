//! Scripted storage gateway for controller tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::services::storage::{
    ObjectInfo, ProgressSender, StorageGateway, StorageType, TransferProgress,
};

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: Option<DateTime<Utc>>,
}

impl StoredObject {
    fn info(&self, path: &str) -> ObjectInfo {
        ObjectInfo::file(
            path.to_string(),
            Some(self.data.len() as u64),
            self.last_modified,
            Some(self.content_type.clone()),
        )
    }
}

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    pub chunk_size: usize,
    pub fail_put: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_resolve: AtomicBool,
    pub fail_delete: AtomicBool,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Place an object directly, as if another client had uploaded it.
    pub fn seed(&self, path: &str, content_type: &str) {
        self.seed_at(path, content_type, None);
    }

    /// Like [`seed`](Self::seed), with the modification time the store reports.
    pub fn seed_at(&self, path: &str, content_type: &str, last_modified: Option<DateTime<Utc>>) {
        self.objects.lock().unwrap().insert(
            path.to_string(),
            StoredObject {
                data: Bytes::from_static(b"seed"),
                content_type: content_type.to_string(),
                last_modified,
            },
        );
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn fail(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    fn failing(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageGateway for ScriptedGateway {
    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }

    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        progress: ProgressSender,
    ) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let total = data.len() as u64;
        let step = self.chunk_size.max(1);

        let mut sent = 0usize;
        while sent < data.len() {
            sent = (sent + step).min(data.len());
            if sent < data.len() {
                let _ = progress.send(TransferProgress::new(sent as u64, total)).await;
            }
            if Self::failing(&self.fail_put) {
                return Err(anyhow!("connection reset"));
            }
        }
        if Self::failing(&self.fail_put) {
            return Err(anyhow!("connection reset"));
        }

        self.objects.lock().unwrap().insert(
            path.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                last_modified: Some(Utc::now()),
            },
        );
        let _ = progress.send(TransferProgress::new(total, total)).await;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        if Self::failing(&self.fail_list) {
            return Err(anyhow!("permission denied"));
        }
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, object)| object.info(path))
            .collect())
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        if Self::failing(&self.fail_resolve) {
            return Err(anyhow!("token expired"));
        }
        Ok(format!("https://storage.test/{}", path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if Self::failing(&self.fail_delete) {
            return Err(anyhow!("service unavailable"));
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<ObjectInfo> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(path)
            .map(|object| object.info(path))
            .ok_or_else(|| anyhow!("Object not found: {}", path))
    }

    fn object_uri(&self, path: &str) -> String {
        format!("test://{}", path)
    }
}
