//! Asset sync controller.
//!
//! Keeps [`GalleryState`] in step with the user's namespace in the object
//! store. The remote listing is the source of truth; the asset list is a
//! cache of it that uploads and deletes patch in place and refreshes replace
//! wholesale.
//!
//! Every mutating operation takes `&mut self`, so at most one upload is in
//! flight per controller and state is only touched between awaits.

use std::sync::Arc;

use anyhow::Context;
use async_channel::Receiver;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use url::Url;

use super::asset::{
    AcceptedFile, AssetKind, AssetRecord, IncomingFile, destination_path, split_stored_name,
};
use super::error::GalleryError;
use super::events::{EventHub, GalleryEvent};
use crate::auth::{AuthContext, UserIdentity};
use crate::config::GalleryConfig;
use crate::preview::{Preview, ViewerSettings};
use crate::services::storage::SharedStorageGateway;
use crate::state::{GalleryState, Notice, UploadStatus, UploadTask};

/// Outcome of one batch of files.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records added to the gallery, in upload order.
    pub uploaded: Vec<AssetRecord>,
    /// Files refused before any network call.
    pub rejected: Vec<GalleryError>,
    /// Files whose upload failed.
    pub failed: Vec<GalleryError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}

pub struct AssetSyncController {
    user: UserIdentity,
    gateway: SharedStorageGateway,
    upload_root: String,
    model_suffix: String,
    viewer: ViewerSettings,
    state: GalleryState,
    events: EventHub,
    last_timestamp: i64,
}

impl AssetSyncController {
    /// Create a controller for `user`. The gallery starts empty; call
    /// [`refresh_gallery`](Self::refresh_gallery) or use
    /// [`attach`](Self::attach) to load it.
    pub fn new(user: UserIdentity, gateway: SharedStorageGateway, config: &GalleryConfig) -> Self {
        Self {
            user,
            gateway,
            upload_root: config.upload_root.trim_matches('/').to_string(),
            model_suffix: config.model_suffix.clone(),
            viewer: config.viewer.clone(),
            state: GalleryState::default(),
            events: EventHub::default(),
            last_timestamp: 0,
        }
    }

    /// Create a controller for the signed-in user and load their gallery.
    ///
    /// A failed initial listing is surfaced as a notice, not an error; the
    /// controller is still returned with an empty gallery.
    pub async fn attach(
        auth: &dyn AuthContext,
        gateway: SharedStorageGateway,
        config: &GalleryConfig,
    ) -> Result<Self, GalleryError> {
        let user = auth.current_user().await.ok_or(GalleryError::NotSignedIn)?;

        if !gateway.is_connected().await {
            if let Err(e) = gateway.connect().await {
                tracing::error!("Failed to connect to asset storage: {:#}", e);
            }
        }

        let mut controller = Self::new(user, gateway, config);
        let _ = controller.refresh_gallery().await;
        Ok(controller)
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    /// Receive subsequent [`GalleryEvent`]s.
    ///
    /// The receiver holds at most [`EVENT_BUFFER`](super::events::EVENT_BUFFER)
    /// undrained events; newer ones are dropped for it until it catches up.
    pub fn subscribe(&mut self) -> Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    /// `{upload_root}/{user}/`, the namespace listed and written by this controller.
    pub fn user_prefix(&self) -> String {
        format!("{}/{}/", self.upload_root, self.user.id)
    }

    /// Validate a batch, then upload the accepted files one after another.
    ///
    /// Rejections and failures are surfaced per file and never stop the
    /// rest of the batch.
    pub async fn accept_files(
        &mut self,
        files: impl IntoIterator<Item = IncomingFile>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut accepted = Vec::new();

        for file in files {
            match file.accept(&self.model_suffix) {
                Ok(file) => accepted.push(file),
                Err(err) => {
                    self.surface(&err);
                    report.rejected.push(err);
                }
            }
        }

        for file in accepted {
            match self.upload_one(file).await {
                Ok(record) => report.uploaded.push(record),
                Err(err) => report.failed.push(err),
            }
        }

        report
    }

    /// Upload one validated file and prepend its record to the gallery.
    pub async fn upload_one(&mut self, file: AcceptedFile) -> Result<AssetRecord, GalleryError> {
        let timestamp = self.next_timestamp();
        let path = destination_path(&self.upload_root, self.user.id.as_str(), timestamp, &file.name);
        let data = file.data.clone();
        let content_type = file.content_type.clone();
        let (name, kind) = (file.name.clone(), file.kind);

        let task = UploadTask::new(file, path.clone());
        let task_id = task.id;
        self.state.upload = Some(task);
        self.events.emit(GalleryEvent::UploadStarted {
            task_id,
            path: path.clone(),
        });
        tracing::info!(path = %path, bytes = data.len(), "Uploading asset");

        let size = data.len() as u64;
        let outcome = match self.transfer(&path, data, &content_type).await {
            Ok(()) => self.resolve(&path).await.context(
                "the object was stored but its URL could not be resolved; refresh the gallery",
            ),
            Err(e) => Err(e),
        };

        let status = if outcome.is_ok() {
            UploadStatus::Succeeded
        } else {
            UploadStatus::Failed
        };
        if let Some(task) = self.state.upload.as_mut() {
            task.status = status;
        }
        self.events
            .emit(GalleryEvent::UploadFinished { task_id, status });
        self.state.upload = None;

        match outcome {
            Ok(url) => {
                let record = AssetRecord {
                    path: path.clone(),
                    url,
                    name,
                    kind,
                    uploaded_at: DateTime::<Utc>::from_timestamp_millis(timestamp),
                    size: Some(size),
                };
                self.state.assets.retain(|a| a.path != record.path);
                self.state.assets.insert(0, record.clone());
                self.events.emit(GalleryEvent::AssetsChanged {
                    count: self.state.assets.len(),
                });
                self.notify(Notice::info(format!("Uploaded {}", record.name)));
                tracing::info!(path = %path, "Upload complete");
                Ok(record)
            }
            Err(cause) => {
                let err = GalleryError::Upload { path, cause };
                self.surface(&err);
                Err(err)
            }
        }
    }

    /// Replace the gallery with the remote listing, most recent first.
    ///
    /// On any failure the previous asset list is kept.
    pub async fn refresh_gallery(&mut self) -> Result<(), GalleryError> {
        let prefix = self.user_prefix();

        match self.load_assets(&prefix).await {
            Ok(assets) => {
                tracing::debug!(prefix = %prefix, count = assets.len(), "Gallery refreshed");
                self.state.assets = assets;
                self.reconcile_selection();
                self.events.emit(GalleryEvent::AssetsChanged {
                    count: self.state.assets.len(),
                });
                Ok(())
            }
            Err(cause) => {
                let err = GalleryError::Listing { prefix, cause };
                self.surface(&err);
                Err(err)
            }
        }
    }

    /// Delete an asset remotely, then drop it from the gallery.
    ///
    /// Nothing changes locally unless the remote delete succeeds. Paths
    /// outside this user's namespace are refused without a remote call.
    pub async fn delete_asset(&mut self, path: &str) -> Result<(), GalleryError> {
        if !path.starts_with(&self.user_prefix()) {
            let err = GalleryError::Deletion {
                path: path.to_string(),
                cause: anyhow::anyhow!("path is outside of {}", self.user_prefix()),
            };
            self.surface(&err);
            return Err(err);
        }

        if let Err(cause) = self.gateway.delete(path).await {
            let err = GalleryError::Deletion {
                path: path.to_string(),
                cause,
            };
            self.surface(&err);
            return Err(err);
        }

        let before = self.state.assets.len();
        self.state.assets.retain(|a| a.path != path);
        if self.state.assets.len() != before {
            self.events.emit(GalleryEvent::AssetsChanged {
                count: self.state.assets.len(),
            });
        }
        if self.state.selected.as_ref().is_some_and(|s| s.path == path) {
            self.select_asset(None);
        }
        tracing::info!(path, "Asset deleted");
        Ok(())
    }

    /// Re-resolve the URL of one asset, e.g. after a presigned URL expired.
    pub async fn refresh_asset_url(&mut self, path: &str) -> Result<Url, GalleryError> {
        let url = match self.resolve(path).await {
            Ok(url) => url,
            Err(cause) => {
                let err = GalleryError::Listing {
                    prefix: path.to_string(),
                    cause,
                };
                self.surface(&err);
                return Err(err);
            }
        };

        for asset in self.state.assets.iter_mut().filter(|a| a.path == path) {
            asset.url = url.clone();
        }
        if let Some(selected) = self.state.selected.as_mut().filter(|s| s.path == path) {
            selected.url = url.clone();
        }
        Ok(url)
    }

    /// Open or close the preview overlay.
    pub fn select_asset(&mut self, asset: Option<AssetRecord>) {
        let path = asset.as_ref().map(|a| a.path.clone());
        self.state.selected = asset;
        self.events.emit(GalleryEvent::SelectionChanged { path });
    }

    /// What the preview overlay should show for the current selection.
    pub fn preview(&self) -> Option<Preview> {
        self.state
            .selected
            .as_ref()
            .map(|asset| Preview::for_asset(asset, &self.viewer))
    }

    pub fn drag_enter(&mut self) {
        self.state.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.state.drag_active = false;
    }

    /// End a drag and upload what was dropped.
    pub async fn drop_files(
        &mut self,
        files: impl IntoIterator<Item = IncomingFile>,
    ) -> BatchReport {
        self.state.drag_active = false;
        self.accept_files(files).await
    }

    pub fn dismiss_notice(&mut self) {
        self.state.notice = None;
    }

    /// Milliseconds since the epoch, strictly increasing per controller so
    /// two uploads never share a destination path.
    fn next_timestamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }

    /// Run the gateway put while folding its progress reports into the task.
    async fn transfer(&mut self, path: &str, data: Bytes, content_type: &str) -> anyhow::Result<()> {
        if let Some(task) = self.state.upload.as_mut() {
            task.status = UploadStatus::InProgress;
        }

        let gateway = Arc::clone(&self.gateway);
        let (tx, rx) = async_channel::unbounded();
        let put = {
            let path = path.to_string();
            let content_type = content_type.to_string();
            async move { gateway.put(&path, data, &content_type, tx).await }
        };
        let track = async {
            while let Ok(progress) = rx.recv().await {
                self.record_progress(progress.ratio());
            }
        };

        let (result, ()) = futures::join!(put, track);
        result
    }

    fn record_progress(&mut self, ratio: f64) {
        let Some(task) = self.state.upload.as_mut() else {
            return;
        };
        let before = task.progress_ratio;
        let now = task.advance(ratio);
        if now > before {
            let task_id = task.id;
            self.events
                .emit(GalleryEvent::UploadProgress { task_id, ratio: now });
        }
    }

    async fn resolve(&self, path: &str) -> anyhow::Result<Url> {
        let raw = self.gateway.resolve_url(path).await?;
        Url::parse(&raw).with_context(|| format!("Storage returned an invalid URL for {}: {}", path, raw))
    }

    async fn load_assets(&self, prefix: &str) -> anyhow::Result<Vec<AssetRecord>> {
        let objects = self.gateway.list(prefix).await?;
        let mut assets = Vec::with_capacity(objects.len());

        for object in objects {
            let Some(kind) = AssetKind::from_stored(&object, &self.model_suffix) else {
                tracing::debug!(path = %object.path, "Skipping object that is neither image nor model");
                continue;
            };
            let url = self.resolve(&object.path).await?;
            let (stamp, name) = split_stored_name(&object.name);

            assets.push(AssetRecord {
                path: object.path.clone(),
                url,
                name: name.to_string(),
                kind,
                uploaded_at: stamp.or(object.last_modified),
                size: object.size,
            });
        }

        assets.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
        Ok(assets)
    }

    /// Keep the selection pointing at a listed asset, with its fresh URL.
    fn reconcile_selection(&mut self) {
        let Some(selected) = self.state.selected.as_ref() else {
            return;
        };
        match self.state.find(&selected.path).cloned() {
            Some(fresh) => self.state.selected = Some(fresh),
            None => self.select_asset(None),
        }
    }

    /// Log an error and show it to the user.
    fn surface(&mut self, err: &GalleryError) {
        if err.is_validation() {
            tracing::warn!("Rejected file: {}", err);
        } else {
            tracing::error!("{}", err);
        }
        self.notify(Notice::from(err));
    }

    fn notify(&mut self, notice: Notice) {
        self.state.notice = Some(notice.clone());
        self.events.emit(GalleryEvent::Notice(notice));
    }
}
