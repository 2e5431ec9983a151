//! Photo upload: the queue of selected files and the sequential uploader
//!
//! Every queued file owns a preview handle. Handles are released when the
//! file leaves the queue, whether it was removed, replaced or uploaded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use common::{
    http::PortfolioApi,
    models::{Collection, PhotoMetadata, PhotoUpload},
    notify::Notifications,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AdminError, AdminResult};

/// Extensions accepted for upload, lowercase
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

type LiveSet = Arc<Mutex<HashSet<String>>>;

/// Issues preview handles and tracks which are still live
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: LiveSet,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, source: &Path) -> PreviewHandle {
        let url = format!("preview:{}", Uuid::new_v4());
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.clone());

        PreviewHandle {
            url,
            source: source.to_path_buf(),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
    }
}

/// Local preview of a selected file, released on drop
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    source: PathBuf,
    live: LiveSet,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.url);
    }
}

#[derive(Debug)]
pub struct QueuedFile {
    preview: PreviewHandle,
}

impl QueuedFile {
    pub fn path(&self) -> &Path {
        self.preview.source()
    }

    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Files selected for upload
pub struct UploadQueue {
    registry: PreviewRegistry,
    files: Vec<QueuedFile>,
}

impl UploadQueue {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            files: Vec::new(),
        }
    }

    /// Append files, one preview each. Returns the rejected ones
    pub fn add<I>(&mut self, paths: I) -> Vec<AdminError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut rejected = Vec::new();
        for path in paths {
            if is_accepted(&path) {
                let preview = self.registry.create(&path);
                self.files.push(QueuedFile { preview });
            } else {
                warn!("Rejected {} for upload", path.display());
                rejected.push(AdminError::UnsupportedFile(path.display().to_string()));
            }
        }
        rejected
    }

    /// Drop every queued file, then add `paths`
    pub fn replace<I>(&mut self, paths: I) -> Vec<AdminError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.clear();
        self.add(paths)
    }

    /// Remove one file, releasing only its preview
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.files.len() {
            return None;
        }
        let file = self.files.remove(index);
        Some(file.path().to_path_buf())
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Keep the files whose flag is true, in order
    fn retain_flagged(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.files.retain(|_| flags.next().copied().unwrap_or(true));
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Outcome of one file in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_name: String,
    /// User-facing error, when the upload failed
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub results: Vec<UploadResult>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// The single notification shown for the whole batch
    pub fn summary(&self) -> String {
        let total = self.results.len();
        if self.is_success() {
            return format!("Successfully uploaded {} photo(s)", total);
        }

        let first_error = self
            .results
            .iter()
            .find_map(|r| r.error.clone())
            .unwrap_or_default();
        if self.succeeded() == 0 {
            format!("Failed to upload {} photo(s): {}", total, first_error)
        } else {
            format!(
                "Uploaded {} of {} photo(s), {} failed: {}",
                self.succeeded(),
                total,
                self.failed(),
                first_error
            )
        }
    }
}

pub struct PhotoUploader {
    api: Arc<dyn PortfolioApi>,
    collections: Vec<Collection>,
    collection: Option<String>,
    metadata: PhotoMetadata,
    queue: UploadQueue,
    uploading: bool,
    notifications: Notifications,
}

impl PhotoUploader {
    pub fn new(api: Arc<dyn PortfolioApi>, previews: PreviewRegistry) -> Self {
        Self {
            api,
            collections: Vec::new(),
            collection: None,
            metadata: PhotoMetadata::default(),
            queue: UploadQueue::new(previews),
            uploading: false,
            notifications: Notifications::new(),
        }
    }

    /// Collections the user can upload into
    pub async fn load_collections(&mut self) {
        match self.api.admin_collections().await {
            Ok(collections) => self.collections = collections,
            Err(e) => {
                tracing::error!("Failed to fetch admin collections: {}", e);
                self.notifications.error("Error fetching collections");
                self.collections.clear();
            }
        }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn select_collection(&mut self, id: &str) {
        self.collection = Some(id.to_string()).filter(|id| !id.is_empty());
    }

    pub fn selected_collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn metadata(&self) -> &PhotoMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut PhotoMetadata {
        &mut self.metadata
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut UploadQueue {
        &mut self.queue
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Upload every queued file, one request at a time
    ///
    /// A full success clears the queue and the metadata but keeps the
    /// selected collection. Otherwise only the failed files stay queued
    /// and the metadata is kept for a retry.
    pub async fn submit(&mut self) -> AdminResult<UploadReport> {
        let collection = match self.collection.clone() {
            Some(collection) => collection,
            None => return Err(self.reject(AdminError::NoCollection)),
        };
        if self.queue.is_empty() {
            return Err(self.reject(AdminError::NoFiles));
        }

        self.uploading = true;
        let mut report = UploadReport::default();

        for file in self.queue.files() {
            let upload = PhotoUpload {
                file: file.path().to_path_buf(),
                collection: collection.clone(),
                metadata: self.metadata.clone(),
            };

            let error = match self.api.upload_photo(&upload).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("Upload of {} failed: {}", upload.file_name(), e);
                    Some(e.user_message("Error uploading photos"))
                }
            };
            report.results.push(UploadResult {
                file_name: file.file_name(),
                error,
            });
        }

        self.uploading = false;
        info!(
            "Upload finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        if report.is_success() {
            self.notifications.success(report.summary());
            self.queue.clear();
            self.metadata = PhotoMetadata::default();
        } else {
            self.notifications.error(report.summary());
            let keep: Vec<bool> = report.results.iter().map(|r| r.error.is_some()).collect();
            self.queue.retain_flagged(&keep);
        }

        Ok(report)
    }

    fn reject(&mut self, error: AdminError) -> AdminError {
        self.notifications.error(error.to_string());
        error
    }
}
