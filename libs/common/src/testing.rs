//! In-memory backend for tests
//!
//! `FakeApi` implements `PortfolioApi` against local state so session,
//! gallery and admin logic can be exercised without a server.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;

use crate::{
    error::{ApiError, ApiResult},
    http::PortfolioApi,
    models::{Collection, CollectionDraft, CollectionRef, Photo, PhotoUpload},
};

const ISSUED_TOKEN: &str = "fake-session-token";

#[derive(Default)]
struct FakeState {
    collections: Vec<Collection>,
    photos: Vec<Photo>,
    failing_collections: HashSet<String>,
    failing_uploads: HashSet<String>,
    uploads: Vec<PhotoUpload>,
    calls: Vec<String>,
    offline: bool,
    next_id: u32,
}

pub struct FakeApi {
    password: String,
    token: RwLock<Option<String>>,
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            token: RwLock::new(None),
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Token the fake issues on a successful login
    pub fn issued_token() -> &'static str {
        ISSUED_TOKEN
    }

    pub fn with_collection(self, collection: Collection) -> Self {
        self.state().collections.push(collection);
        self
    }

    pub fn with_photo(self, photo: Photo) -> Self {
        self.state().photos.push(photo);
        self
    }

    /// Make `GET /api/photos/collection/{id}` fail for this collection
    pub fn fail_collection_photos(&self, collection_id: &str) {
        self.state()
            .failing_collections
            .insert(collection_id.to_string());
    }

    /// Make uploads of the file with this name fail
    pub fn fail_upload(&self, file_name: &str) {
        self.state().failing_uploads.insert(file_name.to_string());
    }

    /// Simulate the backend being unreachable
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn uploads(&self) -> Vec<PhotoUpload> {
        self.state().uploads.clone()
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.state().collections.clone()
    }

    /// Every call received, as `METHOD path`
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: String) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: None,
            });
        }
        Ok(())
    }

    fn require_auth(&self) -> ApiResult<()> {
        if self.token().as_deref() == Some(ISSUED_TOKEN) {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: StatusCode::UNAUTHORIZED,
                message: Some("Invalid token".to_string()),
            })
        }
    }
}

#[async_trait]
impl PortfolioApi for FakeApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn login(&self, password: &str) -> ApiResult<String> {
        self.record("POST /api/auth/login".to_string())?;
        if password == self.password {
            Ok(ISSUED_TOKEN.to_string())
        } else {
            Err(ApiError::Status {
                status: StatusCode::UNAUTHORIZED,
                message: Some("Invalid password".to_string()),
            })
        }
    }

    async fn verify(&self) -> ApiResult<()> {
        self.record("POST /api/auth/verify".to_string())?;
        self.require_auth()
    }

    async fn public_collections(&self) -> ApiResult<Vec<Collection>> {
        self.record("GET /api/collections".to_string())?;
        Ok(self
            .state()
            .collections
            .iter()
            .filter(|c| c.is_published)
            .cloned()
            .collect())
    }

    async fn admin_collections(&self) -> ApiResult<Vec<Collection>> {
        self.record("GET /api/collections/admin".to_string())?;
        self.require_auth()?;
        Ok(self.collections())
    }

    async fn create_collection(&self, draft: &CollectionDraft) -> ApiResult<()> {
        self.record("POST /api/collections".to_string())?;
        self.require_auth()?;
        if draft.name.trim().is_empty() {
            return Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: Some("Name is required".to_string()),
            });
        }

        let mut state = self.state();
        state.next_id += 1;
        let id = format!("new-{}", state.next_id);
        state.collections.push(Collection {
            id,
            name: draft.name.clone(),
            description: (!draft.description.is_empty()).then(|| draft.description.clone()),
            is_published: draft.is_published,
            cover_image: None,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn update_collection(&self, id: &str, draft: &CollectionDraft) -> ApiResult<()> {
        self.record(format!("PUT /api/collections/{}", id))?;
        self.require_auth()?;

        let mut state = self.state();
        let collection = state
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: Some("Collection not found".to_string()),
            })?;
        collection.name = draft.name.clone();
        collection.description = (!draft.description.is_empty()).then(|| draft.description.clone());
        collection.is_published = draft.is_published;
        Ok(())
    }

    async fn delete_collection(&self, id: &str) -> ApiResult<()> {
        self.record(format!("DELETE /api/collections/{}", id))?;
        self.require_auth()?;

        let mut state = self.state();
        let before = state.collections.len();
        state.collections.retain(|c| c.id != id);
        if state.collections.len() == before {
            return Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: Some("Collection not found".to_string()),
            });
        }
        state.photos.retain(|p| p.collection.id() != id);
        Ok(())
    }

    async fn collection_photos(&self, collection_id: &str) -> ApiResult<Vec<Photo>> {
        self.record(format!("GET /api/photos/collection/{}", collection_id))?;

        let state = self.state();
        if state.failing_collections.contains(collection_id) {
            return Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: None,
            });
        }
        Ok(state
            .photos
            .iter()
            .filter(|p| p.collection.id() == collection_id)
            .cloned()
            .collect())
    }

    async fn upload_photo(&self, upload: &PhotoUpload) -> ApiResult<()> {
        self.record("POST /api/photos/upload".to_string())?;
        self.require_auth()?;

        let mut state = self.state();
        if state.failing_uploads.contains(&upload.file_name()) {
            return Err(ApiError::Status {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: Some(format!("Unsupported image: {}", upload.file_name())),
            });
        }

        state.next_id += 1;
        let photo = Photo {
            id: format!("upload-{}", state.next_id),
            title: upload.effective_title(),
            description: None,
            tags: Vec::new(),
            filename: upload.file_name(),
            collection: CollectionRef::Id(upload.collection.clone()),
            camera: None,
            lens: None,
            aperture: None,
            shutter: None,
            iso: None,
            focal_length: None,
            created_at: Utc::now(),
        };
        state.photos.push(photo);
        state.uploads.push(upload.clone());
        Ok(())
    }
}

/// A collection with fixed timestamps for assertions
pub fn sample_collection(id: &str, name: &str, published: bool) -> Collection {
    Collection {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        is_published: published,
        cover_image: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    }
}

/// A photo in `collection_id` with no optional metadata
pub fn sample_photo(id: &str, title: &str, collection_id: &str) -> Photo {
    Photo {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        tags: Vec::new(),
        filename: format!("{}.jpg", id),
        collection: CollectionRef::Id(collection_id.to_string()),
        camera: None,
        lens: None,
        aperture: None,
        shutter: None,
        iso: None,
        focal_length: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    }
}
