//! HTTP client wrapper for the portfolio backend
//!
//! `PortfolioApi` is the seam every front-end area talks through. `HttpApi`
//! is the real implementation: it owns the base URL and attaches the
//! current session token as a bearer credential to every request.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    error::{ApiError, ApiResult},
    models::{Collection, CollectionDraft, LoginRequest, LoginResponse, Photo, PhotoUpload},
};

/// Operations the client performs against the backend
#[async_trait]
pub trait PortfolioApi: Send + Sync {
    /// Replace the credential attached to subsequent requests
    fn set_token(&self, token: Option<String>);

    /// Credential currently attached to requests
    fn token(&self) -> Option<String>;

    /// `POST /api/auth/login`, returning the issued token
    async fn login(&self, password: &str) -> ApiResult<String>;

    /// `POST /api/auth/verify` with the attached token
    async fn verify(&self) -> ApiResult<()>;

    /// `GET /api/collections` (published only)
    async fn public_collections(&self) -> ApiResult<Vec<Collection>>;

    /// `GET /api/collections/admin` (all, requires auth)
    async fn admin_collections(&self) -> ApiResult<Vec<Collection>>;

    /// `POST /api/collections`
    async fn create_collection(&self, draft: &CollectionDraft) -> ApiResult<()>;

    /// `PUT /api/collections/{id}`
    async fn update_collection(&self, id: &str, draft: &CollectionDraft) -> ApiResult<()>;

    /// `DELETE /api/collections/{id}`
    async fn delete_collection(&self, id: &str) -> ApiResult<()>;

    /// `GET /api/photos/collection/{id}`
    async fn collection_photos(&self, collection_id: &str) -> ApiResult<Vec<Photo>>;

    /// `POST /api/photos/upload`, one file per request
    async fn upload_photo(&self, upload: &PhotoUpload) -> ApiResult<()>;
}

/// `PortfolioApi` over `reqwest`
pub struct HttpApi {
    client: Client,
    api_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    /// Create a client for the configured API base
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Transport)?;

        info!("HTTP client initialized with API URL: {}", api_url);

        Ok(Self {
            client,
            api_url,
            token: RwLock::new(None),
        })
    }

    /// Append path segments to the API base, percent-encoding each one
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let request = self.client.request(method, self.url(segments)?);
        Ok(match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        debug!("{} {}", status, response.url());

        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn list<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<Vec<T>> {
        let response = self.send(self.request(Method::GET, segments)?).await?;
        let path = response.url().path().to_string();
        let body: serde_json::Value = response.json().await?;
        decode_list(&path, body)
    }
}

/// Build an `ApiError::Status` carrying the backend's `message`, if any
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<serde_json::Value>(&body).ok())
        .and_then(|body| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    ApiError::Status { status, message }
}

/// Decode a list endpoint body; anything but an array is treated as empty
fn decode_list<T: DeserializeOwned>(path: &str, body: serde_json::Value) -> ApiResult<Vec<T>> {
    if !body.is_array() {
        warn!("Expected an array from {}, treating as empty", path);
        return Ok(Vec::new());
    }
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl PortfolioApi for HttpApi {
    fn set_token(&self, token: Option<String>) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = token;
    }

    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn login(&self, password: &str) -> ApiResult<String> {
        let request = self
            .request(Method::POST, &["api", "auth", "login"])?
            .json(&LoginRequest { password });
        let response = self.send(request).await?;
        let body: LoginResponse = response.json().await?;
        Ok(body.token)
    }

    async fn verify(&self) -> ApiResult<()> {
        self.send(self.request(Method::POST, &["api", "auth", "verify"])?)
            .await?;
        Ok(())
    }

    async fn public_collections(&self) -> ApiResult<Vec<Collection>> {
        self.list(&["api", "collections"]).await
    }

    async fn admin_collections(&self) -> ApiResult<Vec<Collection>> {
        self.list(&["api", "collections", "admin"]).await
    }

    async fn create_collection(&self, draft: &CollectionDraft) -> ApiResult<()> {
        self.send(self.request(Method::POST, &["api", "collections"])?.json(draft))
            .await?;
        Ok(())
    }

    async fn update_collection(&self, id: &str, draft: &CollectionDraft) -> ApiResult<()> {
        self.send(self.request(Method::PUT, &["api", "collections", id])?.json(draft))
            .await?;
        Ok(())
    }

    async fn delete_collection(&self, id: &str) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &["api", "collections", id])?)
            .await?;
        Ok(())
    }

    async fn collection_photos(&self, collection_id: &str) -> ApiResult<Vec<Photo>> {
        self.list(&["api", "photos", "collection", collection_id])
            .await
    }

    async fn upload_photo(&self, upload: &PhotoUpload) -> ApiResult<()> {
        let bytes = tokio::fs::read(&upload.file)
            .await
            .map_err(|source| ApiError::File {
                path: upload.file.display().to_string(),
                source,
            })?;

        let file_name = upload.file_name();
        let mime = mime_guess::from_path(&upload.file).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime.essence_str())
            .map_err(ApiError::Transport)?;

        let metadata = &upload.metadata;
        let form = Form::new()
            .part("photo", part)
            .text("collection", upload.collection.clone())
            .text("title", upload.effective_title())
            .text("description", metadata.description.clone())
            .text("tags", metadata.tags.clone())
            .text("camera", metadata.camera.clone())
            .text("lens", metadata.lens.clone())
            .text("aperture", metadata.aperture.clone())
            .text("shutter", metadata.shutter.clone())
            .text("iso", metadata.iso.clone())
            .text("focalLength", metadata.focal_length.clone());

        self.send(
            self.request(Method::POST, &["api", "photos", "upload"])?
                .multipart(form),
        )
        .await?;

        info!("Uploaded {} to collection {}", file_name, upload.collection);
        Ok(())
    }
}
