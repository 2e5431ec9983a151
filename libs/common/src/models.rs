//! Domain models as exchanged with the portfolio backend
//!
//! The backend owns these records; the client only holds copies for the
//! lifetime of a view. Field names follow the backend's JSON (`_id`,
//! camelCase).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping of photos (an album)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reference from a photo to its collection
///
/// The backend sends either the bare id or a populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CollectionRef {
    /// Id of the referenced collection
    pub fn id(&self) -> &str {
        match self {
            CollectionRef::Id(id) => id,
            CollectionRef::Populated { id, .. } => id,
        }
    }
}

/// A single photo with its free-text equipment metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub filename: String,
    pub collection: CollectionRef,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub lens: Option<String>,
    #[serde(default)]
    pub aperture: Option<String>,
    #[serde(default)]
    pub shutter: Option<String>,
    #[serde(default)]
    pub iso: Option<String>,
    #[serde(default)]
    pub focal_length: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editable fields of a collection, sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDraft {
    pub name: String,
    pub description: String,
    pub is_published: bool,
}

impl Default for CollectionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            is_published: true,
        }
    }
}

impl From<&Collection> for CollectionDraft {
    fn from(collection: &Collection) -> Self {
        Self {
            name: collection.name.clone(),
            description: collection.description.clone().unwrap_or_default(),
            is_published: collection.is_published,
        }
    }
}

/// Metadata shared by every file in one upload batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
    pub title: String,
    pub description: String,
    /// Comma separated, passed through to the backend as typed
    pub tags: String,
    pub camera: String,
    pub lens: String,
    pub aperture: String,
    pub shutter: String,
    pub iso: String,
    pub focal_length: String,
}

/// One file upload request
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub file: PathBuf,
    pub collection: String,
    pub metadata: PhotoMetadata,
}

impl PhotoUpload {
    /// File name component of the upload path
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Title sent to the backend: the typed title, or the file name
    pub fn effective_title(&self) -> String {
        if self.metadata.title.trim().is_empty() {
            self.file_name()
        } else {
            self.metadata.title.clone()
        }
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub password: &'a str,
}

/// Response of `POST /api/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
