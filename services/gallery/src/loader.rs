//! Data fetchers for the gallery pages
//!
//! Every loader returns a complete replacement list. Failures are logged
//! and turned into an empty list; the error is handed back alongside so
//! the page can tell the user.

use common::{
    error::ApiError,
    http::PortfolioApi,
    models::{Collection, Photo},
};
use tracing::{error, info};

/// Number of collections shown on the home page
pub const FEATURED_COLLECTIONS: usize = 6;

/// A fetched list, empty when the fetch failed
#[derive(Debug)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub error: Option<ApiError>,
}

impl<T> Loaded<T> {
    fn ok(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    fn failed(error: ApiError) -> Self {
        Self {
            items: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Published collections
pub async fn load_public_collections(api: &dyn PortfolioApi) -> Loaded<Collection> {
    match api.public_collections().await {
        Ok(collections) => {
            info!("Loaded {} collections", collections.len());
            Loaded::ok(collections)
        }
        Err(e) => {
            error!("Error fetching collections: {}", e);
            Loaded::failed(e)
        }
    }
}

/// The first few published collections, for the home page
pub async fn load_featured_collections(api: &dyn PortfolioApi) -> Loaded<Collection> {
    let mut loaded = load_public_collections(api).await;
    loaded.items.truncate(FEATURED_COLLECTIONS);
    loaded
}

/// Photos of one collection
pub async fn load_collection_photos(api: &dyn PortfolioApi, collection_id: &str) -> Loaded<Photo> {
    match api.collection_photos(collection_id).await {
        Ok(photos) => {
            info!(
                "Loaded {} photos from collection {}",
                photos.len(),
                collection_id
            );
            Loaded::ok(photos)
        }
        Err(e) => {
            error!(
                "Error fetching photos for collection {}: {}",
                collection_id, e
            );
            Loaded::failed(e)
        }
    }
}

/// Photos across several collections
#[derive(Debug, Default)]
pub struct AllPhotos {
    pub photos: Vec<Photo>,
    /// Collections whose photos could not be fetched
    pub failed: Vec<Collection>,
}

impl AllPhotos {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Photos of every collection, fetched one collection at a time
///
/// A failing collection is skipped and reported in `failed`; the photos
/// of the others are kept.
pub async fn load_all_photos(api: &dyn PortfolioApi, collections: &[Collection]) -> AllPhotos {
    let mut all = AllPhotos::default();

    for collection in collections {
        match api.collection_photos(&collection.id).await {
            Ok(photos) => all.photos.extend(photos),
            Err(e) => {
                error!(
                    "Skipping collection {} ({}): {}",
                    collection.name, collection.id, e
                );
                all.failed.push(collection.clone());
            }
        }
    }

    info!(
        "Loaded {} photos from {} collections ({} failed)",
        all.photos.len(),
        collections.len(),
        all.failed.len()
    );
    all
}
