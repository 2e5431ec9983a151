//! Portfolio page state
//!
//! Holds the public collections, the photos of the selected collection (or
//! of all of them), the search term and the lightbox. The lightbox always
//! runs over the currently visible, filtered list.

use std::sync::Arc;

use common::{
    http::PortfolioApi,
    models::{Collection, Photo},
    notify::Notifications,
};
use tracing::{info, warn};

use crate::{
    error::GalleryResult,
    lightbox::Lightbox,
    loader::{load_all_photos, load_collection_photos, load_public_collections},
    search::filter_photos,
    surface::Surface,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    Masonry,
}

/// Why nothing is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    /// The search term matched nothing
    NoSearchResults(String),
    /// The selected collection has no photos
    EmptyCollection,
    /// There are no photos anywhere
    NoPhotos,
}

impl EmptyState {
    pub fn message(&self) -> String {
        match self {
            EmptyState::NoSearchResults(term) => format!("No photos found for \"{}\"", term),
            EmptyState::EmptyCollection => "This collection is empty.".to_string(),
            EmptyState::NoPhotos => "No photos have been uploaded yet.".to_string(),
        }
    }
}

pub struct PortfolioPage {
    api: Arc<dyn PortfolioApi>,
    collections: Vec<Collection>,
    selected: Option<Collection>,
    photos: Vec<Photo>,
    search: String,
    view_mode: ViewMode,
    loading: bool,
    lightbox: Lightbox,
    notifications: Notifications,
}

impl PortfolioPage {
    pub fn new(api: Arc<dyn PortfolioApi>, surface: Arc<dyn Surface>) -> Self {
        Self {
            api,
            collections: Vec::new(),
            selected: None,
            photos: Vec::new(),
            search: String::new(),
            view_mode: ViewMode::default(),
            loading: true,
            lightbox: Lightbox::new(surface),
            notifications: Notifications::new(),
        }
    }

    /// Load collections, then the photos for `route_collection`, or for all
    /// collections when there is none
    pub async fn mount(&mut self, route_collection: Option<&str>) {
        self.loading = true;
        let loaded = load_public_collections(self.api.as_ref()).await;
        if !loaded.is_ok() {
            self.notifications.error("Error fetching collections");
        }
        self.collections = loaded.items;

        match route_collection {
            Some(id) if self.find_collection(id).is_some() => {
                self.select_collection(Some(id)).await
            }
            Some(id) => {
                warn!("Collection {} not found, showing all photos", id);
                self.notifications.info("Collection not found, showing all photos");
                self.select_collection(None).await
            }
            None => self.select_collection(None).await,
        }
    }

    fn find_collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Switch to one collection (`Some`) or all photos (`None`)
    ///
    /// Clears the search term and replaces the photo list, which closes
    /// the lightbox.
    pub async fn select_collection(&mut self, collection_id: Option<&str>) {
        self.loading = true;
        self.search.clear();

        let selected = collection_id.and_then(|id| self.find_collection(id).cloned());
        let photos = match &selected {
            Some(collection) => {
                let loaded = load_collection_photos(self.api.as_ref(), &collection.id).await;
                if !loaded.is_ok() {
                    self.notifications.error("Error fetching photos");
                }
                loaded.items
            }
            None => {
                let all = load_all_photos(self.api.as_ref(), &self.collections).await;
                if !all.is_complete() {
                    let names: Vec<_> = all.failed.iter().map(|c| c.name.as_str()).collect();
                    self.notifications.error(format!(
                        "Could not load photos from {}",
                        names.join(", ")
                    ));
                }
                all.photos
            }
        };

        info!(
            "Showing {} photos from {}",
            photos.len(),
            selected.as_ref().map_or("all collections", |c| c.name.as_str())
        );

        self.selected = selected;
        self.photos = photos;
        self.loading = false;
        self.refresh_visible();
    }

    /// Set the search term; the visible list is recomputed immediately
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.refresh_visible();
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    fn refresh_visible(&mut self) {
        let visible = filter_photos(&self.photos, &self.search)
            .into_iter()
            .cloned()
            .collect();
        self.lightbox.replace_photos(visible);
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn selected(&self) -> Option<&Collection> {
        self.selected.as_ref()
    }

    /// Every loaded photo, regardless of the search
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Photos matching the search, in display order
    pub fn visible_photos(&self) -> &[Photo] {
        self.lightbox.photos()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Open the visible photo at `index` in the lightbox
    pub fn open_photo(&mut self, index: usize) -> GalleryResult<&Photo> {
        self.lightbox.open(index)
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox {
        &mut self.lightbox
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// "Showing 3 of 12 photos"
    pub fn summary(&self) -> String {
        let total = self.photos.len();
        format!(
            "Showing {} of {} {}",
            self.visible_photos().len(),
            total,
            if total == 1 { "photo" } else { "photos" }
        )
    }

    /// Set when there is nothing to show and the page is not loading
    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.loading || !self.visible_photos().is_empty() {
            return None;
        }
        if !self.search.is_empty() {
            Some(EmptyState::NoSearchResults(self.search.clone()))
        } else if self.selected.is_some() {
            Some(EmptyState::EmptyCollection)
        } else {
            Some(EmptyState::NoPhotos)
        }
    }
}
