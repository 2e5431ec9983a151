//! Home page: the latest published collections

use common::{config::ClientConfig, http::PortfolioApi, models::Collection, notify::Notifications};

use crate::loader::load_featured_collections;

const DEFAULT_BLURB: &str = "Explore this beautiful collection of photographs.";

#[derive(Debug)]
pub struct HomePage {
    featured: Vec<Collection>,
    loading: bool,
    notifications: Notifications,
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            featured: Vec::new(),
            loading: true,
            notifications: Notifications::new(),
        }
    }

    pub async fn load(&mut self, api: &dyn PortfolioApi) {
        self.loading = true;
        let loaded = load_featured_collections(api).await;
        if !loaded.is_ok() {
            self.notifications.error("Error fetching collections");
        }
        self.featured = loaded.items;
        self.loading = false;
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn featured(&self) -> &[Collection] {
        &self.featured
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Cover image URL, when the collection has one
pub fn cover_url(config: &ClientConfig, collection: &Collection) -> Option<String> {
    collection
        .cover_image
        .as_deref()
        .filter(|cover| !cover.is_empty())
        .map(|cover| config.image_url(cover))
}

/// Collection description, or a generic blurb
pub fn blurb(collection: &Collection) -> &str {
    collection
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_BLURB)
}
