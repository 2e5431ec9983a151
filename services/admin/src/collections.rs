//! Collection manager: list, create, edit and delete collections

use std::sync::Arc;

use common::{
    http::PortfolioApi,
    models::{Collection, CollectionDraft},
    notify::Notifications,
};
use tracing::info;

use crate::dashboard::Confirm;

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this collection? This will also delete all photos in it.";

pub struct CollectionManager {
    api: Arc<dyn PortfolioApi>,
    collections: Vec<Collection>,
    form: CollectionDraft,
    editing: Option<Collection>,
    show_form: bool,
    loading: bool,
    notifications: Notifications,
}

impl CollectionManager {
    pub fn new(api: Arc<dyn PortfolioApi>) -> Self {
        Self {
            api,
            collections: Vec::new(),
            form: CollectionDraft::default(),
            editing: None,
            show_form: false,
            loading: true,
            notifications: Notifications::new(),
        }
    }

    /// Reload every collection, published or not
    pub async fn refresh(&mut self) {
        match self.api.admin_collections().await {
            Ok(collections) => self.collections = collections,
            Err(e) => {
                tracing::error!("Failed to fetch admin collections: {}", e);
                self.notifications.error("Error fetching collections");
                self.collections.clear();
            }
        }
        self.loading = false;
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn form(&self) -> &CollectionDraft {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CollectionDraft {
        &mut self.form
    }

    pub fn editing(&self) -> Option<&Collection> {
        self.editing.as_ref()
    }

    pub fn is_form_open(&self) -> bool {
        self.show_form
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Open an empty form for a new collection
    pub fn start_create(&mut self) {
        self.form = CollectionDraft::default();
        self.editing = None;
        self.show_form = true;
    }

    /// Open the form pre-filled with `collection`
    pub fn start_edit(&mut self, collection: &Collection) {
        self.form = CollectionDraft::from(collection);
        self.editing = Some(collection.clone());
        self.show_form = true;
    }

    pub fn reset_form(&mut self) {
        self.form = CollectionDraft::default();
        self.editing = None;
        self.show_form = false;
    }

    /// Create or update depending on whether a collection is being edited
    ///
    /// On failure the form is left as typed so it can be resubmitted.
    pub async fn submit(&mut self) -> bool {
        let result = match &self.editing {
            Some(collection) => self
                .api
                .update_collection(&collection.id, &self.form)
                .await
                .map(|()| "Collection updated successfully"),
            None => self
                .api
                .create_collection(&self.form)
                .await
                .map(|()| "Collection created successfully"),
        };

        match result {
            Ok(message) => {
                info!("Saved collection {}", self.form.name);
                self.notifications.success(message);
                self.refresh().await;
                self.reset_form();
                true
            }
            Err(e) => {
                self.notifications
                    .error(e.user_message("Error saving collection"));
                false
            }
        }
    }

    /// Delete a collection after the user confirms
    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(DELETE_PROMPT) {
            info!("Deletion of collection {} cancelled", id);
            return false;
        }

        match self.api.delete_collection(id).await {
            Ok(()) => {
                self.notifications.success("Collection deleted successfully");
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete collection {}: {}", id, e);
                self.notifications.error("Error deleting collection");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::Scripted;
    use common::{
        notify::Level,
        testing::{FakeApi, sample_collection},
    };

    async fn logged_in() -> (CollectionManager, Arc<FakeApi>) {
        let api = Arc::new(
            FakeApi::new("pw")
                .with_collection(sample_collection("c1", "Iceland", true))
                .with_collection(sample_collection("c2", "Drafts", false)),
        );
        api.set_token(Some(FakeApi::issued_token().to_string()));

        let mut manager = CollectionManager::new(api.clone());
        manager.refresh().await;
        (manager, api)
    }

    #[tokio::test]
    async fn test_refresh_lists_unpublished_too() {
        let (manager, _) = logged_in().await;
        assert!(!manager.is_loading());
        assert_eq!(manager.collections().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_empty() {
        let api = Arc::new(FakeApi::new("pw").with_collection(sample_collection("c1", "A", true)));
        let mut manager = CollectionManager::new(api);
        manager.refresh().await;

        assert!(manager.collections().is_empty());
        let notification = manager.notifications_mut().last().cloned().unwrap();
        assert_eq!(notification.message, "Error fetching collections");
    }

    #[tokio::test]
    async fn test_create_refreshes_and_resets() {
        let (mut manager, _) = logged_in().await;

        manager.start_create();
        assert!(manager.is_form_open());
        assert!(manager.form().is_published);
        manager.form_mut().name = "Portraits".to_string();

        assert!(manager.submit().await);
        assert_eq!(manager.collections().len(), 3);
        assert!(!manager.is_form_open());
        assert_eq!(manager.form(), &CollectionDraft::default());
        assert_eq!(
            manager.notifications_mut().drain()[0].message,
            "Collection created successfully"
        );
    }

    #[tokio::test]
    async fn test_edit_updates_existing() {
        let (mut manager, api) = logged_in().await;
        let drafts = manager.collections()[1].clone();

        manager.start_edit(&drafts);
        assert_eq!(manager.form().name, "Drafts");
        assert!(!manager.form().is_published);

        manager.form_mut().is_published = true;
        assert!(manager.submit().await);

        assert!(api.calls().contains(&"PUT /api/collections/c2".to_string()));
        assert!(manager.collections()[1].is_published);
        assert!(manager.editing().is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form() {
        let (mut manager, _) = logged_in().await;
        manager.start_create();
        manager.form_mut().description = "No name given".to_string();

        assert!(!manager.submit().await);
        assert!(manager.is_form_open());
        assert_eq!(manager.form().description, "No name given");

        let notification = manager.notifications_mut().last().cloned().unwrap();
        assert_eq!(notification.level, Level::Error);
        assert_eq!(notification.message, "Name is required");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (mut manager, api) = logged_in().await;

        let declined = Scripted::new(false);
        assert!(!manager.delete("c1", &declined).await);
        assert_eq!(declined.prompts(), vec![DELETE_PROMPT.to_string()]);
        assert!(!api.calls().iter().any(|c| c.starts_with("DELETE")));
        assert_eq!(manager.collections().len(), 2);

        assert!(manager.delete("c1", &Scripted::new(true)).await);
        assert_eq!(manager.collections().len(), 1);
        assert_eq!(
            manager.notifications_mut().last().map(|n| n.message.as_str()),
            Some("Collection deleted successfully")
        );
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let (mut manager, _) = logged_in().await;
        assert!(!manager.delete("missing", &Scripted::new(true)).await);
        assert_eq!(
            manager.notifications_mut().last().map(|n| n.message.as_str()),
            Some("Error deleting collection")
        );
    }
}
