//! Admin dashboard shell: which view to show, the active tab, logout

use std::sync::Arc;

use auth::SessionManager;

use crate::{collections::CollectionManager, upload::PhotoUploader, upload::PreviewRegistry};

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// What the admin route renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    /// The start-up token check is still running
    Loading,
    Login,
    Dashboard,
}

impl AdminView {
    pub fn for_session(session: &SessionManager) -> Self {
        let state = session.state();
        if state.loading {
            AdminView::Loading
        } else if state.is_authenticated {
            AdminView::Dashboard
        } else {
            AdminView::Login
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Collections,
    Upload,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Collections => "Collections",
            Tab::Upload => "Upload Photos",
        }
    }
}

pub struct Dashboard {
    session: Arc<SessionManager>,
    active: Tab,
    pub collections: CollectionManager,
    pub uploads: PhotoUploader,
}

impl Dashboard {
    pub fn new(session: Arc<SessionManager>, previews: PreviewRegistry) -> Self {
        let api = session.api();
        Self {
            collections: CollectionManager::new(api.clone()),
            uploads: PhotoUploader::new(api, previews),
            session,
            active: Tab::default(),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Load whatever the active tab shows
    pub async fn load_active(&mut self) {
        match self.active {
            Tab::Collections => self.collections.refresh().await,
            Tab::Upload => self.uploads.load_collections().await,
        }
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}
