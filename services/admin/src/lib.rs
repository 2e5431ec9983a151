//! Admin area for the portfolio client
//!
//! Everything here sits behind an authenticated session: the dashboard
//! shell, collection management and the photo uploader.

pub mod collections;
pub mod dashboard;
pub mod error;
pub mod upload;

pub use collections::CollectionManager;
pub use dashboard::{AdminView, Confirm, Dashboard, Tab};
pub use error::{AdminError, AdminResult};
pub use upload::{PhotoUploader, PreviewRegistry, UploadQueue, UploadReport};
