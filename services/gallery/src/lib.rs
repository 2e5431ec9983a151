//! Public gallery for the portfolio client
//!
//! Page state for the home and portfolio views, the data loaders behind
//! them, the client-side search filter and the lightbox viewer.

pub mod error;
pub mod home;
pub mod lightbox;
pub mod loader;
pub mod portfolio;
pub mod search;
pub mod surface;

pub use lightbox::{Key, Lightbox};
pub use portfolio::{EmptyState, PortfolioPage, ViewMode};
pub use surface::{FlagSurface, Surface};
