//! Error types for the gallery

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GalleryError {
    /// Tried to open a photo that is not in the current list
    #[error("Photo index {index} is out of bounds for {len} photo(s)")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type GalleryResult<T> = Result<T, GalleryError>;
