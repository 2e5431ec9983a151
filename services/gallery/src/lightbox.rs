//! Full-screen photo viewer with wraparound navigation
//!
//! The lightbox is either closed or open on an index into its photo list.
//! The index is always in bounds: replacing the list closes the viewer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::models::{CollectionRef, Photo};
use tracing::debug;

use crate::{
    error::{GalleryError, GalleryResult},
    surface::{Surface, SurfaceGuard},
};

/// Keys the lightbox reacts to while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

struct OpenState {
    index: usize,
    _guard: SurfaceGuard,
}

pub struct Lightbox {
    photos: Vec<Photo>,
    open: Option<OpenState>,
    info_visible: bool,
    surface: Arc<dyn Surface>,
}

impl Lightbox {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            photos: Vec::new(),
            open: None,
            info_visible: false,
            surface,
        }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Swap in a new list. Any open photo is closed
    pub fn replace_photos(&mut self, photos: Vec<Photo>) {
        self.close();
        self.photos = photos;
    }

    /// Open the photo at `index` with the info panel hidden
    pub fn open(&mut self, index: usize) -> GalleryResult<&Photo> {
        let len = self.photos.len();
        if index >= len {
            return Err(GalleryError::IndexOutOfBounds { index, len });
        }

        match self.open.as_mut() {
            Some(open) => open.index = index,
            None => {
                self.open = Some(OpenState {
                    index,
                    _guard: SurfaceGuard::acquire(Arc::clone(&self.surface)),
                });
            }
        }
        self.info_visible = false;
        debug!("Opened photo {} of {}", index + 1, len);

        Ok(&self.photos[index])
    }

    pub fn close(&mut self) {
        if self.open.take().is_some() {
            debug!("Closed lightbox");
        }
        self.info_visible = false;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.open.as_ref().map(|open| open.index)
    }

    pub fn current(&self) -> Option<&Photo> {
        self.index().map(|index| &self.photos[index])
    }

    /// Move to the following photo, wrapping to the first. No-op when closed
    pub fn next(&mut self) -> Option<usize> {
        let len = self.photos.len();
        let open = self.open.as_mut()?;
        open.index = (open.index + 1) % len;
        Some(open.index)
    }

    /// Move to the preceding photo, wrapping to the last. No-op when closed
    pub fn prev(&mut self) -> Option<usize> {
        let len = self.photos.len();
        let open = self.open.as_mut()?;
        open.index = (open.index + len - 1) % len;
        Some(open.index)
    }

    /// Whether next/prev controls are worth showing
    pub fn has_navigation(&self) -> bool {
        self.photos.len() > 1
    }

    /// "3 of 12"
    pub fn counter(&self) -> Option<String> {
        self.index()
            .map(|index| format!("{} of {}", index + 1, self.photos.len()))
    }

    pub fn info_visible(&self) -> bool {
        self.info_visible
    }

    pub fn toggle_info(&mut self) -> bool {
        self.info_visible = !self.info_visible;
        self.info_visible
    }

    pub fn set_info_visible(&mut self, visible: bool) {
        self.info_visible = visible;
    }

    /// Dispatch a key press. Returns whether the key was consumed
    pub fn handle_key(&mut self, key: Key) -> bool {
        if !self.is_open() {
            return false;
        }

        match key {
            Key::Escape => self.close(),
            Key::ArrowLeft => {
                self.prev();
            }
            Key::ArrowRight => {
                self.next();
            }
            Key::Char('i') | Key::Char('I') => {
                self.toggle_info();
            }
            Key::Char(_) => return false,
        }
        true
    }

    /// Fields for the info panel of the open photo
    pub fn info_details(&self) -> Option<PhotoDetails> {
        self.current().map(PhotoDetails::from)
    }
}

/// What the info panel shows about a photo
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoDetails {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    /// Exposure settings that are present, labelled
    pub settings: Vec<(&'static str, String)>,
    pub collection_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PhotoDetails {
    /// "March 1, 2024"
    pub fn date_label(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<&Photo> for PhotoDetails {
    fn from(photo: &Photo) -> Self {
        let settings = [
            ("Aperture", &photo.aperture),
            ("Shutter", &photo.shutter),
            ("ISO", &photo.iso),
            ("Focal Length", &photo.focal_length),
        ]
        .into_iter()
        .filter_map(|(label, value)| present(value).map(|v| (label, v)))
        .collect();

        let collection_name = match &photo.collection {
            CollectionRef::Populated { name, .. } => name.clone(),
            CollectionRef::Id(_) => None,
        };

        Self {
            title: photo.title.clone(),
            description: present(&photo.description),
            tags: photo.tags.iter().map(|tag| format!("#{}", tag)).collect(),
            camera: present(&photo.camera),
            lens: present(&photo.lens),
            settings,
            collection_name,
            created_at: photo.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FlagSurface;
    use common::testing::sample_photo;
    use tokio_test::{assert_err, assert_ok};

    fn viewer(n: usize) -> (Lightbox, Arc<FlagSurface>) {
        let surface = Arc::new(FlagSurface::new());
        let mut lightbox = Lightbox::new(surface.clone());
        lightbox.replace_photos(
            (0..n)
                .map(|i| sample_photo(&format!("p{}", i), &format!("Photo {}", i), "c1"))
                .collect(),
        );
        (lightbox, surface)
    }

    #[test]
    fn test_starts_closed() {
        let (mut lightbox, surface) = viewer(3);
        assert!(!lightbox.is_open());
        assert_eq!(lightbox.next(), None);
        assert_eq!(lightbox.prev(), None);
        assert!(!lightbox.handle_key(Key::ArrowRight));
        assert!(!surface.keys_bound());
    }

    #[test]
    fn test_next_three_times_from_two() {
        let (mut lightbox, _) = viewer(5);
        assert_ok!(lightbox.open(2));

        lightbox.next();
        lightbox.next();
        lightbox.next();
        assert_eq!(lightbox.index(), Some(0));

        // 2 -> 3 -> 4
        assert_ok!(lightbox.open(2));
        lightbox.next();
        lightbox.next();
        assert_eq!(lightbox.index(), Some(4));
    }

    #[test]
    fn test_five_steps_wrap_to_start() {
        let (mut lightbox, _) = viewer(5);
        assert_ok!(lightbox.open(2));
        for _ in 0..5 {
            lightbox.next();
        }
        assert_eq!(lightbox.index(), Some(2));
    }

    #[test]
    fn test_next_then_prev_is_identity() {
        for n in 1..=6 {
            for i in 0..n {
                let (mut lightbox, _) = viewer(n);
                assert_ok!(lightbox.open(i));
                lightbox.next();
                lightbox.prev();
                assert_eq!(lightbox.index(), Some(i), "n={} i={}", n, i);

                lightbox.prev();
                lightbox.next();
                assert_eq!(lightbox.index(), Some(i), "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_prev_wraps_to_last() {
        let (mut lightbox, _) = viewer(4);
        assert_ok!(lightbox.open(0));
        assert_eq!(lightbox.prev(), Some(3));
    }

    #[test]
    fn test_single_photo_wraps_to_itself() {
        let (mut lightbox, _) = viewer(1);
        assert_ok!(lightbox.open(0));
        assert_eq!(lightbox.next(), Some(0));
        assert_eq!(lightbox.prev(), Some(0));
        assert!(!lightbox.has_navigation());
    }

    #[test]
    fn test_open_out_of_bounds() {
        let (mut lightbox, surface) = viewer(2);
        let err = assert_err!(lightbox.open(2));
        assert_eq!(err, GalleryError::IndexOutOfBounds { index: 2, len: 2 });
        assert!(!lightbox.is_open());
        assert!(!surface.is_scroll_locked());

        let (mut empty, _) = viewer(0);
        assert_err!(empty.open(0));
    }

    #[test]
    fn test_open_resets_info_panel() {
        let (mut lightbox, _) = viewer(3);
        assert_ok!(lightbox.open(0));
        assert!(lightbox.toggle_info());

        // Navigation keeps the panel
        lightbox.next();
        assert!(lightbox.info_visible());

        assert_ok!(lightbox.open(2));
        assert!(!lightbox.info_visible());
    }

    #[test]
    fn test_set_info_visible_keeps_viewer_open() {
        let (mut lightbox, _) = viewer(2);
        assert_ok!(lightbox.open(1));

        lightbox.set_info_visible(true);
        assert!(lightbox.info_visible());
        assert!(lightbox.info_details().is_some());

        lightbox.set_info_visible(false);
        assert!(!lightbox.info_visible());
        assert!(lightbox.is_open());
        assert_eq!(lightbox.index(), Some(1));
    }

    #[test]
    fn test_key_bindings() {
        let (mut lightbox, surface) = viewer(3);
        assert_ok!(lightbox.open(1));
        assert!(surface.keys_bound());
        assert!(surface.is_scroll_locked());

        assert!(lightbox.handle_key(Key::ArrowRight));
        assert_eq!(lightbox.index(), Some(2));
        assert!(lightbox.handle_key(Key::ArrowLeft));
        assert_eq!(lightbox.index(), Some(1));

        assert!(lightbox.handle_key(Key::Char('i')));
        assert!(lightbox.info_visible());
        assert!(lightbox.handle_key(Key::Char('I')));
        assert!(!lightbox.info_visible());

        assert!(!lightbox.handle_key(Key::Char('x')));

        assert!(lightbox.handle_key(Key::Escape));
        assert!(!lightbox.is_open());
        assert!(!surface.keys_bound());
        assert!(!surface.is_scroll_locked());
    }

    #[test]
    fn test_reopening_does_not_stack_bindings() {
        let (mut lightbox, surface) = viewer(3);
        assert_ok!(lightbox.open(0));
        assert_ok!(lightbox.open(1));
        assert_eq!(surface.acquisitions(), 1);

        lightbox.close();
        assert_ok!(lightbox.open(2));
        assert_eq!(surface.acquisitions(), 2);
    }

    #[test]
    fn test_replacing_list_closes() {
        let (mut lightbox, surface) = viewer(3);
        assert_ok!(lightbox.open(2));

        lightbox.replace_photos(vec![sample_photo("q0", "Other", "c2")]);
        assert!(!lightbox.is_open());
        assert_eq!(lightbox.index(), None);
        assert!(!surface.is_scroll_locked());
    }

    #[test]
    fn test_drop_restores_scrolling() {
        let (mut lightbox, surface) = viewer(3);
        assert_ok!(lightbox.open(0));
        assert!(surface.is_scroll_locked());

        drop(lightbox);
        assert!(!surface.is_scroll_locked());
        assert!(!surface.keys_bound());
    }

    #[test]
    fn test_counter() {
        let (mut lightbox, _) = viewer(12);
        assert_eq!(lightbox.counter(), None);
        assert_ok!(lightbox.open(2));
        assert_eq!(lightbox.counter().as_deref(), Some("3 of 12"));
    }

    #[test]
    fn test_info_details() {
        let mut photo = sample_photo("p0", "Harbour", "c1");
        photo.description = Some("  ".to_string());
        photo.tags = vec!["sea".to_string()];
        photo.camera = Some("X100V".to_string());
        photo.aperture = Some("f/2".to_string());
        photo.iso = Some(String::new());
        photo.collection = CollectionRef::Populated {
            id: "c1".to_string(),
            name: Some("Coast".to_string()),
        };

        let details = PhotoDetails::from(&photo);
        assert_eq!(details.description, None);
        assert_eq!(details.tags, vec!["#sea"]);
        assert_eq!(details.camera.as_deref(), Some("X100V"));
        assert_eq!(details.settings, vec![("Aperture", "f/2".to_string())]);
        assert_eq!(details.collection_name.as_deref(), Some("Coast"));
        assert_eq!(details.date_label(), "January 1, 2024");
    }
}
