//! Client-side photo search
//!
//! A plain case-insensitive substring match over title, description and
//! tags of an already loaded list. Inputs are one collection's worth of
//! photos, so there is no index.

use common::models::Photo;

/// Whether `photo` matches an already lowercased, non-empty `needle`
fn matches(photo: &Photo, needle: &str) -> bool {
    photo.title.to_lowercase().contains(needle)
        || photo
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || photo
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Whether `photo` matches `query`. Everything matches the empty query
pub fn photo_matches(photo: &Photo, query: &str) -> bool {
    query.is_empty() || matches(photo, &query.to_lowercase())
}

/// Photos matching `query`, in their original order
pub fn filter_photos<'a>(photos: &'a [Photo], query: &str) -> Vec<&'a Photo> {
    if query.is_empty() {
        return photos.iter().collect();
    }

    let needle = query.to_lowercase();
    photos.iter().filter(|photo| matches(photo, &needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::testing::sample_photo;

    fn library() -> Vec<Photo> {
        let mut sunset = sample_photo("p1", "Sunset over Reykjavik", "c1");
        sunset.tags = vec!["Golden Hour".to_string(), "city".to_string()];

        let mut glacier = sample_photo("p2", "Glacier", "c1");
        glacier.description = Some("Blue ice at Jökulsárlón".to_string());

        let mut portrait = sample_photo("p3", "Portrait of Anna", "c2");
        portrait.tags = vec!["studio".to_string()];

        vec![sunset, glacier, portrait]
    }

    fn ids(photos: &[&Photo]) -> Vec<String> {
        photos.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let photos = library();
        let filtered = filter_photos(&photos, "");
        assert_eq!(filtered.len(), photos.len());
        assert!(filtered.iter().zip(&photos).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_matches_title_case_insensitively() {
        let photos = library();
        assert_eq!(ids(&filter_photos(&photos, "SUNSET")), vec!["p1"]);
    }

    #[test]
    fn test_matches_description() {
        let photos = library();
        assert_eq!(ids(&filter_photos(&photos, "blue ice")), vec!["p2"]);
        assert_eq!(ids(&filter_photos(&photos, "JÖKUL")), vec!["p2"]);
    }

    #[test]
    fn test_matches_any_tag() {
        let photos = library();
        assert_eq!(ids(&filter_photos(&photos, "golden")), vec!["p1"]);
        assert_eq!(ids(&filter_photos(&photos, "stud")), vec!["p3"]);
    }

    #[test]
    fn test_no_match() {
        let photos = library();
        assert!(filter_photos(&photos, "volcano").is_empty());
    }

    #[test]
    fn test_result_is_exactly_the_matching_set() {
        let photos = library();
        for query in ["", "o", "a", "ICE", "city", "hour", "zzz", "r"] {
            let filtered = filter_photos(&photos, query);
            let needle = query.to_lowercase();

            for photo in &filtered {
                let haystacks = std::iter::once(photo.title.clone())
                    .chain(photo.description.clone())
                    .chain(photo.tags.clone());
                assert!(
                    haystacks
                        .map(|h| h.to_lowercase())
                        .any(|h| h.contains(&needle)),
                    "{} should not match {:?}",
                    photo.id,
                    query
                );
            }

            for photo in photos.iter().filter(|p| !filtered.contains(p)) {
                assert!(!photo_matches(photo, query), "{} excluded for {:?}", photo.id, query);
            }
        }
    }

    #[test]
    fn test_preserves_order() {
        let photos = library();
        assert_eq!(ids(&filter_photos(&photos, "r")), vec!["p1", "p2", "p3"]);
    }
}
