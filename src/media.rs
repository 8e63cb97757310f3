use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Photo => PHOTO_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        }
    }

    pub fn accepts(&self, filename: &str) -> bool {
        extension(filename)
            .map(|ext| self.allowed_extensions().contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Ordered list of media reference URLs attached to one parent record.
///
/// Insertion order is display order. Duplicates are allowed. The list is
/// persisted as a single JSON-encoded text field on the parent record; that
/// encoding only exists at the persistence boundary (see [`json_text`]),
/// everything else works with this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaList {
    refs: Vec<String>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_refs<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { refs: refs.into_iter().map(Into::into).collect() }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.refs.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(String::as_str)
    }

    /// Appends one reference at the end. Never deduplicates.
    pub fn append(&mut self, media_ref: impl Into<String>) {
        self.refs.push(media_ref.into());
    }

    /// Removes the reference at `index`, shifting later entries down.
    /// An invalid index fails with [`Error::OutOfRange`] and leaves the list
    /// untouched.
    pub fn remove_at(&mut self, index: usize) -> Result<String, Error> {
        if index >= self.refs.len() {
            return Err(Error::OutOfRange { index, len: self.refs.len() });
        }
        Ok(self.refs.remove(index))
    }

    /// Produces the transport encoding: a JSON array of the references in
    /// current order. The empty list serializes to `"[]"`, not to an empty
    /// string or null.
    pub fn serialize(&self) -> String {
        serde_json::to_string(&self.refs).unwrap()
    }

    /// Reads the transport encoding back. A missing field, an empty string or
    /// a garbled payload all normalize to the empty list: this field is
    /// optional metadata and must never fail the caller.
    pub fn deserialize(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::default();
        };
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Vec<String>>(text) {
            Ok(refs) => Self { refs },
            Err(err) => {
                warn!("discarding malformed media list payload: {err}");
                Self::default()
            }
        }
    }
}

impl<'a> IntoIterator for &'a MediaList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}

/// Serde adapter for a `MediaList` field persisted as a JSON-encoded string.
pub mod json_text {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MediaList;

    pub fn serialize<S: Serializer>(list: &MediaList, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&list.serialize())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MediaList, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        Ok(MediaList::deserialize(text.as_deref()))
    }
}

/// Same adapter for patch payloads, where `None` means "leave the field
/// alone" and must not be serialized at all.
pub mod json_text_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MediaList;

    pub fn serialize<S: Serializer>(
        list: &Option<MediaList>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match list {
            Some(list) => serializer.serialize_some(&list.serialize()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<MediaList>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        Ok(text.map(|text| MediaList::deserialize(Some(&text))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_exact() {
        let list = MediaList::from_refs([
            "/api/upload/files/a.jpg",
            "/api/upload/files/b.mp4",
            "/api/upload/files/a.jpg",
        ]);
        assert_eq!(MediaList::deserialize(Some(&list.serialize())), list);

        let empty = MediaList::new();
        assert_eq!(empty.serialize(), "[]");
        assert_eq!(MediaList::deserialize(Some(&empty.serialize())), empty);
    }

    #[test]
    fn deserialize_recovers_from_missing_or_garbled_input() {
        assert!(MediaList::deserialize(None).is_empty());
        assert!(MediaList::deserialize(Some("")).is_empty());
        assert!(MediaList::deserialize(Some("   ")).is_empty());
        assert!(MediaList::deserialize(Some("not json")).is_empty());
        assert!(MediaList::deserialize(Some("{\"a\":1}")).is_empty());
    }

    #[test]
    fn append_then_remove_yields_empty() {
        let mut list = MediaList::new();
        list.append("/api/upload/files/a.jpg");
        assert_eq!(list.remove_at(0).unwrap(), "/api/upload/files/a.jpg");
        assert!(list.is_empty());
    }

    #[test]
    fn remove_out_of_range_leaves_list_untouched() {
        let mut list = MediaList::from_refs(["a", "b"]);
        let err = list.remove_at(2).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(list, MediaList::from_refs(["a", "b"]));
    }

    #[test]
    fn remove_preserves_order_of_later_entries() {
        let mut list = MediaList::from_refs(["a", "b", "c"]);
        list.remove_at(1).unwrap();
        assert_eq!(list, MediaList::from_refs(["a", "c"]));
    }

    #[test]
    fn kind_accepts_by_extension() {
        assert!(MediaKind::Photo.accepts("house.JPG"));
        assert!(MediaKind::Photo.accepts("plan.webp"));
        assert!(!MediaKind::Photo.accepts("tour.mp4"));
        assert!(MediaKind::Video.accepts("tour.mp4"));
        assert!(!MediaKind::Video.accepts("noext"));
    }
}
