use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media::MediaList;

/// A housing community as the backend returns it.
///
/// `photos` and `videos` are typed [`MediaList`]s in memory; on the wire they
/// are single JSON-encoded text fields, translated by the serde adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub property_fee: Option<String>,
    pub parking: Option<String>,
    pub build_year: Option<i32>,
    pub metro: Option<String>,
    pub primary_school: Option<String>,
    pub middle_school: Option<String>,
    pub environment_score: Option<i32>,
    #[serde(default, with = "crate::media::json_text")]
    pub photos: MediaList,
    #[serde(default, with = "crate::media::json_text")]
    pub videos: MediaList,
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Create payload for a community.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityDraft {
    pub name: String,
    pub district: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_score: Option<i32>,
    #[serde(default, with = "crate::media::json_text")]
    pub photos: MediaList,
    #[serde(default, with = "crate::media::json_text")]
    pub videos: MediaList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CommunityDraft {
    /// The same field rules the create endpoint enforces; bulk import applies
    /// them per row.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name is required"));
        }
        if self.district.trim().is_empty() {
            return Err(Error::validation("district is required"));
        }
        validate_environment_score(self.environment_score)?;
        Ok(())
    }
}

/// Partial-merge update payload: only supplied fields change, absent fields
/// are not serialized at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::media::json_text_opt")]
    pub photos: Option<MediaList>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::media::json_text_opt")]
    pub videos: Option<MediaList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CommunityPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::validation("name cannot be blank"));
            }
        }
        validate_environment_score(self.environment_score)
    }
}

fn validate_environment_score(score: Option<i32>) -> Result<()> {
    if let Some(score) = score {
        if !(1..=10).contains(&score) {
            return Err(Error::validation(format!(
                "environment score must be between 1 and 10, got {score}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, district: &str) -> CommunityDraft {
        CommunityDraft {
            name: name.to_string(),
            district: district.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn draft_requires_name_and_district() {
        assert!(draft("Sample Court", "Pudong").validate().is_ok());
        assert!(draft("", "Pudong").validate().is_err());
        assert!(draft("   ", "Pudong").validate().is_err());
        assert!(draft("Sample Court", "").validate().is_err());
    }

    #[test]
    fn environment_score_must_be_in_range() {
        let mut d = draft("Sample Court", "Pudong");
        d.environment_score = Some(10);
        assert!(d.validate().is_ok());
        d.environment_score = Some(0);
        assert!(d.validate().is_err());
        d.environment_score = Some(11);
        assert!(d.validate().is_err());
    }

    #[test]
    fn media_lists_cross_the_wire_as_json_strings() {
        let mut d = draft("Sample Court", "Pudong");
        d.photos.append("/api/upload/files/a.jpg");
        d.photos.append("/api/upload/files/b.jpg");

        let wire = serde_json::to_value(&d).unwrap();
        assert_eq!(
            wire["photos"],
            serde_json::json!("[\"/api/upload/files/a.jpg\",\"/api/upload/files/b.jpg\"]")
        );
        assert_eq!(wire["videos"], serde_json::json!("[]"));

        let back: CommunityDraft = serde_json::from_value(wire).unwrap();
        assert_eq!(back.photos, d.photos);
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch = CommunityPatch {
            district: Some("Minhang".to_string()),
            ..Default::default()
        };
        let wire = serde_json::to_value(&patch).unwrap();
        assert_eq!(wire, serde_json::json!({ "district": "Minhang" }));
    }

    #[test]
    fn community_reads_null_and_garbled_media_fields_as_empty() {
        let community: Community = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Sample Court",
            "district": "Pudong",
            "address": null,
            "property_fee": null,
            "parking": null,
            "build_year": 2015,
            "metro": null,
            "primary_school": null,
            "middle_school": null,
            "environment_score": 8,
            "photos": null,
            "videos": "not json",
            "notes": null
        }))
        .unwrap();
        assert!(community.photos.is_empty());
        assert!(community.videos.is_empty());
    }
}
