use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media::MediaList;

/// An individual property listing inside a community.
///
/// `price_per_sqm` and `rent_ratio` are computed by the backend and never
/// accepted from a client payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub community_id: i64,
    pub building: Option<String>,
    pub unit: Option<String>,
    pub room: Option<String>,
    pub area: Option<f64>,
    pub layout: Option<String>,
    pub floor: Option<String>,
    pub orientation: Option<String>,
    pub decoration: Option<String>,
    pub price: Option<f64>,
    pub rent: Option<f64>,
    pub expected_price: Option<f64>,
    #[serde(default)]
    pub price_per_sqm: Option<f64>,
    #[serde(default)]
    pub rent_ratio: Option<f64>,
    pub visit_date: Option<NaiveDateTime>,
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

/// Create payload for a property listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub community_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDateTime>,
    #[serde(default, with = "crate::media::json_text")]
    pub photos: MediaList,
    #[serde(default, with = "crate::media::json_text")]
    pub videos: MediaList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PropertyDraft {
    /// The same field rules the create endpoint enforces; bulk import applies
    /// them per row.
    pub fn validate(&self) -> Result<()> {
        if self.community_id <= 0 {
            return Err(Error::validation("community id is required"));
        }
        match self.area {
            Some(area) if area > 0.0 => {}
            _ => return Err(Error::validation("area must be a positive number")),
        }
        match self.price {
            Some(price) if price > 0.0 => {}
            _ => return Err(Error::validation("price must be a positive number")),
        }
        Ok(())
    }
}

/// Partial-merge update payload for a property listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::media::json_text_opt")]
    pub photos: Option<MediaList>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::media::json_text_opt")]
    pub videos: Option<MediaList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PropertyPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(area) = self.area {
            if area <= 0.0 {
                return Err(Error::validation("area must be a positive number"));
            }
        }
        if let Some(price) = self.price {
            if price <= 0.0 {
                return Err(Error::validation("price must be a positive number"));
            }
        }
        Ok(())
    }
}

/// Unit price in yuan per square meter; `price` is quoted in units of 10k.
pub fn price_per_sqm(price: Option<f64>, area: Option<f64>) -> Option<f64> {
    match (price, area) {
        (Some(price), Some(area)) if price > 0.0 && area > 0.0 => {
            Some(price * 10_000.0 / area)
        }
        _ => None,
    }
}

/// Gross annual rent yield as a percentage of the listing price.
pub fn rent_ratio(price: Option<f64>, rent: Option<f64>) -> Option<f64> {
    match (price, rent) {
        (Some(price), Some(rent)) if price > 0.0 && rent > 0.0 => {
            Some(rent * 12.0 / (price * 10_000.0) * 100.0)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(community_id: i64, area: Option<f64>, price: Option<f64>) -> PropertyDraft {
        PropertyDraft { community_id, area, price, ..Default::default() }
    }

    #[test]
    fn draft_requires_community_area_and_price() {
        assert!(draft(1, Some(120.0), Some(800.0)).validate().is_ok());
        assert!(draft(0, Some(120.0), Some(800.0)).validate().is_err());
        assert!(draft(1, None, Some(800.0)).validate().is_err());
        assert!(draft(1, Some(0.0), Some(800.0)).validate().is_err());
        assert!(draft(1, Some(120.0), None).validate().is_err());
        assert!(draft(1, Some(120.0), Some(-1.0)).validate().is_err());
    }

    #[test]
    fn computed_fields_match_backend_formulas() {
        // 800w for 120 sqm
        let unit = price_per_sqm(Some(800.0), Some(120.0)).unwrap();
        assert!((unit - 66_666.666).abs() < 0.01);

        // 6000 yuan/month rent against an 800w price
        let ratio = rent_ratio(Some(800.0), Some(6000.0)).unwrap();
        assert!((ratio - 0.9).abs() < 1e-9);

        assert_eq!(price_per_sqm(Some(800.0), None), None);
        assert_eq!(price_per_sqm(None, Some(120.0)), None);
        assert_eq!(rent_ratio(Some(800.0), Some(0.0)), None);
        assert_eq!(rent_ratio(Some(0.0), Some(6000.0)), None);
    }
}
