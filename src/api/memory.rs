use std::sync::Mutex;

use chrono::Utc;

use crate::api::Catalog;
use crate::entities::property::{price_per_sqm, rent_ratio};
use crate::entities::{
    Community, CommunityDraft, CommunityPatch, Property, PropertyDraft, PropertyPatch,
};
use crate::error::{Error, Result};

/// In-memory stand-in for the listing backend.
///
/// Mirrors the server's create/merge semantics, including the computed
/// price_per_sqm / rent_ratio fields and cascade deletion of a community's
/// properties, so import and form flows can be exercised without a server.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    create_calls: u64,
    fail_creates: Vec<u64>,
    expire_creates: Vec<u64>,
    communities: Vec<Community>,
    properties: Vec<Property>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_create(&mut self) -> Result<()> {
        self.create_calls += 1;
        if self.expire_creates.contains(&self.create_calls) {
            return Err(Error::AuthExpired);
        }
        if self.fail_creates.contains(&self.create_calls) {
            return Err(Error::TransferFailed(format!(
                "simulated failure on create {}",
                self.create_calls
            )));
        }
        Ok(())
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the nth create call (1-based, counted across both entities) fail
    /// with `TransferFailed`.
    pub fn fail_on_create(&self, call: u64) {
        self.state.lock().unwrap().fail_creates.push(call);
    }

    /// Makes the nth create call fail with `AuthExpired`, as the backend does
    /// when the bearer token lapses mid-batch.
    pub fn expire_on_create(&self, call: u64) {
        self.state.lock().unwrap().expire_creates.push(call);
    }
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn apply_computed(property: &mut Property) {
    property.price_per_sqm = price_per_sqm(property.price, property.area);
    property.rent_ratio = rent_ratio(property.price, property.rent);
}

impl Catalog for InMemoryCatalog {
    async fn create_community(&self, draft: &CommunityDraft) -> Result<Community> {
        draft.validate()?;
        let mut state = self.state.lock().unwrap();
        state.check_create()?;
        let now = Utc::now().naive_utc();
        let community = Community {
            id: state.allocate_id(),
            name: draft.name.trim().to_string(),
            district: blank_to_none(draft.district.clone()),
            address: draft.address.clone(),
            property_fee: draft.property_fee.clone(),
            parking: draft.parking.clone(),
            build_year: draft.build_year,
            metro: draft.metro.clone(),
            primary_school: draft.primary_school.clone(),
            middle_school: draft.middle_school.clone(),
            environment_score: draft.environment_score,
            photos: draft.photos.clone(),
            videos: draft.videos.clone(),
            notes: draft.notes.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.communities.push(community.clone());
        Ok(community)
    }

    async fn update_community(&self, id: i64, patch: &CommunityPatch) -> Result<Option<Community>> {
        patch.validate()?;
        let mut state = self.state.lock().unwrap();
        let Some(community) = state.communities.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            community.name = name.clone();
        }
        if let Some(district) = &patch.district {
            community.district = Some(district.clone());
        }
        if let Some(address) = &patch.address {
            community.address = Some(address.clone());
        }
        if let Some(property_fee) = &patch.property_fee {
            community.property_fee = Some(property_fee.clone());
        }
        if let Some(parking) = &patch.parking {
            community.parking = Some(parking.clone());
        }
        if let Some(build_year) = patch.build_year {
            community.build_year = Some(build_year);
        }
        if let Some(metro) = &patch.metro {
            community.metro = Some(metro.clone());
        }
        if let Some(primary_school) = &patch.primary_school {
            community.primary_school = Some(primary_school.clone());
        }
        if let Some(middle_school) = &patch.middle_school {
            community.middle_school = Some(middle_school.clone());
        }
        if let Some(environment_score) = patch.environment_score {
            community.environment_score = Some(environment_score);
        }
        if let Some(photos) = &patch.photos {
            community.photos = photos.clone();
        }
        if let Some(videos) = &patch.videos {
            community.videos = videos.clone();
        }
        if let Some(notes) = &patch.notes {
            community.notes = Some(notes.clone());
        }
        community.updated_at = Some(Utc::now().naive_utc());
        Ok(Some(community.clone()))
    }

    async fn get_community(&self, id: i64) -> Result<Option<Community>> {
        let state = self.state.lock().unwrap();
        Ok(state.communities.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_community(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.communities.len();
        state.communities.retain(|c| c.id != id);
        if state.communities.len() == before {
            return Ok(false);
        }
        // listings are owned by their community
        state.properties.retain(|p| p.community_id != id);
        Ok(true)
    }

    async fn list_communities(&self) -> Result<Vec<Community>> {
        let state = self.state.lock().unwrap();
        Ok(state.communities.clone())
    }

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Property> {
        draft.validate()?;
        let mut state = self.state.lock().unwrap();
        state.check_create()?;
        if !state.communities.iter().any(|c| c.id == draft.community_id) {
            return Err(Error::validation(format!(
                "community {} does not exist",
                draft.community_id
            )));
        }
        let now = Utc::now().naive_utc();
        let mut property = Property {
            id: state.allocate_id(),
            community_id: draft.community_id,
            building: draft.building.clone(),
            unit: draft.unit.clone(),
            room: draft.room.clone(),
            area: draft.area,
            layout: draft.layout.clone(),
            floor: draft.floor.clone(),
            orientation: draft.orientation.clone(),
            decoration: draft.decoration.clone(),
            price: draft.price,
            rent: draft.rent,
            expected_price: draft.expected_price,
            price_per_sqm: None,
            rent_ratio: None,
            visit_date: draft.visit_date,
            photos: draft.photos.clone(),
            videos: draft.videos.clone(),
            notes: draft.notes.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        apply_computed(&mut property);
        state.properties.push(property.clone());
        Ok(property)
    }

    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> Result<Option<Property>> {
        patch.validate()?;
        let mut state = self.state.lock().unwrap();
        if let Some(community_id) = patch.community_id {
            if !state.communities.iter().any(|c| c.id == community_id) {
                return Err(Error::validation(format!("community {community_id} does not exist")));
            }
        }
        let Some(property) = state.properties.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(community_id) = patch.community_id {
            property.community_id = community_id;
        }
        if let Some(building) = &patch.building {
            property.building = Some(building.clone());
        }
        if let Some(unit) = &patch.unit {
            property.unit = Some(unit.clone());
        }
        if let Some(room) = &patch.room {
            property.room = Some(room.clone());
        }
        if let Some(area) = patch.area {
            property.area = Some(area);
        }
        if let Some(layout) = &patch.layout {
            property.layout = Some(layout.clone());
        }
        if let Some(floor) = &patch.floor {
            property.floor = Some(floor.clone());
        }
        if let Some(orientation) = &patch.orientation {
            property.orientation = Some(orientation.clone());
        }
        if let Some(decoration) = &patch.decoration {
            property.decoration = Some(decoration.clone());
        }
        if let Some(price) = patch.price {
            property.price = Some(price);
        }
        if let Some(rent) = patch.rent {
            property.rent = Some(rent);
        }
        if let Some(expected_price) = patch.expected_price {
            property.expected_price = Some(expected_price);
        }
        if let Some(visit_date) = patch.visit_date {
            property.visit_date = Some(visit_date);
        }
        if let Some(photos) = &patch.photos {
            property.photos = photos.clone();
        }
        if let Some(videos) = &patch.videos {
            property.videos = videos.clone();
        }
        if let Some(notes) = &patch.notes {
            property.notes = Some(notes.clone());
        }
        apply_computed(property);
        property.updated_at = Some(Utc::now().naive_utc());
        Ok(Some(property.clone()))
    }

    async fn get_property(&self, id: i64) -> Result<Option<Property>> {
        let state = self.state.lock().unwrap();
        Ok(state.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_property(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.properties.len();
        state.properties.retain(|p| p.id != id);
        Ok(state.properties.len() != before)
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        let state = self.state.lock().unwrap();
        Ok(state.properties.clone())
    }
}
