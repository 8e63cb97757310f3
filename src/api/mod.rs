mod client;
mod memory;

pub use client::ApiClient;
pub use memory::InMemoryCatalog;

use crate::entities::{
    Community, CommunityDraft, CommunityPatch, Property, PropertyDraft, PropertyPatch,
};
use crate::error::Result;

/// CRUD seam over the listing backend.
///
/// Updates are partial merges: only supplied fields change. `get` and
/// `update` report a missing record as `None`, `delete` as `false`.
pub trait Catalog {
    async fn create_community(&self, draft: &CommunityDraft) -> Result<Community>;
    async fn update_community(&self, id: i64, patch: &CommunityPatch) -> Result<Option<Community>>;
    async fn get_community(&self, id: i64) -> Result<Option<Community>>;
    async fn delete_community(&self, id: i64) -> Result<bool>;
    async fn list_communities(&self) -> Result<Vec<Community>>;

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Property>;
    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> Result<Option<Property>>;
    async fn get_property(&self, id: i64) -> Result<Option<Property>>;
    async fn delete_property(&self, id: i64) -> Result<bool>;
    async fn list_properties(&self) -> Result<Vec<Property>>;
}
