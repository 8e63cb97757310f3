pub mod community;
pub mod property;

pub use crate::entities::community::Community;
pub use crate::entities::community::CommunityDraft;
pub use crate::entities::community::CommunityPatch;

pub use crate::entities::property::Property;
pub use crate::entities::property::PropertyDraft;
pub use crate::entities::property::PropertyPatch;
