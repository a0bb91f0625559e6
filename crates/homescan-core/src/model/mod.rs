// ── Unified domain model ──
//
// Canonical representation of areas, devices and entities after every
// source has been merged.

pub mod area;
pub mod attribute;
pub mod common;
pub mod device;
pub mod entity;
pub mod ids;

// ── Re-exports ──────────────────────────────────────────────────────

pub use area::Area;
pub use attribute::{AttributeValue, Attributes, UnsupportedAttributes, attributes_from_json};
pub use common::{Placement, SourceTag};
pub use device::{Device, DeviceProvenance};
pub use entity::{DEVICE_ID_ATTRIBUTE, Entity, EntityProvenance};
pub use ids::{AreaId, DeviceId, EntityId, InvalidEntityId};
