// ── Entity domain type ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::attribute::Attributes;
use super::common::{Placement, SourceTag};
use super::ids::{DeviceId, EntityId};

/// Attribute key carrying the owning device's identifier.
pub const DEVICE_ID_ATTRIBUTE: &str = "device_id";

/// Which source last set each mergeable entity field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProvenance {
    pub state: Option<SourceTag>,
    pub attributes: Option<SourceTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Last non-empty state reported by a snapshot row.
    pub state: Option<String>,
    pub attributes: Attributes,

    /// Device reference read from `attributes.device_id`. Derived at finalize.
    pub device_id: Option<DeviceId>,
    /// Resolution of `device_id`. Derived at finalize.
    pub placement: Placement,
    /// Set when an automation or script mentions this entity.
    pub referenced_by_automation: bool,

    pub sources: BTreeSet<SourceTag>,
    pub provenance: EntityProvenance,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            state: None,
            attributes: Attributes::new(),
            device_id: None,
            placement: Placement::Unassigned,
            referenced_by_automation: false,
            sources: BTreeSet::new(),
            provenance: EntityProvenance::default(),
        }
    }

    pub fn domain(&self) -> &str {
        self.id.domain()
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get("friendly_name").and_then(|v| v.as_str())
    }

    /// The device reference embedded in the attributes, if it is a
    /// non-empty string.
    pub fn device_reference(&self) -> Option<DeviceId> {
        self.attributes
            .get(DEVICE_ID_ATTRIBUTE)
            .and_then(|v| v.as_str())
            .and_then(DeviceId::parse)
    }

    /// `unavailable` or `unknown`, the platform's placeholder states.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.state.as_deref(), Some("unavailable" | "unknown"))
    }
}
