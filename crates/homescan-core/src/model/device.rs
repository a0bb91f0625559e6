// ── Device domain type ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::common::{Placement, SourceTag};
use super::ids::{AreaId, DeviceId, EntityId};

/// Which source last set each mergeable device field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProvenance {
    pub name: Option<SourceTag>,
    pub area_id: Option<SourceTag>,
    pub model: Option<SourceTag>,
    pub manufacturer: Option<SourceTag>,
}

/// The canonical Device type. Merges the device table with the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: Option<String>,
    /// Authoritative area reference. Kept even when it does not resolve.
    pub area_id: Option<AreaId>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,

    /// Resolution of `area_id`. Derived at finalize.
    pub placement: Placement,
    /// Entities whose device reference resolves here. Derived at finalize.
    pub entities: Vec<EntityId>,

    pub sources: BTreeSet<SourceTag>,
    pub provenance: DeviceProvenance,
}

impl Device {
    pub(crate) fn new(id: DeviceId) -> Self {
        Self {
            id,
            name: None,
            area_id: None,
            model: None,
            manufacturer: None,
            placement: Placement::Unassigned,
            entities: Vec::new(),
            sources: BTreeSet::new(),
            provenance: DeviceProvenance::default(),
        }
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    pub fn is_orphaned(&self) -> bool {
        self.placement == Placement::Orphaned
    }
}
