// ── Area domain type ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::common::SourceTag;
use super::ids::{AreaId, DeviceId, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    /// Human-friendly display name (e.g., "Living Room").
    pub name: String,
    /// Devices whose area reference resolves here. Derived at finalize.
    pub devices: Vec<DeviceId>,
    /// Entities reached through `devices`. Derived at finalize, for
    /// reporting only.
    pub entities: Vec<EntityId>,
    pub sources: BTreeSet<SourceTag>,
}

impl Area {
    pub(crate) fn new(id: AreaId, name: String, source: SourceTag) -> Self {
        Self {
            id,
            name,
            devices: Vec::new(),
            entities: Vec::new(),
            sources: BTreeSet::from([source]),
        }
    }
}
