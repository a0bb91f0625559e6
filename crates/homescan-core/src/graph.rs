// ── Finalized area → device → entity graph ──
//
// The read-only result of `GraphBuilder::finalize()`. Collections are keyed
// by identifier and iterate in identifier order, so every report built on
// top of them is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{Area, AreaId, Device, DeviceId, Entity, EntityId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub(crate) areas: BTreeMap<AreaId, Area>,
    pub(crate) devices: BTreeMap<DeviceId, Device>,
    pub(crate) entities: BTreeMap<EntityId, Entity>,

    /// Devices whose area reference does not resolve.
    pub(crate) orphan_devices: BTreeSet<DeviceId>,
    /// Devices without an area reference.
    pub(crate) unassigned_devices: BTreeSet<DeviceId>,
    /// Entities whose device reference does not resolve.
    pub(crate) orphan_entities: BTreeSet<EntityId>,
    /// Entities without a device reference.
    pub(crate) standalone_entities: BTreeSet<EntityId>,
    /// Automation field references that match no ingested entity.
    pub(crate) unmatched_references: BTreeSet<String>,
}

impl Graph {
    // ── Collections ──────────────────────────────────────────────────

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    // ── Single-node lookups ──────────────────────────────────────────

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.get(id)
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    // ── Relationship walks ───────────────────────────────────────────

    /// Devices indexed under an area. Empty for unknown areas.
    pub fn devices_in_area(&self, id: &str) -> Vec<&Device> {
        self.area(id)
            .map(|a| a.devices.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|d| self.devices.get(d))
            .collect()
    }

    /// Entities indexed under a device. Empty for unknown devices.
    pub fn entities_of_device(&self, id: &str) -> Vec<&Entity> {
        self.device(id)
            .map(|d| d.entities.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|e| self.entities.get(e))
            .collect()
    }

    /// The area an entity sits in, through its device.
    pub fn area_of_entity(&self, id: &str) -> Option<&Area> {
        let device = self.entity(id)?.device_id.as_ref()?;
        let area = self.devices.get(device)?.area_id.as_ref()?;
        self.areas.get(area)
    }

    // ── Classification sets ──────────────────────────────────────────

    pub fn orphan_devices(&self) -> &BTreeSet<DeviceId> {
        &self.orphan_devices
    }

    pub fn unassigned_devices(&self) -> &BTreeSet<DeviceId> {
        &self.unassigned_devices
    }

    pub fn orphan_entities(&self) -> &BTreeSet<EntityId> {
        &self.orphan_entities
    }

    pub fn standalone_entities(&self) -> &BTreeSet<EntityId> {
        &self.standalone_entities
    }

    pub fn unmatched_references(&self) -> &BTreeSet<String> {
        &self.unmatched_references
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
