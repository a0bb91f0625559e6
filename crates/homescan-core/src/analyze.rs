// ── Statistics & relationship analyzer ──
//
// Read-only summaries of a finalized graph. Every list is sorted so the
// same graph always renders the same report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{DeviceId, EntityId};

/// Label used when a device has no manufacturer.
pub const UNKNOWN_MANUFACTURER: &str = "unknown";

/// One row of a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub areas: usize,
    pub devices: usize,
    pub entities: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationSummary {
    /// Entities mentioned by at least one automation or script.
    pub referenced: Vec<EntityId>,
    pub unreferenced_count: usize,
    /// `entity_id:` values that match no ingested entity.
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub totals: Totals,
    pub entities_by_domain: Vec<GroupCount>,
    pub devices_by_manufacturer: Vec<GroupCount>,
    pub devices_by_area: Vec<GroupCount>,
    pub entities_by_area: Vec<GroupCount>,
    pub orphan_devices: Vec<DeviceId>,
    pub unassigned_devices: Vec<DeviceId>,
    pub orphan_entities: Vec<EntityId>,
    pub standalone_entities: Vec<EntityId>,
    pub automation: AutomationSummary,
    pub unavailable_entities: Vec<EntityId>,
}

impl Statistics {
    pub fn orphan_count(&self) -> usize {
        self.orphan_devices.len() + self.orphan_entities.len()
    }

    /// Count for one domain, zero when absent.
    pub fn domain_count(&self, domain: &str) -> usize {
        self.entities_by_domain
            .iter()
            .find(|g| g.key == domain)
            .map_or(0, |g| g.count)
    }
}

/// Compute statistics for a finalized graph.
pub fn analyze(graph: &Graph) -> Statistics {
    let entities_by_domain = group(graph.entities().map(|e| e.domain().to_owned()));
    let devices_by_manufacturer = group(graph.devices().map(|d| {
        d.manufacturer
            .clone()
            .unwrap_or_else(|| UNKNOWN_MANUFACTURER.to_owned())
    }));

    // Areas with no devices still appear, with a zero count.
    let mut by_area_devices = BTreeMap::new();
    let mut by_area_entities = BTreeMap::new();
    for area in graph.areas() {
        *by_area_devices.entry(area.name.clone()).or_insert(0) += area.devices.len();
        *by_area_entities.entry(area.name.clone()).or_insert(0) += area.entities.len();
    }

    let (referenced, unreferenced): (Vec<_>, Vec<_>) =
        graph.entities().partition(|e| e.referenced_by_automation);

    Statistics {
        totals: Totals {
            areas: graph.area_count(),
            devices: graph.device_count(),
            entities: graph.entity_count(),
        },
        entities_by_domain,
        devices_by_manufacturer,
        devices_by_area: sorted(by_area_devices),
        entities_by_area: sorted(by_area_entities),
        orphan_devices: graph.orphan_devices().iter().cloned().collect(),
        unassigned_devices: graph.unassigned_devices().iter().cloned().collect(),
        orphan_entities: graph.orphan_entities().iter().cloned().collect(),
        standalone_entities: graph.standalone_entities().iter().cloned().collect(),
        automation: AutomationSummary {
            referenced: referenced.into_iter().map(|e| e.id.clone()).collect(),
            unreferenced_count: unreferenced.len(),
            unmatched: graph.unmatched_references().iter().cloned().collect(),
        },
        unavailable_entities: graph
            .entities()
            .filter(|e| e.is_unavailable())
            .map(|e| e.id.clone())
            .collect(),
    }
}

fn group(keys: impl Iterator<Item = String>) -> Vec<GroupCount> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    sorted(counts)
}

/// Count descending, then key ascending.
fn sorted(counts: BTreeMap<String, usize>) -> Vec<GroupCount> {
    let mut rows: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    rows
}
