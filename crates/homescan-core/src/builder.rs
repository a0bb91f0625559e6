// ── Graph builder ──
//
// Accumulates normalized records from every source, then resolves all
// references in one `finalize()` pass. Ingestion order is free: a device may
// arrive before its area, an entity before its device.
//
// Authoritative references (Device.area_id, Entity.attributes.device_id)
// are the only inputs to resolution. Every derived index is cleared and
// rebuilt on each finalize, which is what makes it idempotent.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::graph::Graph;
use crate::issue::Issue;
use crate::model::common::merge_field;
use crate::model::{Area, Device, Entity, Placement, SourceTag};
use crate::normalize::{
    Normalized, NormalizedArea, NormalizedDevice, NormalizedEntity, normalize_area,
    normalize_device, normalize_entity,
};
use crate::record::{AreaRecord, DeviceRecord, EntityStateRecord};
use crate::references::ReferenceScan;

/// Outcome of one ingest call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Records that created a new node.
    pub inserted: usize,
    /// Records merged into an existing node.
    pub merged: usize,
    /// Records dropped as malformed.
    pub skipped: usize,
}

impl IngestReport {
    fn count(&mut self, is_new: bool) {
        if is_new {
            self.inserted += 1;
        } else {
            self.merged += 1;
        }
    }
}

/// Private, mutable accumulator sealed by [`finalize`](Self::finalize).
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    references: ReferenceScan,
    ingest_issues: Vec<Issue>,
    resolution_issues: Vec<Issue>,
    sealed: bool,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    // ── Ingestion ────────────────────────────────────────────────────

    pub fn ingest_areas(
        &mut self,
        records: impl IntoIterator<Item = AreaRecord>,
        source: SourceTag,
    ) -> Result<IngestReport, CoreError> {
        self.ensure_open("ingest areas")?;
        let mut report = IngestReport::default();
        for raw in records {
            match normalize_area(raw, source) {
                Ok(n) => {
                    let is_new = self.upsert_area(n);
                    report.count(is_new);
                }
                Err(issue) => self.skip(&mut report, issue),
            }
        }
        tracing::debug!(%source, ?report, "ingested areas");
        Ok(report)
    }

    pub fn ingest_devices(
        &mut self,
        records: impl IntoIterator<Item = DeviceRecord>,
        source: SourceTag,
    ) -> Result<IngestReport, CoreError> {
        self.ensure_open("ingest devices")?;
        let mut report = IngestReport::default();
        for raw in records {
            match normalize_device(raw, source) {
                Ok(n) => {
                    let is_new = self.upsert_device(n);
                    report.count(is_new);
                }
                Err(issue) => self.skip(&mut report, issue),
            }
        }
        tracing::debug!(%source, ?report, "ingested devices");
        Ok(report)
    }

    pub fn ingest_entities(
        &mut self,
        records: impl IntoIterator<Item = EntityStateRecord>,
        source: SourceTag,
    ) -> Result<IngestReport, CoreError> {
        self.ensure_open("ingest entities")?;
        let mut report = IngestReport::default();
        for raw in records {
            match normalize_entity(raw, source) {
                Ok(n) => {
                    let is_new = self.upsert_entity(n);
                    report.count(is_new);
                }
                Err(issue) => self.skip(&mut report, issue),
            }
        }
        tracing::debug!(%source, ?report, "ingested entities");
        Ok(report)
    }

    /// Remember automation references; they are applied at finalize, and
    /// only to entities that were ingested.
    pub fn record_automation_references(&mut self, scan: ReferenceScan) -> Result<(), CoreError> {
        self.ensure_open("record automation references")?;
        self.references.merge(scan);
        Ok(())
    }

    // ── Finalization ─────────────────────────────────────────────────

    /// Resolve references, rebuild derived indices and seal the builder.
    pub fn finalize(&mut self) -> &Graph {
        let Graph {
            areas,
            devices,
            entities,
            orphan_devices,
            unassigned_devices,
            orphan_entities,
            standalone_entities,
            unmatched_references,
        } = &mut self.graph;

        self.resolution_issues.clear();
        orphan_devices.clear();
        unassigned_devices.clear();
        orphan_entities.clear();
        standalone_entities.clear();
        unmatched_references.clear();
        for area in areas.values_mut() {
            area.devices.clear();
            area.entities.clear();
        }

        // Device → Area
        for device in devices.values_mut() {
            device.entities.clear();
            device.placement = match &device.area_id {
                None => {
                    unassigned_devices.insert(device.id.clone());
                    Placement::Unassigned
                }
                Some(area_id) => match areas.get_mut(area_id) {
                    Some(area) => {
                        area.devices.push(device.id.clone());
                        Placement::Resolved
                    }
                    None => {
                        orphan_devices.insert(device.id.clone());
                        self.resolution_issues.push(Issue::unresolved(
                            format!("device '{}'", device.id),
                            format!("area '{area_id}' is not in the area registry"),
                        ));
                        Placement::Orphaned
                    }
                },
            };
        }

        // Entity → Device (→ Area)
        for entity in entities.values_mut() {
            entity.device_id = entity.device_reference();
            entity.referenced_by_automation = self.references.mentions(entity.id.as_str());
            entity.placement = match &entity.device_id {
                None => {
                    standalone_entities.insert(entity.id.clone());
                    Placement::Unassigned
                }
                Some(device_id) => match devices.get_mut(device_id) {
                    Some(device) => {
                        device.entities.push(entity.id.clone());
                        if device.placement == Placement::Resolved {
                            if let Some(area) =
                                device.area_id.as_ref().and_then(|a| areas.get_mut(a))
                            {
                                area.entities.push(entity.id.clone());
                            }
                        }
                        Placement::Resolved
                    }
                    None => {
                        orphan_entities.insert(entity.id.clone());
                        self.resolution_issues.push(Issue::unresolved(
                            format!("entity '{}'", entity.id),
                            format!("device '{device_id}' is not known"),
                        ));
                        Placement::Orphaned
                    }
                },
            };
        }

        unmatched_references.extend(
            self.references
                .field_references
                .iter()
                .filter(|id| !entities.contains_key(id.as_str()))
                .cloned(),
        );

        if !self.sealed {
            tracing::info!(
                areas = areas.len(),
                devices = devices.len(),
                entities = entities.len(),
                orphan_devices = orphan_devices.len(),
                orphan_entities = orphan_entities.len(),
                "graph finalized"
            );
        }
        self.sealed = true;
        &self.graph
    }

    /// The finalized graph, or `None` before [`finalize`](Self::finalize).
    pub fn graph(&self) -> Option<&Graph> {
        self.sealed.then_some(&self.graph)
    }

    /// Every issue found so far: malformed records, then unresolved
    /// references from the latest finalize.
    pub fn issues(&self) -> Vec<Issue> {
        self.ingest_issues
            .iter()
            .chain(&self.resolution_issues)
            .cloned()
            .collect()
    }

    /// Finalize (if not done yet) and hand out the graph and issues.
    pub fn into_parts(mut self) -> (Graph, Vec<Issue>) {
        if !self.sealed {
            self.finalize();
        }
        let mut issues = self.ingest_issues;
        issues.extend(self.resolution_issues);
        (self.graph, issues)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn ensure_open(&self, operation: &'static str) -> Result<(), CoreError> {
        if self.sealed {
            return Err(CoreError::GraphSealed { operation });
        }
        Ok(())
    }

    fn skip(&mut self, report: &mut IngestReport, issue: Issue) {
        tracing::debug!(%issue, "skipping malformed record");
        report.skipped += 1;
        self.ingest_issues.push(issue);
    }

    fn upsert_area(&mut self, n: Normalized<NormalizedArea>) -> bool {
        let Normalized {
            record,
            source,
            warnings,
        } = n;
        self.ingest_issues.extend(warnings);

        if let Some(area) = self.graph.areas.get_mut(&record.id) {
            if let Some(name) = record.name {
                area.name = name;
            }
            area.sources.insert(source);
            return false;
        }
        let name = record.name.unwrap_or_else(|| record.id.to_string());
        self.graph
            .areas
            .insert(record.id.clone(), Area::new(record.id, name, source));
        true
    }

    fn upsert_device(&mut self, n: Normalized<NormalizedDevice>) -> bool {
        let Normalized {
            record,
            source,
            warnings,
        } = n;
        self.ingest_issues.extend(warnings);

        let is_new = !self.graph.devices.contains_key(&record.id);
        let device = self
            .graph
            .devices
            .entry(record.id.clone())
            .or_insert_with(|| Device::new(record.id));
        let p = &mut device.provenance;
        merge_field(&mut device.name, &mut p.name, record.name, source);
        merge_field(&mut device.area_id, &mut p.area_id, record.area_id, source);
        merge_field(&mut device.model, &mut p.model, record.model, source);
        merge_field(
            &mut device.manufacturer,
            &mut p.manufacturer,
            record.manufacturer,
            source,
        );
        device.sources.insert(source);
        is_new
    }

    fn upsert_entity(&mut self, n: Normalized<NormalizedEntity>) -> bool {
        let Normalized {
            record,
            source,
            warnings,
        } = n;
        self.ingest_issues.extend(warnings);

        let is_new = !self.graph.entities.contains_key(&record.id);
        let entity = self
            .graph
            .entities
            .entry(record.id.clone())
            .or_insert_with(|| Entity::new(record.id));
        merge_field(
            &mut entity.state,
            &mut entity.provenance.state,
            record.state,
            source,
        );
        if !record.attributes.is_empty() {
            entity.attributes.extend(record.attributes);
            entity.provenance.attributes = Some(source);
        }
        entity.sources.insert(source);
        is_new
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;
    use serde_json::json;

    #[test]
    fn ingest_after_finalize_is_a_state_error() {
        let mut b = GraphBuilder::new();
        b.finalize();
        let err = b
            .ingest_areas([AreaRecord::new("a", "A")], SourceTag::AreaRegistry)
            .unwrap_err();
        assert!(matches!(err, CoreError::GraphSealed { operation: "ingest areas" }));
        assert!(b.record_automation_references(ReferenceScan::default()).is_err());
    }

    #[test]
    fn graph_is_unavailable_until_finalized() {
        let mut b = GraphBuilder::new();
        assert!(b.graph().is_none());
        b.finalize();
        assert!(b.graph().is_some());
        assert!(b.is_sealed());
    }

    #[test]
    fn ingest_report_counts_inserted_merged_skipped() {
        let mut b = GraphBuilder::new();
        let report = b
            .ingest_entities(
                [
                    EntityStateRecord::new("light.a", "on", json!({})),
                    EntityStateRecord::new("light.a", "off", json!({})),
                    EntityStateRecord::new("bad", "on", json!({})),
                ],
                SourceTag::SnapshotState,
            )
            .unwrap();
        assert_eq!(
            report,
            IngestReport {
                inserted: 1,
                merged: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn latest_non_empty_state_wins_and_attributes_merge_by_key() {
        let mut b = GraphBuilder::new();
        b.ingest_entities(
            [
                EntityStateRecord::new("sensor.t", "20", json!({"unit": "C", "a": 1})),
                EntityStateRecord::new("sensor.t", "21", json!({"a": 2})),
                EntityStateRecord::new("sensor.t", "", json!(null)),
            ],
            SourceTag::SnapshotState,
        )
        .unwrap();
        let g = b.finalize();
        let e = g.entity("sensor.t").unwrap();
        assert_eq!(e.state.as_deref(), Some("21"));
        assert_eq!(e.attributes["a"], crate::model::AttributeValue::from(json!(2)));
        assert_eq!(e.attributes["unit"].as_str(), Some("C"));
    }

    #[test]
    fn area_duplicates_overwrite_name_only() {
        let mut b = GraphBuilder::new();
        b.ingest_areas(
            [AreaRecord::new("lr", "Lounge"), AreaRecord::new("lr", "Living Room")],
            SourceTag::AreaRegistry,
        )
        .unwrap();
        let g = b.finalize();
        assert_eq!(g.area_count(), 1);
        assert_eq!(g.area("lr").unwrap().name, "Living Room");
    }

    #[test]
    fn scalar_attributes_are_reported_but_entity_is_kept() {
        let mut b = GraphBuilder::new();
        b.ingest_entities(
            [EntityStateRecord::new("sensor.t", "1", json!("oops"))],
            SourceTag::SnapshotState,
        )
        .unwrap();
        b.finalize();
        assert_eq!(b.graph().unwrap().entity_count(), 1);
        let issues = b.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MalformedRecord);
    }

    #[test]
    fn repeated_finalize_does_not_duplicate_issues() {
        let mut b = GraphBuilder::new();
        b.ingest_devices(
            [DeviceRecord::new("d").with_area("nowhere")],
            SourceTag::DeviceTable,
        )
        .unwrap();
        b.finalize();
        b.finalize();
        assert_eq!(b.issues().len(), 1);
        assert_eq!(b.issues()[0].kind, IssueKind::UnresolvedReference);
    }
}
