// ── Scan pipeline ──
//
// Read every source, feed the builder, finalize, analyze. A source that
// cannot be read becomes a `SourceUnavailable` issue; the scan goes on with
// whatever the other sources provided.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyze::{Statistics, analyze};
use crate::builder::{GraphBuilder, IngestReport};
use crate::error::CoreError;
use crate::graph::Graph;
use crate::issue::Issue;
use crate::model::SourceTag;
use crate::record::{AreaRecord, AutomationText, DeviceRecord, EntityStateRecord};
use crate::references::scan_references;
use crate::source::RecordSource;

type Boxed<R> = Box<dyn RecordSource<Record = R>>;

/// The sources feeding one scan. Any list may be empty.
#[derive(Default)]
pub struct ScanInputs {
    pub areas: Vec<Boxed<AreaRecord>>,
    pub devices: Vec<Boxed<DeviceRecord>>,
    pub entities: Vec<Boxed<EntityStateRecord>>,
    pub automations: Vec<Boxed<AutomationText>>,
}

impl ScanInputs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_areas(mut self, source: impl RecordSource<Record = AreaRecord> + 'static) -> Self {
        self.areas.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn with_devices(mut self, source: impl RecordSource<Record = DeviceRecord> + 'static) -> Self {
        self.devices.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn with_entities(
        mut self,
        source: impl RecordSource<Record = EntityStateRecord> + 'static,
    ) -> Self {
        self.entities.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn with_automations(
        mut self,
        source: impl RecordSource<Record = AutomationText> + 'static,
    ) -> Self {
        self.automations.push(Box::new(source));
        self
    }
}

/// What happened to one source during the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub tag: SourceTag,
    pub label: String,
    /// `None` when the source could not be read.
    pub report: Option<IngestReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub scanned_at: DateTime<Utc>,
    pub graph: Graph,
    pub statistics: Statistics,
    pub sources: Vec<SourceSummary>,
    pub issues: Vec<Issue>,
}

pub fn run_scan(inputs: ScanInputs) -> Result<ScanOutcome, CoreError> {
    let scanned_at = Utc::now();
    let mut builder = GraphBuilder::new();
    let mut pipeline = Pipeline::default();

    for source in &inputs.areas {
        if let Some(records) = pipeline.read(source.as_ref()) {
            let report = builder.ingest_areas(records, source.tag())?;
            pipeline.ingested(source.as_ref(), report);
        }
    }
    for source in &inputs.devices {
        if let Some(records) = pipeline.read(source.as_ref()) {
            let report = builder.ingest_devices(records, source.tag())?;
            pipeline.ingested(source.as_ref(), report);
        }
    }
    for source in &inputs.entities {
        if let Some(records) = pipeline.read(source.as_ref()) {
            let report = builder.ingest_entities(records, source.tag())?;
            pipeline.ingested(source.as_ref(), report);
        }
    }
    for source in &inputs.automations {
        if let Some(texts) = pipeline.read(source.as_ref()) {
            let count = texts.len();
            builder.record_automation_references(scan_references(&texts))?;
            pipeline.ingested(
                source.as_ref(),
                IngestReport {
                    inserted: count,
                    ..IngestReport::default()
                },
            );
        }
    }

    let (graph, mut issues) = builder.into_parts();
    let statistics = analyze(&graph);
    issues.extend(pipeline.unavailable);

    tracing::info!(
        areas = statistics.totals.areas,
        devices = statistics.totals.devices,
        entities = statistics.totals.entities,
        issues = issues.len(),
        "scan complete"
    );

    Ok(ScanOutcome {
        scanned_at,
        graph,
        statistics,
        sources: pipeline.sources,
        issues,
    })
}

#[derive(Default)]
struct Pipeline {
    sources: Vec<SourceSummary>,
    unavailable: Vec<Issue>,
}

impl Pipeline {
    fn read<R>(&mut self, source: &dyn RecordSource<Record = R>) -> Option<Vec<R>> {
        let label = source.describe();
        match source.read() {
            Ok(records) => {
                tracing::debug!(source = %label, records = records.len(), "read source");
                Some(records)
            }
            Err(err) => {
                tracing::warn!(source = %label, error = %err, "source unavailable");
                self.unavailable
                    .push(Issue::unavailable(source.tag(), &label, err.to_string()));
                self.sources.push(SourceSummary {
                    tag: source.tag(),
                    label,
                    report: None,
                });
                None
            }
        }
    }

    fn ingested<R>(&mut self, source: &dyn RecordSource<Record = R>, report: IngestReport) {
        self.sources.push(SourceSummary {
            tag: source.tag(),
            label: source.describe(),
            report: Some(report),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;
    use crate::source::StaticSource;
    use serde_json::json;

    #[test]
    fn failing_source_becomes_issue_and_scan_continues() {
        let inputs = ScanInputs::new()
            .with_areas(StaticSource::<AreaRecord>::failing(
                SourceTag::AreaRegistry,
                "file not found",
            ))
            .with_entities(StaticSource::new(
                SourceTag::SnapshotState,
                vec![EntityStateRecord::new("light.a", "on", json!({}))],
            ));
        let outcome = run_scan(inputs).unwrap();

        assert_eq!(outcome.statistics.totals.entities, 1);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].kind, IssueKind::SourceUnavailable);
        assert_eq!(outcome.issues[0].source, Some(SourceTag::AreaRegistry));
        assert_eq!(outcome.sources.len(), 2);
        assert!(outcome.sources[0].report.is_none());
    }

    #[test]
    fn automation_sources_flag_ingested_entities() {
        let inputs = ScanInputs::new()
            .with_entities(StaticSource::new(
                SourceTag::SnapshotState,
                vec![
                    EntityStateRecord::new("light.a", "on", json!({})),
                    EntityStateRecord::new("light.b", "on", json!({})),
                ],
            ))
            .with_automations(StaticSource::new(
                SourceTag::AutomationScan,
                vec![AutomationText {
                    origin: "automations.yaml".into(),
                    text: "entity_id: light.b".into(),
                }],
            ));
        let outcome = run_scan(inputs).unwrap();
        assert!(outcome.graph.entity("light.b").unwrap().referenced_by_automation);
        assert!(!outcome.graph.entity("light.a").unwrap().referenced_by_automation);
        assert_eq!(outcome.statistics.automation.unreferenced_count, 1);
    }

    #[test]
    fn empty_inputs_produce_an_empty_report() {
        let outcome = run_scan(ScanInputs::new()).unwrap();
        assert_eq!(outcome.graph.entity_count(), 0);
        assert!(outcome.issues.is_empty());
    }
}
