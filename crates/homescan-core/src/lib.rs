//! Reconciliation engine for home-automation installations.
//!
//! Merges a state snapshot, the device table, the area and device
//! registries and the automation files into one area → device → entity
//! graph, then derives statistics and orphan reports from it:
//!
//! - **[`GraphBuilder`]**: Private accumulator. Records from any source
//!   are normalized and merged field by field with source precedence;
//!   [`finalize()`](GraphBuilder::finalize) resolves every reference and
//!   seals the builder.
//!
//! - **[`Graph`]**: The finalized, read-only graph with orphan, unassigned
//!   and standalone classifications.
//!
//! - **[`analyze`]**: Counts by domain, manufacturer and area; automation
//!   coverage; unavailable entities.
//!
//! - **[`tiering`]**: Storage tiering advisor for block devices. Shares no
//!   state with the graph.
//!
//! - **[`run_scan`]**: Drives all of the above from a set of
//!   [`RecordSource`]s, turning unreadable sources into issues.

pub mod analyze;
pub mod builder;
pub mod error;
pub mod graph;
pub mod issue;
pub mod model;
pub mod normalize;
pub mod record;
pub mod references;
pub mod scan;
pub mod source;
pub mod tiering;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analyze::{AutomationSummary, GroupCount, Statistics, Totals, analyze};
pub use builder::{GraphBuilder, IngestReport};
pub use error::{CoreError, SourceError};
pub use graph::Graph;
pub use issue::{Issue, IssueKind};
pub use record::{AreaRecord, AutomationText, DeviceRecord, EntityStateRecord};
pub use references::{ReferenceScan, scan_references, scan_text};
pub use scan::{ScanInputs, ScanOutcome, SourceSummary, run_scan};
pub use source::{RecordSource, StaticSource};
pub use tiering::{DeviceClass, StorageDevice, Tier, classify};

pub use model::{
    Area, AreaId, AttributeValue, Attributes, Device, DeviceId, Entity, EntityId, Placement,
    SourceTag,
};
