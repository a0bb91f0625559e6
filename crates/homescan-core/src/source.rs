// ── Reader seam ──
//
// Each input source implements `RecordSource` for the record type it
// yields. The scan pipeline only ever talks to this trait.

use crate::error::SourceError;
use crate::model::SourceTag;

pub trait RecordSource {
    type Record;

    /// Provenance recorded on every node this source touches.
    fn tag(&self) -> SourceTag;

    /// Short human label for logs and issues (e.g. a file path).
    fn describe(&self) -> String;

    /// Read every record. A failure means the whole source is unavailable.
    fn read(&self) -> Result<Vec<Self::Record>, SourceError>;
}

/// An in-memory source, handy for tests and for pre-collected records.
#[derive(Debug, Clone)]
pub struct StaticSource<R> {
    tag: SourceTag,
    label: String,
    records: Result<Vec<R>, String>,
}

impl<R: Clone> StaticSource<R> {
    pub fn new(tag: SourceTag, records: Vec<R>) -> Self {
        Self {
            tag,
            label: format!("static {tag}"),
            records: Ok(records),
        }
    }

    /// A source whose `read()` always fails with the given reason.
    pub fn failing(tag: SourceTag, reason: impl Into<String>) -> Self {
        Self {
            tag,
            label: format!("static {tag}"),
            records: Err(reason.into()),
        }
    }
}

impl<R: Clone> RecordSource for StaticSource<R> {
    type Record = R;

    fn tag(&self) -> SourceTag {
        self.tag
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    fn read(&self) -> Result<Vec<R>, SourceError> {
        self.records
            .clone()
            .map_err(|reason| SourceError::unreadable(self.label.clone(), reason))
    }
}
