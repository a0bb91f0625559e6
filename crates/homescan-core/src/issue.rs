// ── Data-quality issues ──
//
// Problems with the input data never abort a scan. They are collected here
// and surfaced in the final report.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::model::SourceTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueKind {
    /// A single record failed identifier or shape validation.
    MalformedRecord,
    /// A device or entity points at a node that does not exist.
    UnresolvedReference,
    /// A whole source could not be read.
    SourceUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub source: Option<SourceTag>,
    /// The record or source the issue is about.
    pub subject: String,
    pub detail: String,
}

impl Issue {
    pub fn malformed(source: SourceTag, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::MalformedRecord,
            source: Some(source),
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    pub fn unresolved(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::UnresolvedReference,
            source: None,
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    pub fn unavailable(source: SourceTag, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::SourceUnavailable,
            source: Some(source),
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.source {
            Some(source) => write!(f, "[{}] {} ({source}): {}", self.kind, self.subject, self.detail),
            None => write!(f, "[{}] {}: {}", self.kind, self.subject, self.detail),
        }
    }
}
