// ── Identity normalizer ──
//
// Turns raw records into validated ones carrying canonical identifiers and
// a provenance tag. Pure: returns either the normalized record or the issue
// explaining why it was dropped.

use crate::issue::Issue;
use crate::model::{AreaId, Attributes, DeviceId, EntityId, SourceTag, attributes_from_json};
use crate::record::{AreaRecord, DeviceRecord, EntityStateRecord};

/// A record that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub record: T,
    pub source: SourceTag,
    /// Non-fatal findings about the record (it is still ingested).
    pub warnings: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedArea {
    pub id: AreaId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDevice {
    pub id: DeviceId,
    pub name: Option<String>,
    pub area_id: Option<AreaId>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntity {
    pub id: EntityId,
    pub state: Option<String>,
    pub attributes: Attributes,
}

/// Empty or whitespace-only strings are absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn normalize_area(raw: AreaRecord, source: SourceTag) -> Result<Normalized<NormalizedArea>, Issue> {
    let Some(id) = AreaId::parse(raw.area_id) else {
        return Err(Issue::malformed(
            source,
            format!("area '{}'", raw.name),
            "empty area id",
        ));
    };
    Ok(Normalized {
        record: NormalizedArea {
            id,
            name: non_empty(Some(raw.name)),
        },
        source,
        warnings: Vec::new(),
    })
}

pub fn normalize_device(
    raw: DeviceRecord,
    source: SourceTag,
) -> Result<Normalized<NormalizedDevice>, Issue> {
    let Some(id) = DeviceId::parse(raw.device_id) else {
        let label = raw.name.as_deref().unwrap_or("<unnamed>");
        return Err(Issue::malformed(
            source,
            format!("device '{label}'"),
            "empty device id",
        ));
    };
    Ok(Normalized {
        record: NormalizedDevice {
            id,
            name: non_empty(raw.name),
            area_id: AreaId::parse_opt(raw.area_id),
            model: non_empty(raw.model),
            manufacturer: non_empty(raw.manufacturer),
        },
        source,
        warnings: Vec::new(),
    })
}

pub fn normalize_entity(
    raw: EntityStateRecord,
    source: SourceTag,
) -> Result<Normalized<NormalizedEntity>, Issue> {
    let id = EntityId::parse(raw.entity_id.clone()).map_err(|err| {
        Issue::malformed(source, format!("entity '{}'", raw.entity_id), err.to_string())
    })?;

    let mut warnings = Vec::new();
    let attributes = attributes_from_json(raw.attributes).unwrap_or_else(|err| {
        warnings.push(Issue::malformed(source, format!("entity '{id}'"), err.to_string()));
        Attributes::new()
    });

    Ok(Normalized {
        record: NormalizedEntity {
            id,
            state: non_empty(Some(raw.state)),
            attributes,
        },
        source,
        warnings,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;
    use serde_json::json;

    #[test]
    fn entity_without_domain_separator_is_malformed() {
        let raw = EntityStateRecord::new("noDotHere", "on", json!({}));
        let issue = normalize_entity(raw, SourceTag::SnapshotState).unwrap_err();
        assert_eq!(issue.kind, IssueKind::MalformedRecord);
        assert_eq!(issue.source, Some(SourceTag::SnapshotState));
        assert!(issue.subject.contains("noDotHere"));
    }

    #[test]
    fn entity_with_scalar_attributes_is_kept_with_warning() {
        let raw = EntityStateRecord::new("sensor.temp", "21.5", json!(42));
        let n = normalize_entity(raw, SourceTag::SnapshotState).unwrap();
        assert!(n.record.attributes.is_empty());
        assert_eq!(n.warnings.len(), 1);
        assert_eq!(n.record.state.as_deref(), Some("21.5"));
    }

    #[test]
    fn empty_state_is_absent() {
        let raw = EntityStateRecord::new("light.hall", "", json!(null));
        let n = normalize_entity(raw, SourceTag::SnapshotState).unwrap();
        assert_eq!(n.record.state, None);
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn device_with_empty_id_is_malformed() {
        let raw = DeviceRecord::new("").with_name("Ghost");
        let issue = normalize_device(raw, SourceTag::DeviceTable).unwrap_err();
        assert_eq!(issue.kind, IssueKind::MalformedRecord);
        assert!(issue.subject.contains("Ghost"));
    }

    #[test]
    fn device_empty_fields_become_absent() {
        let raw = DeviceRecord::new("dev1").with_area("").with_manufacturer(" ");
        let n = normalize_device(raw, SourceTag::DeviceTable).unwrap();
        assert_eq!(n.record.area_id, None);
        assert_eq!(n.record.manufacturer, None);
        assert_eq!(n.source, SourceTag::DeviceTable);
    }

    #[test]
    fn area_with_empty_id_is_malformed() {
        let issue = normalize_area(AreaRecord::new("", "Attic"), SourceTag::AreaRegistry).unwrap_err();
        assert_eq!(issue.kind, IssueKind::MalformedRecord);
    }
}
