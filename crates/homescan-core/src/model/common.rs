// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Which input source supplied (or last updated) a record or field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceTag {
    SnapshotState,
    DeviceTable,
    DeviceRegistry,
    AreaRegistry,
    AutomationScan,
    StorageInventory,
}

impl SourceTag {
    /// Conflict precedence. When two sources disagree on a non-empty field,
    /// the value from the higher (or equal, later) precedence wins.
    pub fn precedence(self) -> u8 {
        match self {
            Self::SnapshotState | Self::DeviceTable => 2,
            Self::AreaRegistry | Self::DeviceRegistry => 1,
            Self::AutomationScan | Self::StorageInventory => 0,
        }
    }
}

/// How a device relates to the area index after finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Placement {
    /// The reference resolves to a known node.
    Resolved,
    /// No reference at all.
    #[default]
    Unassigned,
    /// A reference is present but matches no known node.
    Orphaned,
}

/// Field-by-field merge of an optional value.
///
/// Empty incoming values never overwrite; a present value is replaced only
/// when the incoming source's precedence is at least the recorded one.
pub(crate) fn merge_field<T: PartialEq>(
    slot: &mut Option<T>,
    slot_source: &mut Option<SourceTag>,
    incoming: Option<T>,
    source: SourceTag,
) -> bool {
    let Some(value) = incoming else {
        return false;
    };
    let wins = match *slot_source {
        Some(prev) if slot.is_some() => source.precedence() >= prev.precedence(),
        _ => true,
    };
    if !wins {
        return false;
    }
    let changed = slot.as_ref() != Some(&value);
    *slot = Some(value);
    *slot_source = Some(source);
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tag_display_is_snake_case() {
        assert_eq!(SourceTag::DeviceRegistry.to_string(), "device_registry");
        assert_eq!("snapshot_state".parse::<SourceTag>().ok(), Some(SourceTag::SnapshotState));
    }

    #[test]
    fn empty_incoming_never_overwrites() {
        let mut slot = Some("Acme".to_owned());
        let mut src = Some(SourceTag::DeviceRegistry);
        assert!(!merge_field(&mut slot, &mut src, None, SourceTag::DeviceTable));
        assert_eq!(slot.as_deref(), Some("Acme"));
    }

    #[test]
    fn lower_precedence_does_not_replace_higher() {
        let mut slot = Some("Table".to_owned());
        let mut src = Some(SourceTag::DeviceTable);
        merge_field(&mut slot, &mut src, Some("Registry".into()), SourceTag::DeviceRegistry);
        assert_eq!(slot.as_deref(), Some("Table"));

        merge_field(&mut slot, &mut src, Some("Table v2".into()), SourceTag::DeviceTable);
        assert_eq!(slot.as_deref(), Some("Table v2"));
        assert_eq!(src, Some(SourceTag::DeviceTable));
    }

    #[test]
    fn higher_precedence_replaces_lower() {
        let mut slot = Some("Registry".to_owned());
        let mut src = Some(SourceTag::DeviceRegistry);
        merge_field(&mut slot, &mut src, Some("Table".into()), SourceTag::DeviceTable);
        assert_eq!(slot.as_deref(), Some("Table"));
        assert_eq!(src, Some(SourceTag::DeviceTable));
    }
}
