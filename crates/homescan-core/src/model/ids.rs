// ── Core identity types ──
//
// EntityId, DeviceId and AreaId are the keys of every graph collection.
// All three keep the source system's spelling verbatim; only validation
// differs.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a raw entity identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEntityId {
    #[error("entity id is empty")]
    Empty,
    #[error("entity id '{0}' has no domain separator")]
    MissingSeparator(String),
    #[error("entity id '{0}' has more than one domain separator")]
    ExtraSeparator(String),
    #[error("entity id '{0}' has an empty domain or object id")]
    EmptyPart(String),
}

// ── EntityId ────────────────────────────────────────────────────────

/// Identifier of an entity, `<domain>.<object_id>`.
///
/// Exactly one `.` is allowed, with non-empty text on both sides.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    raw: String,
    split: usize,
}

impl EntityId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidEntityId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidEntityId::Empty);
        }
        let Some(split) = raw.find('.') else {
            return Err(InvalidEntityId::MissingSeparator(raw));
        };
        if raw[split + 1..].contains('.') {
            return Err(InvalidEntityId::ExtraSeparator(raw));
        }
        if split == 0 || split + 1 == raw.len() {
            return Err(InvalidEntityId::EmptyPart(raw));
        }
        Ok(Self { raw, split })
    }

    /// The part before the separator, e.g. `light`.
    pub fn domain(&self) -> &str {
        &self.raw[..self.split]
    }

    pub fn object_id(&self) -> &str {
        &self.raw[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for EntityId {}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl std::hash::Hash for EntityId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.raw
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for EntityId {
    type Err = InvalidEntityId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = InvalidEntityId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.raw
    }
}

// ── DeviceId / AreaId ───────────────────────────────────────────────

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns `None` for empty or whitespace-only input; otherwise
            /// keeps the text verbatim.
            pub fn parse(raw: impl Into<String>) -> Option<Self> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    None
                } else {
                    Some(Self(raw))
                }
            }

            /// Like [`parse`](Self::parse) but flattens an optional input.
            pub fn parse_opt(raw: Option<String>) -> Option<Self> {
                raw.and_then(Self::parse)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a device, as issued by the device table or registry.
    DeviceId
);

opaque_id!(
    /// Identifier of an area (room), as issued by the area registry.
    AreaId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_splits_domain_on_first_dot() {
        let id = EntityId::parse("light.kitchen").unwrap();
        assert_eq!(id.domain(), "light");
        assert_eq!(id.object_id(), "kitchen");
        assert_eq!(id.to_string(), "light.kitchen");
    }

    #[test]
    fn entity_id_without_separator_is_rejected() {
        assert_eq!(
            EntityId::parse("noDotHere"),
            Err(InvalidEntityId::MissingSeparator("noDotHere".into()))
        );
    }

    #[test]
    fn entity_id_with_two_separators_is_rejected() {
        assert!(matches!(
            EntityId::parse("sensor.a.b"),
            Err(InvalidEntityId::ExtraSeparator(_))
        ));
    }

    #[test]
    fn entity_id_with_empty_parts_is_rejected() {
        assert!(matches!(EntityId::parse(".x"), Err(InvalidEntityId::EmptyPart(_))));
        assert!(matches!(EntityId::parse("x."), Err(InvalidEntityId::EmptyPart(_))));
        assert_eq!(EntityId::parse(""), Err(InvalidEntityId::Empty));
    }

    #[test]
    fn entity_id_serde_round_trips_as_plain_string() {
        let id = EntityId::parse("sensor.temp").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sensor.temp\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<EntityId>("\"bogus\"").is_err());
    }

    #[test]
    fn empty_device_and_area_ids_are_absent() {
        assert!(DeviceId::parse("").is_none());
        assert!(DeviceId::parse("   ").is_none());
        assert!(AreaId::parse_opt(None).is_none());
        assert_eq!(AreaId::parse("living_room").unwrap().as_str(), "living_room");
    }

    #[test]
    fn ids_are_verbatim() {
        let id = DeviceId::parse(" dev1").unwrap();
        assert_eq!(id.as_str(), " dev1");
    }
}
