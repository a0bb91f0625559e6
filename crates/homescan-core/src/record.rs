// ── Raw source records ──
//
// The flat shapes every reader hands to the engine. Nothing here is
// validated yet; see `normalize`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStateRecord {
    pub entity_id: String,
    #[serde(default)]
    pub state: String,
    /// Raw JSON payload; expected to be a mapping or `null`.
    #[serde(default)]
    pub attributes: Value,
}

/// One row of the device table or device registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub area_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
}

/// One entry of the area registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub area_id: String,
    pub name: String,
}

/// Raw automation or script source, scanned for entity references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationText {
    /// Where the text came from (usually a file path).
    pub origin: String,
    pub text: String,
}

impl EntityStateRecord {
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>, attributes: Value) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes,
        }
    }
}

impl AreaRecord {
    pub fn new(area_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            area_id: area_id.into(),
            name: name.into(),
        }
    }
}

impl DeviceRecord {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
