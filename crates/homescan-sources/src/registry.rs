// ── Registry file readers ──
//
// `.storage/core.area_registry` and `.storage/core.device_registry` are
// JSON documents of the form `{"version": .., "data": {...}}`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use homescan_core::{AreaRecord, DeviceRecord, RecordSource, SourceError, SourceTag};

pub const AREA_REGISTRY_PATH: &str = ".storage/core.area_registry";
pub const DEVICE_REGISTRY_PATH: &str = ".storage/core.device_registry";

#[derive(Debug, Deserialize)]
struct RegistryFile<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct AreaData {
    #[serde(default)]
    areas: Vec<AreaEntry>,
}

/// Older registries key areas by `area_id`, newer ones by `id`.
#[derive(Debug, Deserialize)]
struct AreaEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    area_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceData {
    #[serde(default)]
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name_by_user: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    area_id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
}

/// Parse an area registry document. Entries without any id are passed on
/// with an empty id so the normalizer reports them.
pub fn parse_area_registry(json: &str) -> Result<Vec<AreaRecord>, serde_json::Error> {
    let file: RegistryFile<AreaData> = serde_json::from_str(json)?;
    Ok(file
        .data
        .areas
        .into_iter()
        .map(|a| AreaRecord {
            area_id: a.id.or(a.area_id).unwrap_or_default(),
            name: a.name.unwrap_or_default(),
        })
        .collect())
}

/// Parse a device registry document. The user-assigned name wins over the
/// integration-provided one.
pub fn parse_device_registry(json: &str) -> Result<Vec<DeviceRecord>, serde_json::Error> {
    let file: RegistryFile<DeviceData> = serde_json::from_str(json)?;
    Ok(file
        .data
        .devices
        .into_iter()
        .map(|d| DeviceRecord {
            device_id: d.id.unwrap_or_default(),
            name: d.name_by_user.filter(|n| !n.trim().is_empty()).or(d.name),
            area_id: d.area_id,
            model: d.model,
            manufacturer: d.manufacturer,
        })
        .collect())
}

fn read_file(what: &str, path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::missing(what, path.display())
        } else {
            SourceError::unreadable(format!("{what} {}", path.display()), e)
        }
    })
}

// ── Record sources ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AreaRegistry {
    path: PathBuf,
}

impl AreaRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_config_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(AREA_REGISTRY_PATH))
    }
}

impl RecordSource for AreaRegistry {
    type Record = AreaRecord;

    fn tag(&self) -> SourceTag {
        SourceTag::AreaRegistry
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Vec<AreaRecord>, SourceError> {
        let text = read_file("area registry", &self.path)?;
        let areas = parse_area_registry(&text)
            .map_err(|e| SourceError::format(self.describe(), e))?;
        tracing::debug!(path = %self.path.display(), areas = areas.len(), "read area registry");
        Ok(areas)
    }
}

#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    path: PathBuf,
}

impl DeviceRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_config_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(DEVICE_REGISTRY_PATH))
    }
}

impl RecordSource for DeviceRegistry {
    type Record = DeviceRecord;

    fn tag(&self) -> SourceTag {
        SourceTag::DeviceRegistry
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Vec<DeviceRecord>, SourceError> {
        let text = read_file("device registry", &self.path)?;
        let devices = parse_device_registry(&text)
            .map_err(|e| SourceError::format(self.describe(), e))?;
        tracing::debug!(path = %self.path.display(), devices = devices.len(), "read device registry");
        Ok(devices)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn area_registry_accepts_id_and_area_id() {
        let json = r#"{
            "version": 1,
            "minor_version": 6,
            "key": "core.area_registry",
            "data": {
                "areas": [
                    {"id": "living_room", "name": "Living Room", "aliases": []},
                    {"area_id": "kitchen", "name": "Kitchen"},
                    {"name": "Nameless"}
                ]
            }
        }"#;
        let areas = parse_area_registry(json).unwrap();
        assert_eq!(
            areas,
            vec![
                AreaRecord::new("living_room", "Living Room"),
                AreaRecord::new("kitchen", "Kitchen"),
                AreaRecord::new("", "Nameless"),
            ]
        );
    }

    #[test]
    fn device_registry_prefers_user_name() {
        let json = r#"{
            "data": {
                "devices": [
                    {"id": "d1", "name": "Hue bulb", "name_by_user": "Desk lamp",
                     "area_id": "office", "model": "LCT015", "manufacturer": "Signify"},
                    {"id": "d2", "name": "Plug", "name_by_user": null, "area_id": null}
                ],
                "deleted_devices": []
            }
        }"#;
        let devices = parse_device_registry(json).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name.as_deref(), Some("Desk lamp"));
        assert_eq!(devices[0].area_id.as_deref(), Some("office"));
        assert_eq!(devices[0].manufacturer.as_deref(), Some("Signify"));
        assert_eq!(devices[1].name.as_deref(), Some("Plug"));
        assert_eq!(devices[1].area_id, None);
    }

    #[test]
    fn missing_data_key_is_an_error() {
        assert!(parse_area_registry(r#"{"areas": []}"#).is_err());
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = AreaRegistry::in_config_dir(dir.path()).read().unwrap_err();
        assert!(matches!(err, SourceError::Missing { .. }));
    }

    #[test]
    fn reads_registry_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".storage")).unwrap();
        std::fs::write(
            dir.path().join(DEVICE_REGISTRY_PATH),
            r#"{"data": {"devices": [{"id": "d1", "name": "Plug"}]}}"#,
        )
        .unwrap();
        let source = DeviceRegistry::in_config_dir(dir.path());
        assert_eq!(source.tag(), SourceTag::DeviceRegistry);
        assert_eq!(source.read().unwrap().len(), 1);
    }
}
