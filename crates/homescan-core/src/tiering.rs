// ── Storage tiering advisor ──
//
// Classifies block devices reported by the storage inventory and maps each
// class to a static workload profile. Independent of the entity graph.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// One block device (or partition) as reported by the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDevice {
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    /// `disk`, `part`, `rom`... as reported by `lsblk`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub filesystem: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub children: Vec<StorageDevice>,
    #[serde(default)]
    pub health: Option<HealthInfo>,
    /// Usage hints found under the mountpoint (`backups`, `media`...).
    #[serde(default)]
    pub usage: Vec<String>,
}

/// Fields picked from the vendor health tool (`smartctl -i`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub model_family: Option<String>,
    pub capacity: Option<String>,
    pub sector_size: Option<String>,
    pub rotation_rate: Option<String>,
}

impl StorageDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mounted_at(mut self, mountpoint: impl Into<String>) -> Self {
        self.mountpoint = Some(mountpoint.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_rotation_rate(mut self, rate: impl Into<String>) -> Self {
        self.health.get_or_insert_with(HealthInfo::default).rotation_rate = Some(rate.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: StorageDevice) -> Self {
        self.children.push(child);
        self
    }

    /// This node followed by every descendant, depth first. Partitions are
    /// reported without model or health data, so a descendant missing either
    /// takes the nearest ancestor's.
    pub fn flatten(&self) -> Vec<Cow<'_, StorageDevice>> {
        let mut out = Vec::new();
        self.flatten_into(None, None, &mut out);
        out
    }

    fn flatten_into<'a>(
        &'a self,
        model: Option<&'a str>,
        health: Option<&'a HealthInfo>,
        out: &mut Vec<Cow<'a, StorageDevice>>,
    ) {
        let inherits = (self.model.is_none() && model.is_some())
            || (self.health.is_none() && health.is_some());
        if inherits {
            out.push(Cow::Owned(StorageDevice {
                name: self.name.clone(),
                size: self.size.clone(),
                kind: self.kind.clone(),
                mountpoint: self.mountpoint.clone(),
                filesystem: self.filesystem.clone(),
                model: self.model.clone().or_else(|| model.map(str::to_owned)),
                children: Vec::new(),
                health: self.health.clone().or_else(|| health.cloned()),
                usage: self.usage.clone(),
            }));
        } else {
            out.push(Cow::Borrowed(self));
        }

        let model = self.model.as_deref().or(model);
        let health = self.health.as_ref().or(health);
        for child in &self.children {
            child.flatten_into(model, health, out);
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceClass {
    RemovableFlash,
    Nvme,
    SolidState,
    Rotational,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    VeryHigh,
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Durability {
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Workload {
    RecorderDatabase,
    MediaFiles,
    CameraRecordings,
    ContainerVolumes,
    TtsCache,
    CoreSystem,
    Configuration,
    Containers,
    LargeMedia,
    Backups,
    LongTermBackups,
    Logs,
    MediaArchive,
    ContainerSystemFiles,
}

/// Static placement advice for one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierProfile {
    pub class: DeviceClass,
    pub tier: Tier,
    pub speed_estimate: &'static str,
    pub durability: Durability,
    pub recommended: &'static [Workload],
    pub avoid: &'static [Workload],
    pub notes: &'static str,
}

const REMOVABLE_FLASH: TierProfile = TierProfile {
    class: DeviceClass::RemovableFlash,
    tier: Tier::Low,
    speed_estimate: "50-100 MB/s",
    durability: Durability::Low,
    recommended: &[Workload::Backups, Workload::Logs],
    avoid: &[
        Workload::RecorderDatabase,
        Workload::MediaFiles,
        Workload::ContainerVolumes,
    ],
    notes: "limited write endurance, keep writes to a minimum",
};

const NVME: TierProfile = TierProfile {
    class: DeviceClass::Nvme,
    tier: Tier::VeryHigh,
    speed_estimate: "2000-7000 MB/s",
    durability: Durability::High,
    recommended: &[
        Workload::RecorderDatabase,
        Workload::MediaFiles,
        Workload::CameraRecordings,
        Workload::ContainerVolumes,
        Workload::TtsCache,
    ],
    avoid: &[Workload::Backups, Workload::Logs],
    notes: "best fit for high-IO data",
};

const SOLID_STATE: TierProfile = TierProfile {
    class: DeviceClass::SolidState,
    tier: Tier::High,
    speed_estimate: "400-600 MB/s",
    durability: Durability::Medium,
    recommended: &[
        Workload::CoreSystem,
        Workload::Configuration,
        Workload::Containers,
    ],
    avoid: &[Workload::LargeMedia, Workload::CameraRecordings],
    notes: "good performance for system files",
};

const ROTATIONAL: TierProfile = TierProfile {
    class: DeviceClass::Rotational,
    tier: Tier::Medium,
    speed_estimate: "80-160 MB/s",
    durability: Durability::High,
    recommended: &[
        Workload::LongTermBackups,
        Workload::MediaArchive,
        Workload::CameraRecordings,
    ],
    avoid: &[Workload::RecorderDatabase, Workload::ContainerSystemFiles],
    notes: "slow access, suited to rarely written data",
};

const UNKNOWN: TierProfile = TierProfile {
    class: DeviceClass::Unknown,
    tier: Tier::Unknown,
    speed_estimate: "unknown",
    durability: Durability::Unknown,
    recommended: &[],
    avoid: &[],
    notes: "device type could not be determined",
};

impl DeviceClass {
    pub fn profile(self) -> &'static TierProfile {
        match self {
            Self::RemovableFlash => &REMOVABLE_FLASH,
            Self::Nvme => &NVME,
            Self::SolidState => &SOLID_STATE,
            Self::Rotational => &ROTATIONAL,
            Self::Unknown => &UNKNOWN,
        }
    }
}

// ── Classification ───────────────────────────────────────────────────

/// Classify a device by ordered criteria; the first match wins.
pub fn classify(device: &StorageDevice) -> DeviceClass {
    let name = device.name.to_lowercase();
    let model = device.model.as_deref().unwrap_or_default().to_lowercase();

    if name.contains("mmcblk") || device.mountpoint.as_deref() == Some("/boot") {
        return DeviceClass::RemovableFlash;
    }
    if name.contains("nvme") || model.contains("nvme") {
        return DeviceClass::Nvme;
    }
    if let Some(rate) = device.health.as_ref().and_then(|h| h.rotation_rate.as_deref()) {
        let rate = rate.to_lowercase();
        if rate.contains("solid state") {
            return DeviceClass::SolidState;
        }
        if rate.contains("rpm") {
            return DeviceClass::Rotational;
        }
    }
    if name.starts_with("hd") {
        return DeviceClass::Rotational;
    }
    if name.starts_with("sd") || model.contains("usb") {
        return DeviceClass::SolidState;
    }
    DeviceClass::Unknown
}

// ── Recommendations ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub device: String,
    pub class: DeviceClass,
    pub tier: Tier,
    pub mountpoint: String,
    pub current_usage: Vec<String>,
    pub recommended: &'static [Workload],
    pub avoid: &'static [Workload],
    pub notes: &'static str,
}

/// One recommendation per mounted node whose class is known.
pub fn recommend(devices: &[StorageDevice]) -> Vec<Recommendation> {
    devices
        .iter()
        .flat_map(StorageDevice::flatten)
        .filter_map(|node| {
            let mountpoint = node.mountpoint.as_deref().filter(|m| !m.is_empty())?;
            let class = classify(&node);
            if class == DeviceClass::Unknown {
                return None;
            }
            let profile = class.profile();
            Some(Recommendation {
                device: node.name.clone(),
                class,
                tier: profile.tier,
                mountpoint: mountpoint.to_owned(),
                current_usage: node.usage.clone(),
                recommended: profile.recommended,
                avoid: profile.avoid,
                notes: profile.notes,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    RemovableFlashPresent,
    NoNvme,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RemovableFlashPresent => {
                "removable flash detected: use it for backups only, its write endurance is limited"
            }
            Self::NoNvme => "no NVMe drive detected: consider one for the recorder database",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountSummary {
    pub device: String,
    pub class: DeviceClass,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupAssessment {
    /// Top-level devices only.
    pub total_devices: usize,
    pub classes: BTreeMap<DeviceClass, usize>,
    /// Every mounted node, partitions included.
    pub mountpoints: BTreeMap<String, MountSummary>,
    pub advisories: Vec<Advisory>,
}

impl SetupAssessment {
    pub fn count(&self, class: DeviceClass) -> usize {
        self.classes.get(&class).copied().unwrap_or(0)
    }
}

pub fn assess_setup(devices: &[StorageDevice]) -> SetupAssessment {
    let mut classes: BTreeMap<DeviceClass, usize> =
        DeviceClass::iter().map(|c| (c, 0)).collect();
    for device in devices {
        *classes.entry(classify(device)).or_insert(0) += 1;
    }

    let mountpoints = devices
        .iter()
        .flat_map(StorageDevice::flatten)
        .filter_map(|node| {
            let mp = node.mountpoint.clone().filter(|m| !m.is_empty())?;
            Some((
                mp,
                MountSummary {
                    device: node.name.clone(),
                    class: classify(&node),
                    size: node.size.clone(),
                },
            ))
        })
        .collect();

    let mut setup = SetupAssessment {
        total_devices: devices.len(),
        classes,
        mountpoints,
        advisories: Vec::new(),
    };
    if setup.count(DeviceClass::RemovableFlash) > 0 {
        setup.advisories.push(Advisory::RemovableFlashPresent);
    }
    if setup.count(DeviceClass::Nvme) == 0 {
        setup.advisories.push(Advisory::NoNvme);
    }
    setup
}

// ── Migration plan ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationStep {
    pub step: u8,
    pub title: &'static str,
    pub actions: &'static [&'static str],
}

const MIGRATION_PLAN: [MigrationStep; 3] = [
    MigrationStep {
        step: 1,
        title: "Prepare the NVMe drive",
        actions: &[
            "Format the NVMe drive as ext4: sudo mkfs.ext4 /dev/nvme0n1",
            "Create a mount point: sudo mkdir -p /mnt/nvme",
            "Add the mount to /etc/fstab",
            "Create the layout: /mnt/nvme/{hass_data,media,recordings,backups}",
        ],
    },
    MigrationStep {
        step: 2,
        title: "Move the recorder database to NVMe",
        actions: &[
            "Stop Home Assistant: docker stop home-assistant",
            "Back up the current database",
            "Point the recorder db_url at the NVMe mount (or use an external database)",
            "Fix ownership: sudo chown -R $USER:$USER /mnt/nvme/hass_data",
        ],
    },
    MigrationStep {
        step: 3,
        title: "Repurpose the SD card for backups",
        actions: &[
            "Create the layout: /mnt/sdcard/{backups/daily,backups/weekly,logs/archive}",
            "Schedule automatic backups to the SD card",
            "Move old logs to the SD card",
            "Add a cron job for periodic cleanup",
        ],
    },
];

pub fn migration_plan() -> &'static [MigrationStep] {
    &MIGRATION_PLAN
}
