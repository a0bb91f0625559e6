// ── Block-device inventory ──
//
// `lsblk -J` for the device tree, `smartctl -i` for the rotation rate and
// a directory peek under each mountpoint for usage hints. Every external
// call runs under a timeout; an expired or failing call means "no data".

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use homescan_core::tiering::HealthInfo;
use homescan_core::{RecordSource, SourceError, SourceTag, StorageDevice};

const LSBLK_COLUMNS: &str = "NAME,SIZE,TYPE,MOUNTPOINT,FSTYPE,LABEL,MODEL";

#[derive(Debug, Clone)]
pub struct InventoryOptions {
    pub timeout: Duration,
    /// Query the vendor health tool for each disk.
    pub smartctl: bool,
    pub lsblk_program: String,
    pub smartctl_program: String,
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            smartctl: true,
            lsblk_program: "lsblk".into(),
            smartctl_program: "smartctl".into(),
        }
    }
}

// ── lsblk parsing ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

/// `lsblk` output differs between versions: `mountpoint` vs `mountpoints`,
/// size as a string or (with `-b`) a number.
#[derive(Debug, Deserialize)]
struct LsblkDevice {
    name: String,
    #[serde(default)]
    size: Value,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    mountpoint: Option<String>,
    #[serde(default)]
    mountpoints: Vec<Option<String>>,
    #[serde(default)]
    fstype: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    children: Vec<LsblkDevice>,
}

impl From<LsblkDevice> for StorageDevice {
    fn from(d: LsblkDevice) -> Self {
        let mountpoint = d
            .mountpoint
            .or_else(|| d.mountpoints.into_iter().flatten().next())
            .filter(|m| !m.is_empty());
        let size = match d.size {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        Self {
            name: d.name,
            size,
            kind: d.kind,
            mountpoint,
            filesystem: d.fstype,
            model: d.model.map(|m| m.trim().to_owned()).filter(|m| !m.is_empty()),
            children: d.children.into_iter().map(Self::from).collect(),
            health: None,
            usage: Vec::new(),
        }
    }
}

pub fn parse_lsblk(json: &str) -> Result<Vec<StorageDevice>, serde_json::Error> {
    let out: LsblkOutput = serde_json::from_str(json)?;
    Ok(out.blockdevices.into_iter().map(StorageDevice::from).collect())
}

// ── smartctl parsing ─────────────────────────────────────────────────

/// Pick the interesting `Key: value` lines of `smartctl -i`.
pub fn parse_smartctl(text: &str) -> HealthInfo {
    let mut info = HealthInfo::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = Some(value.trim().to_owned()).filter(|v| !v.is_empty());
        match key.trim() {
            "Model Family" => info.model_family = value,
            "User Capacity" => info.capacity = value,
            "Sector Size" | "Sector Sizes" => info.sector_size = value,
            "Rotation Rate" => info.rotation_rate = value,
            _ => {}
        }
    }
    info
}

// ── Usage probe ──────────────────────────────────────────────────────

/// Well-known top-level directory names under a mountpoint.
pub fn probe_usage(mountpoint: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(mountpoint) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %mountpoint.display(), error = %e, "cannot inspect mountpoint");
            return Vec::new();
        }
    };
    let mut usage: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| {
            let hint = match e.file_name().to_str()? {
                "backups" | "backup" => "backups",
                "media" | "www" => "media",
                "config" | "configuration" => "configuration",
                "logs" | "log" => "logs",
                _ => return None,
            };
            Some(hint.to_owned())
        })
        .collect();
    usage.sort();
    usage.dedup();
    usage
}

// ── Collection ───────────────────────────────────────────────────────

/// Run a program to completion within `timeout` and return its stdout.
pub async fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, SourceError> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => {
            return Err(SourceError::Timeout {
                what: program.to_owned(),
                timeout_secs: timeout.as_secs(),
            });
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::missing(program, "PATH"));
        }
        Ok(Err(e)) => return Err(SourceError::unreadable(program, e)),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::unreadable(
            program,
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Full inventory: device tree, health data for whole disks (flash cards
/// excluded) and usage hints for every mounted node.
pub async fn collect_inventory(opts: &InventoryOptions) -> Result<Vec<StorageDevice>, SourceError> {
    let json = run_with_timeout(&opts.lsblk_program, &["-J", "-o", LSBLK_COLUMNS], opts.timeout).await?;
    let mut devices = parse_lsblk(&json).map_err(|e| SourceError::format("lsblk output", e))?;

    if opts.smartctl {
        for device in &mut devices {
            if device.name.starts_with("mmc") {
                continue;
            }
            let dev_path = format!("/dev/{}", device.name);
            match run_with_timeout(&opts.smartctl_program, &["-i", &dev_path], opts.timeout).await {
                Ok(text) => device.health = Some(parse_smartctl(&text)),
                Err(e) => tracing::debug!(device = %device.name, error = %e, "no health data"),
            }
        }
    }

    for device in &mut devices {
        fill_usage(device);
    }
    tracing::debug!(devices = devices.len(), "collected storage inventory");
    Ok(devices)
}

fn fill_usage(device: &mut StorageDevice) {
    if let Some(mp) = device.mountpoint.as_deref() {
        device.usage = probe_usage(Path::new(mp));
    }
    for child in &mut device.children {
        fill_usage(child);
    }
}

// ── Saved lsblk output ───────────────────────────────────────────────

/// A previously captured `lsblk -J` document.
#[derive(Debug, Clone)]
pub struct LsblkFile {
    path: PathBuf,
}

impl LsblkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for LsblkFile {
    type Record = StorageDevice;

    fn tag(&self) -> SourceTag {
        SourceTag::StorageInventory
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Vec<StorageDevice>, SourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::missing("lsblk output", self.path.display())
            } else {
                SourceError::unreadable(self.describe(), e)
            }
        })?;
        parse_lsblk(&text).map_err(|e| SourceError::format(self.describe(), e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use homescan_core::{DeviceClass, classify};
    use pretty_assertions::assert_eq;

    const PI_LSBLK: &str = r#"{
       "blockdevices": [
          {"name": "mmcblk0", "size": "29.7G", "type": "disk", "mountpoint": null,
           "fstype": null, "label": null, "model": null,
           "children": [
              {"name": "mmcblk0p1", "size": "256M", "type": "part", "mountpoint": "/boot",
               "fstype": "vfat", "label": "bootfs", "model": null},
              {"name": "mmcblk0p2", "size": "29.5G", "type": "part", "mountpoint": "/",
               "fstype": "ext4", "label": "rootfs", "model": null}
           ]
          },
          {"name": "nvme0n1", "size": 512110190592, "type": "disk",
           "mountpoints": [null], "model": "Samsung SSD 980 PRO 500GB  ",
           "children": [
              {"name": "nvme0n1p1", "size": "476.9G", "type": "part",
               "mountpoints": ["/mnt/nvme"], "fstype": "ext4"}
           ]
          }
       ]
    }"#;

    #[test]
    fn parses_both_lsblk_layouts() {
        let devices = parse_lsblk(PI_LSBLK).unwrap();
        assert_eq!(devices.len(), 2);

        let sd = &devices[0];
        assert_eq!(sd.mountpoint, None);
        assert_eq!(sd.children[0].mountpoint.as_deref(), Some("/boot"));
        assert_eq!(sd.children[0].filesystem.as_deref(), Some("vfat"));

        let nvme = &devices[1];
        assert_eq!(nvme.size.as_deref(), Some("512110190592"));
        assert_eq!(nvme.mountpoint, None);
        assert_eq!(nvme.model.as_deref(), Some("Samsung SSD 980 PRO 500GB"));
        assert_eq!(nvme.children[0].mountpoint.as_deref(), Some("/mnt/nvme"));
        assert_eq!(classify(nvme), DeviceClass::Nvme);
    }

    #[test]
    fn empty_lsblk_document() {
        assert!(parse_lsblk("{}").unwrap().is_empty());
        assert!(parse_lsblk("not json").is_err());
    }

    #[test]
    fn parses_smartctl_information_section() {
        let text = "\
smartctl 7.3 2022-02-28 r5338 [aarch64-linux-6.1.21-v8+] (local build)

=== START OF INFORMATION SECTION ===
Model Family:     Western Digital Blue
Device Model:     WDC WD10EZEX-08WN4A0
User Capacity:    1,000,204,886,016 bytes [1.00 TB]
Sector Sizes:     512 bytes logical, 4096 bytes physical
Rotation Rate:    7200 rpm
";
        let info = parse_smartctl(text);
        assert_eq!(info.model_family.as_deref(), Some("Western Digital Blue"));
        assert_eq!(info.capacity.as_deref(), Some("1,000,204,886,016 bytes [1.00 TB]"));
        assert_eq!(info.sector_size.as_deref(), Some("512 bytes logical, 4096 bytes physical"));
        assert_eq!(info.rotation_rate.as_deref(), Some("7200 rpm"));
    }

    #[test]
    fn usage_probe_recognises_known_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["backup", "backups", "media", "random"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("logs"), "not a dir").unwrap();
        assert_eq!(probe_usage(dir.path()), vec!["backups".to_owned(), "media".to_owned()]);
        assert!(probe_usage(Path::new("/nonexistent/mount")).is_empty());
    }

    #[test]
    fn lsblk_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lsblk.json");
        std::fs::write(&path, PI_LSBLK).unwrap();
        let source = LsblkFile::new(&path);
        assert_eq!(source.tag(), SourceTag::StorageInventory);
        assert_eq!(source.read().unwrap().len(), 2);
        assert!(matches!(
            LsblkFile::new(dir.path().join("nope.json")).read(),
            Err(SourceError::Missing { .. })
        ));
    }

    #[tokio::test]
    async fn missing_program_is_reported_as_missing() {
        let err = run_with_timeout("homescan-no-such-program", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Missing { .. }));
    }

    #[tokio::test]
    async fn slow_program_times_out() {
        let err = run_with_timeout("sleep", &["5"], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Timeout { .. }));
    }
}
