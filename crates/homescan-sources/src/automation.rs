// ── Automation file reader ──

use std::path::{Path, PathBuf};

use homescan_core::{AutomationText, RecordSource, SourceError, SourceTag};

/// Files scanned for entity references when none are configured.
pub const DEFAULT_AUTOMATION_FILES: &[&str] =
    &["automations.yaml", "scripts.yaml", "configuration.yaml"];

/// Automation and script files under a configuration directory. Files that
/// do not exist are skipped; a file that exists but cannot be read fails
/// the whole source.
#[derive(Debug, Clone)]
pub struct AutomationFiles {
    config_dir: PathBuf,
    files: Vec<String>,
}

impl AutomationFiles {
    pub fn new(config_dir: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            files,
        }
    }

    pub fn with_defaults(config_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            config_dir,
            DEFAULT_AUTOMATION_FILES.iter().map(|f| (*f).to_owned()).collect(),
        )
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

impl RecordSource for AutomationFiles {
    type Record = AutomationText;

    fn tag(&self) -> SourceTag {
        SourceTag::AutomationScan
    }

    fn describe(&self) -> String {
        format!("automation files in {}", self.config_dir.display())
    }

    fn read(&self) -> Result<Vec<AutomationText>, SourceError> {
        let mut texts = Vec::new();
        for file in &self.files {
            let path = self.resolve(file);
            match std::fs::read(&path) {
                Ok(bytes) => texts.push(AutomationText {
                    origin: path.display().to_string(),
                    text: String::from_utf8_lossy(&bytes).into_owned(),
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "automation file not present");
                }
                Err(e) => return Err(SourceError::unreadable(path.display().to_string(), e)),
            }
        }
        Ok(texts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scripts.yaml"), "entity_id: light.a\n").unwrap();

        let texts = AutomationFiles::with_defaults(dir.path()).read().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].origin.ends_with("scripts.yaml"));
        assert_eq!(texts[0].text, "entity_id: light.a\n");
    }

    #[test]
    fn absolute_paths_are_used_as_given() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let file = elsewhere.path().join("packages.yaml");
        std::fs::write(&file, "x: 1").unwrap();

        let source = AutomationFiles::new(dir.path(), vec![file.display().to_string()]);
        assert_eq!(source.read().unwrap().len(), 1);
    }

    #[test]
    fn invalid_utf8_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"# caf\xe9\n".to_vec();
        bytes.extend_from_slice(b"entity_id: light.porch\n");
        std::fs::write(dir.path().join("automations.yaml"), bytes).unwrap();

        let texts = AutomationFiles::with_defaults(dir.path()).read().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].text.contains("entity_id: light.porch"));
        assert!(texts[0].text.contains('\u{FFFD}'));
    }
}
