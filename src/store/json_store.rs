use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::{FeedbackEntry, FeedbackLog};

const FEEDBACK_FILE: &str = "feedback.json";

pub struct FeedbackStore {
    base_dir: PathBuf,
}

impl FeedbackStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("ignoring unreadable {}: {e}", path.display());
                self.set_aside(name);
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    /// Keeps a file we cannot use as `<name>.bak` so the next save does
    /// not destroy it.
    fn set_aside(&self, name: &str) {
        let path = self.file_path(name);
        let backup = self.file_path(&format!("{name}.bak"));
        match fs::rename(&path, &backup) {
            Ok(()) => warn!("moved {} to {}", path.display(), backup.display()),
            Err(e) => warn!("could not back up {}: {e}", path.display()),
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Stale schema versions are set aside rather than migrated.
    pub fn load_feedback(&self) -> FeedbackLog {
        let log: FeedbackLog = self.load(FEEDBACK_FILE);
        if log.needs_reset() {
            warn!("feedback log has schema version {}", log.schema_version);
            self.set_aside(FEEDBACK_FILE);
            FeedbackLog::default()
        } else {
            log
        }
    }

    pub fn append_feedback(&self, entry: FeedbackEntry) -> Result<()> {
        let mut log = self.load_feedback();
        log.push(entry);
        self.save(FEEDBACK_FILE, &log)
    }
}
