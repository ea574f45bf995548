use std::io::Write;
use std::path::{Path, PathBuf};

use crate::agent_engine::history::HistoryEntry;
use crate::errors::RoverResult;
use crate::perception::capture::Frame;

/// Debug side channel: frames and ledger entries for one run under
/// `<root>/run<N>`, where N is the number of entries already in `<root>`.
pub struct DebugRecorder {
    run_dir: PathBuf,
}

impl DebugRecorder {
    pub fn create(root: &Path) -> RoverResult<Self> {
        std::fs::create_dir_all(root)?;
        let run_index = std::fs::read_dir(root)?.count();
        let run_dir = root.join(format!("run{run_index}"));
        std::fs::create_dir_all(&run_dir)?;
        tracing::info!(path = %run_dir.display(), "debug recorder ready");
        Ok(Self { run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Writes `<capture-millis>.png`.
    pub fn save_frame(&self, frame: &Frame) -> RoverResult<PathBuf> {
        let path = self
            .run_dir
            .join(format!("{}.png", frame.captured_at.timestamp_millis()));
        std::fs::write(&path, &frame.bytes)?;
        tracing::debug!(path = %path.display(), "debug frame saved");
        Ok(path)
    }

    /// Appends one ledger entry to `ledger.jsonl`.
    pub fn record_entry(&self, entry: &HistoryEntry) -> RoverResult<()> {
        let line = serde_json::to_string(entry)?;
        let path = self.run_dir.join("ledger.jsonl");
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        writeln!(file, "{}", line)?;
        tracing::debug!(path = %path.display(), "ledger entry flushed");
        Ok(())
    }
}
