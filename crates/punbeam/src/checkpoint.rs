use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::models::message::Message;

/// A store of conversation state keyed by thread identifier, enabling
/// multi-turn continuity. The whole history for a thread is rewritten on
/// every save; threads never see each other's messages.
pub trait Checkpointer: Send + Sync {
    /// Load the message history for a thread, empty if the thread is new
    fn load(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Persist the full message history for a thread
    fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()>;
}

/// In-memory checkpointer; state is discarded when the process exits
#[derive(Default)]
pub struct MemoryCheckpointer {
    threads: Mutex<HashMap<String, Vec<Message>>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checkpointer for MemoryCheckpointer {
    fn load(&self, thread_id: &str) -> Result<Vec<Message>> {
        let threads = self
            .threads
            .lock()
            .map_err(|_| anyhow!("checkpointer lock poisoned"))?;
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()> {
        let mut threads = self
            .threads
            .lock()
            .map_err(|_| anyhow!("checkpointer lock poisoned"))?;
        threads.insert(thread_id.to_string(), messages.to_vec());
        Ok(())
    }
}

/// File-backed checkpointer: one JSON-lines file per thread
pub struct FileCheckpointer {
    directory: PathBuf,
}

impl FileCheckpointer {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// Default sessions directory under the user's config dir
    pub fn default_directory() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        let config_dir = home_dir.join(".config").join("punbeam").join("sessions");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir)
    }

    fn thread_file(&self, thread_id: &str) -> PathBuf {
        self.directory.join(format!("{}.jsonl", thread_id))
    }
}

impl Checkpointer for FileCheckpointer {
    fn load(&self, thread_id: &str) -> Result<Vec<Message>> {
        let path = self.thread_file(thread_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&path)?);
        let mut messages = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            messages.push(serde_json::from_str(&line)?);
        }
        Ok(messages)
    }

    fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }

        // Create or truncate, then rewrite the whole history
        let file = fs::File::create(self.thread_file(thread_id))?;
        let mut writer = std::io::BufWriter::new(file);

        for message in messages {
            serde_json::to_writer(&mut writer, message)?;
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> Vec<Message> {
        vec![
            Message::user().with_text("will it rain?"),
            Message::assistant().with_text("cirrus-ly doubtful"),
        ]
    }

    #[test]
    fn test_memory_round_trip_and_isolation() {
        let checkpointer = MemoryCheckpointer::new();
        let history = sample_history();

        checkpointer.save("1", &history).unwrap();
        assert_eq!(checkpointer.load("1").unwrap(), history);

        // Other threads are unaffected
        assert!(checkpointer.load("2").unwrap().is_empty());
    }

    #[test]
    fn test_memory_save_overwrites() {
        let checkpointer = MemoryCheckpointer::new();
        checkpointer.save("1", &sample_history()).unwrap();

        let shorter = vec![Message::user().with_text("hi")];
        checkpointer.save("1", &shorter).unwrap();
        assert_eq!(checkpointer.load("1").unwrap(), shorter);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = FileCheckpointer::new(dir.path().to_path_buf());
        let history = sample_history();

        checkpointer.save("thread-a", &history).unwrap();
        assert_eq!(checkpointer.load("thread-a").unwrap(), history);
        assert!(checkpointer.load("thread-b").unwrap().is_empty());
    }

    #[test]
    fn test_file_load_missing_thread_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = FileCheckpointer::new(dir.path().to_path_buf());
        assert!(checkpointer.load("nope").unwrap().is_empty());
    }
}
