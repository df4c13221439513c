//! Bounded command history with on-disk persistence.

use crate::registry::Registry;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Default number of history entries kept in memory and on disk.
pub const DEFAULT_HISTORY_MAX: usize = 4096;

/// Insertion-ordered history lines keyed by a sequence number.
///
/// Sequence numbers always run contiguously from 1: once the bound is exceeded the
/// oldest entries are evicted and the survivors renumbered.
#[derive(Debug, Clone)]
pub struct History {
    entries: Registry<usize, String>,
    max: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_MAX)
    }
}

impl History {
    pub fn new(max: usize) -> Self {
        Self {
            entries: Registry::new(),
            max,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a line, evicting the oldest entries if the bound is exceeded.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.append(self.entries.len() + 1, line.into());
        if self.entries.len() > self.max {
            while self.entries.len() > self.max {
                self.entries.remove_at(0);
            }
            self.renumber();
        }
    }

    /// `(sequence_number, line)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .map(|node| (node.key, node.value.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn renumber(&mut self) {
        for (i, node) in self.entries.iter_mut().enumerate() {
            node.key = i + 1;
        }
    }

    /// Append every non-empty line of the file at `path`.
    ///
    /// A missing file is not an error: a first session simply starts empty.
    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                self.push(line);
            }
        }
        Ok(())
    }

    /// Rewrite the file at `path` with the current entries, one per line.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        for (_, line) in self.iter() {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}
