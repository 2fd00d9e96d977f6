// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock loaders and fixtures shared by the integration tests.

use cfgtree::domain::{ConfigError, Result, Value};
use cfgtree::ports::{Files, Loader, RegisterHook};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A mock loader that parses `key=value` lines into a flat struct.
///
/// Every file handed to one `load` call contributes to the same struct, in path
/// order. Lines whose value parses as an integer become numbers.
#[derive(Debug)]
pub struct MockLoader {
    allow_dir: bool,
    pattern: Option<Regex>,
    reject_registration: bool,
    loads: AtomicUsize,
    clears: AtomicUsize,
    seen: Mutex<Vec<Vec<PathBuf>>>,
}

#[allow(dead_code)]
impl MockLoader {
    /// Creates a loader that only accepts single files.
    pub fn new() -> Self {
        Self {
            allow_dir: false,
            pattern: None,
            reject_registration: false,
            loads: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Accepts directories.
    pub fn allowing_dirs(mut self) -> Self {
        self.allow_dir = true;
        self
    }

    /// Filters directory entries by `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(Regex::new(pattern).unwrap());
        self
    }

    /// Makes the registration hook fail.
    pub fn rejecting_registration(mut self) -> Self {
        self.reject_registration = true;
        self
    }

    /// Number of `load` calls so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `clear` calls so far.
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// The file sets handed to each `load` call.
    pub fn seen(&self) -> Vec<Vec<PathBuf>> {
        self.seen.lock().unwrap().clone()
    }
}

impl RegisterHook for MockLoader {
    fn on_register(&self) -> Result<()> {
        if self.reject_registration {
            return Err(ConfigError::DecodeError {
                message: "mock loader refuses registration".to_string(),
            });
        }
        Ok(())
    }
}

impl Loader for MockLoader {
    fn loader_type(&self) -> &str {
        "mock"
    }

    fn allow_dir(&self) -> bool {
        self.allow_dir
    }

    fn path_pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    fn load(&self, _path: &Path, files: &Files) -> Result<Value> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push(files.keys().cloned().collect());

        let mut entries = Vec::new();
        for content in files.values() {
            let text = String::from_utf8_lossy(content);
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::ParseError {
                    message: format!("expected key=value, got '{}'", line),
                    source: None,
                })?;
                let value = match value.trim().parse::<i64>() {
                    Ok(n) => Value::from(n),
                    Err(_) => Value::from(value.trim()),
                };
                entries.push((key.trim().to_string(), value));
            }
        }
        Ok(Value::from_entries(entries))
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn register_hook(&self) -> Option<&dyn RegisterHook> {
        Some(self)
    }
}

/// Writes `content` to `dir/name`, creating parent directories.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Routes `tracing` output through the test harness so it shows up for failing tests.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
