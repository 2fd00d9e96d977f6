// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path resolution for configuration loads.
//!
//! Turns a user-supplied path into the set of files a [`Loader`] builds its tree from:
//! the path is cleaned and inspected, a directory is listed recursively and filtered by
//! the loader's pattern, and every selected file is read into memory before the loader
//! runs. Every failure is reported with the path it concerns.

use crate::domain::{ConfigError, Result, Value};
use crate::ports::{Files, Loader};
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Maximum size of a single configuration file (10 MiB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Resolves `path` and hands the selected files to `loader`.
///
/// The resulting tree is returned to the caller and not installed anywhere.
///
/// # Errors
///
/// - [`ConfigError::PathUndefined`] if the path is empty after trimming
/// - [`ConfigError::PathNotFound`] if the path does not exist
/// - [`ConfigError::PathUnavailable`] if the path cannot be inspected
/// - [`ConfigError::PathNotFile`] if the path is a directory and the loader only
///   accepts single files
/// - [`ConfigError::PathNoContent`] if no file was selected, or the single file is blank
/// - [`ConfigError::FileTooLarge`] if a file exceeds [`MAX_CONFIG_FILE_SIZE`]
/// - any error returned by the loader
///
/// Every error except `PathUndefined` is wrapped in [`ConfigError::AtPath`].
pub fn load_from_path(loader: &dyn Loader, path: impl AsRef<Path>) -> Result<Value> {
    let path = clean_path(path.as_ref()).ok_or(ConfigError::PathUndefined)?;

    let metadata = fs::metadata(&path).map_err(|e| stat_error(e).at_path(&path))?;

    let files = if metadata.is_dir() {
        if !loader.allow_dir() {
            return Err(ConfigError::PathNotFile.at_path(&path));
        }
        collect_files(&path, loader)?
    } else {
        read_single_file(&path, metadata.len())?
    };

    tracing::debug!(
        "Loading {} file(s) from '{}' with the {} loader",
        files.len(),
        path.display(),
        loader.loader_type()
    );

    loader.load(&path, &files).map_err(|e| e.at_path(&path))
}

/// Trims surrounding whitespace and lexically cleans a path.
///
/// `.` components are dropped and `..` components cancel the preceding named
/// component. Returns `None` for an empty path.
///
/// ```
/// use cfgtree::service::clean_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(clean_path(Path::new(" conf/./app/../app.yaml ")), Some(PathBuf::from("conf/app.yaml")));
/// assert_eq!(clean_path(Path::new("/../etc")), Some(PathBuf::from("/etc")));
/// assert_eq!(clean_path(Path::new("a/..")), Some(PathBuf::from(".")));
/// assert_eq!(clean_path(Path::new("   ")), None);
/// ```
pub fn clean_path(path: &Path) -> Option<PathBuf> {
    let trimmed = match path.to_str() {
        Some(s) => Path::new(s.trim()),
        None => path,
    };
    if trimmed.as_os_str().is_empty() {
        return None;
    }

    let mut cleaned = PathBuf::new();
    for component in trimmed.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    Some(cleaned)
}

/// Returns the OS-appropriate configuration directory for an application.
///
/// # Examples
///
/// ```rust,no_run
/// use cfgtree::service::default_config_dir;
///
/// let dir = default_config_dir("myapp", "com.example").unwrap();
/// println!("{}", dir.display());
/// ```
pub fn default_config_dir(app_name: &str, qualifier: &str) -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or(ConfigError::PathUndefined)?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

fn stat_error(e: io::Error) -> ConfigError {
    match e.kind() {
        io::ErrorKind::NotFound => ConfigError::PathNotFound { source: e },
        _ => ConfigError::PathUnavailable { source: e },
    }
}

fn check_size(path: &Path, size: u64) -> Result<()> {
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            size,
            max: MAX_CONFIG_FILE_SIZE,
        }
        .at_path(path));
    }
    Ok(())
}

fn read_single_file(path: &Path, size: u64) -> Result<Files> {
    check_size(path, size)?;
    let content = fs::read(path).map_err(|e| ConfigError::IoError(e).at_path(path))?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(ConfigError::PathNoContent.at_path(path));
    }

    let mut files = Files::new();
    files.insert(path.to_path_buf(), content);
    Ok(files)
}

/// Lists `dir` recursively and reads every file whose name matches the loader's pattern.
fn collect_files(dir: &Path, loader: &dyn Loader) -> Result<Files> {
    let pattern = loader.path_pattern();
    let mut files = Files::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(dir).to_path_buf();
            ConfigError::IoError(io::Error::from(e)).at_path(&at)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(pattern) = pattern {
            if !pattern.is_match(&entry.file_name().to_string_lossy()) {
                tracing::debug!("Skipping '{}': name does not match {}", entry.path().display(), pattern);
                continue;
            }
        }

        let size = entry
            .metadata()
            .map_err(|e| ConfigError::IoError(io::Error::from(e)).at_path(entry.path()))?
            .len();
        check_size(entry.path(), size)?;

        let content =
            fs::read(entry.path()).map_err(|e| ConfigError::IoError(e).at_path(entry.path()))?;
        files.insert(entry.into_path(), content);
    }

    if files.is_empty() {
        return Err(ConfigError::PathNoContent.at_path(dir));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records what it was handed and returns a list of file names.
    struct Recorder {
        allow_dir: bool,
        pattern: Option<Regex>,
        seen: Mutex<Vec<(PathBuf, Files)>>,
    }

    impl Recorder {
        fn new(allow_dir: bool, pattern: Option<&str>) -> Self {
            Self {
                allow_dir,
                pattern: pattern.map(|p| Regex::new(p).unwrap()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Loader for Recorder {
        fn loader_type(&self) -> &str {
            "recorder"
        }

        fn allow_dir(&self) -> bool {
            self.allow_dir
        }

        fn path_pattern(&self) -> Option<&Regex> {
            self.pattern.as_ref()
        }

        fn load(&self, path: &Path, files: &Files) -> Result<Value> {
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), files.clone()));
            Ok(Value::from_items(
                files
                    .keys()
                    .map(|p| Value::from(p.file_name().unwrap().to_string_lossy().into_owned())),
            ))
        }

        fn clear(&self) {}
    }

    struct Failing;

    impl Loader for Failing {
        fn loader_type(&self) -> &str {
            "failing"
        }

        fn allow_dir(&self) -> bool {
            false
        }

        fn path_pattern(&self) -> Option<&Regex> {
            None
        }

        fn load(&self, _path: &Path, _files: &Files) -> Result<Value> {
            Err(ConfigError::ParseError {
                message: "bad syntax".to_string(),
                source: None,
            })
        }

        fn clear(&self) {}
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_path_is_undefined() {
        let loader = Recorder::new(true, None);
        let err = load_from_path(&loader, "  ").unwrap_err();
        assert!(matches!(err, ConfigError::PathUndefined));
        assert_eq!(loader.calls(), 0);
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        let err = load_from_path(&Recorder::new(true, None), &missing).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::PathNotFound { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));
    }

    #[test]
    fn test_uninspectable_path_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "plain.yaml", "a: 1");
        let below_file = file.join("child");

        let loader = Recorder::new(true, None);
        let err = load_from_path(&loader, &below_file).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::PathUnavailable { .. }));
        assert_eq!(err.path(), Some(below_file.as_path()));
        assert_eq!(loader.calls(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_unreadable_entry_aborts_directory_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", "a: 1");
        let dangling = dir.path().join("b.yaml");
        std::os::unix::fs::symlink(dir.path().join("gone.yaml"), &dangling).unwrap();

        let loader = Recorder::new(true, None);
        let err = load_from_path(&loader, dir.path()).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::IoError(_)));
        assert_eq!(err.path(), Some(dangling.as_path()));
        assert_eq!(loader.calls(), 0);
    }

    #[test]
    fn test_directory_rejected_before_reading() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", "a: 1");
        let loader = Recorder::new(false, None);
        let err = load_from_path(&loader, dir.path()).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::PathNotFile));
        assert_eq!(loader.calls(), 0);
    }

    #[test]
    fn test_empty_directory_has_no_content() {
        let dir = TempDir::new().unwrap();
        let err = load_from_path(&Recorder::new(true, None), dir.path()).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::PathNoContent));
    }

    #[test]
    fn test_pattern_filters_everything_out() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "hello");
        let loader = Recorder::new(true, Some(r"\.yaml$"));
        let err = load_from_path(&loader, dir.path()).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::PathNoContent));
        assert_eq!(loader.calls(), 0);
    }

    #[test]
    fn test_directory_is_one_load_call_in_path_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.yaml", "b: 2");
        write(dir.path(), "a.yaml", "a: 1");
        write(dir.path(), "nested/c.yaml", "c: 3");
        write(dir.path(), "skip.txt", "ignored");

        let loader = Recorder::new(true, Some(r"\.yaml$"));
        let value = load_from_path(&loader, dir.path()).unwrap();
        assert_eq!(value.as_string_list().unwrap(), vec!["a.yaml", "b.yaml", "c.yaml"]);

        let seen = loader.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, files) = &seen[0];
        assert_eq!(path, &clean_path(dir.path()).unwrap());
        assert_eq!(files.len(), 3);
        assert_eq!(files[&dir.path().join("nested/c.yaml")], b"c: 3".to_vec());
    }

    #[test]
    fn test_blank_single_file_has_no_content() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "blank.yaml", " \n\t \n");
        let err = load_from_path(&Recorder::new(false, None), &path).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::PathNoContent));
    }

    #[test]
    fn test_single_file_ignores_pattern() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "settings.conf", "x");
        let loader = Recorder::new(false, Some(r"\.yaml$"));
        let value = load_from_path(&loader, &path).unwrap();
        assert_eq!(value.as_string_list().unwrap(), vec!["settings.conf"]);
    }

    #[test]
    fn test_loader_error_is_wrapped_with_path() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "app.yaml", "::");
        let err = load_from_path(&Failing, &path).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::ParseError { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.to_string().contains("bad syntax"));
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.yaml");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_CONFIG_FILE_SIZE + 1).unwrap();

        let err = load_from_path(&Recorder::new(false, None), &path).unwrap_err();
        assert!(matches!(err.cause(), ConfigError::FileTooLarge { .. }));
    }

    #[test]
    fn test_clean_path_relative_parents() {
        assert_eq!(clean_path(Path::new("../a/./b/..")), Some(PathBuf::from("../a")));
        assert_eq!(clean_path(Path::new("./")), Some(PathBuf::from(".")));
        assert_eq!(clean_path(Path::new("")), None);
    }

    #[test]
    fn test_default_config_dir_mentions_app() {
        if let Ok(dir) = default_config_dir("cfgtree-test", "org.example") {
            assert!(dir.to_string_lossy().to_lowercase().contains("cfgtree-test"));
        }
    }
}
