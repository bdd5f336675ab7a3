//! On-disk sketch layout: one directory per sketch under the sketch root.
//!
//! ```text
//! <root>/<name>/<name>.pde        live source
//! <root>/<name>/<name>.pde.bak    previous source (single generation)
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::BridgeConfig;
use crate::types::{SketchError, SketchInfo, SketchResult, BACKUP_SUFFIX};

/// File-system view of the sketch root. Holds no cached state.
#[derive(Debug, Clone)]
pub struct SketchStore {
    root: PathBuf,
    extension: String,
}

impl SketchStore {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.sketch_root, &config.source_extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject names that would escape the sketch root or address it directly.
    pub fn validate_name(name: &str) -> SketchResult<()> {
        let bad = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if bad {
            return Err(SketchError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    pub fn sketch_dir(&self, name: &str) -> SketchResult<PathBuf> {
        Self::validate_name(name)?;
        Ok(self.root.join(name))
    }

    pub fn source_path(&self, name: &str) -> SketchResult<PathBuf> {
        Ok(self
            .sketch_dir(name)?
            .join(format!("{name}.{}", self.extension)))
    }

    pub fn backup_path(&self, name: &str) -> SketchResult<PathBuf> {
        Ok(self
            .sketch_dir(name)?
            .join(format!("{name}.{}{BACKUP_SUFFIX}", self.extension)))
    }

    /// Whether `<root>/<name>` exists at all.
    pub fn exists(&self, name: &str) -> bool {
        self.sketch_dir(name).map(|p| p.exists()).unwrap_or(false)
    }

    fn not_found(&self, name: &str) -> SketchError {
        SketchError::SketchNotFound {
            name: name.to_string(),
            root: self.root.clone(),
        }
    }

    /// True if `dir` directly contains at least one file with the source extension.
    pub fn has_source_file(&self, dir: &Path) -> bool {
        let suffix = format!(".{}", self.extension);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory {}: {e}", dir.display());
                return false;
            }
        };
        entries.flatten().any(|entry| {
            let path = entry.path();
            path.is_file() && entry.file_name().to_string_lossy().ends_with(&suffix)
        })
    }

    /// Names of all runnable sketches, sorted.
    pub fn list(&self) -> SketchResult<Vec<String>> {
        if !self.root.exists() {
            return Err(SketchError::RootMissing(self.root.clone()));
        }

        let entries =
            fs::read_dir(&self.root).map_err(|e| SketchError::io("list", &self.root, e))?;

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| {
                let path = entry.path();
                path.is_dir() && self.has_source_file(&path)
            })
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Create the sketch directory if needed and write `code` as its source.
    /// Any previous source is overwritten without a backup.
    pub fn create(&self, name: &str, code: &str) -> SketchResult<PathBuf> {
        let dir = self.sketch_dir(name)?;
        let source = self.source_path(name)?;

        fs::create_dir_all(&dir).map_err(|e| SketchError::io("create directory", &dir, e))?;
        fs::write(&source, code).map_err(|e| SketchError::io("write", &source, e))?;

        Ok(dir)
    }

    /// Replace the source of an existing sketch, keeping the old one as `.bak`.
    ///
    /// The live file is never moved away: the backup is a second link to it
    /// (or a copy), and the new content is renamed over it in one step.
    pub fn update(&self, name: &str, code: &str) -> SketchResult<PathBuf> {
        let dir = self.sketch_dir(name)?;
        if !dir.exists() {
            return Err(self.not_found(name));
        }
        let source = self.source_path(name)?;
        let backup = self.backup_path(name)?;

        let live = match fs::metadata(&source) {
            Ok(meta) => Some(meta),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(SketchError::io("inspect", &source, e)),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| SketchError::io("create temp file in", &dir, e))?;
        tmp.write_all(code.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| SketchError::io("write", tmp.path(), e))?;

        // Temp files are created 0600; the replacement should look like `create` made it.
        let permissions = live
            .as_ref()
            .map(|meta| meta.permissions())
            .or_else(default_source_permissions);
        if let Some(permissions) = permissions {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| SketchError::io("set permissions on", tmp.path(), e))?;
        }

        if live.is_some() {
            back_up(&source, &backup)?;
        }

        tmp.persist(&source)
            .map_err(|e| SketchError::io("replace", &source, e.error))?;

        Ok(source)
    }

    /// Read the live source of a sketch.
    pub fn read(&self, name: &str) -> SketchResult<String> {
        if !self.exists(name) {
            Self::validate_name(name)?;
            return Err(self.not_found(name));
        }
        let source = self.source_path(name)?;
        fs::read_to_string(&source).map_err(|e| SketchError::io("read", &source, e))
    }

    /// Read the single-generation backup of a sketch.
    pub fn read_backup(&self, name: &str) -> SketchResult<String> {
        if !self.exists(name) {
            Self::validate_name(name)?;
            return Err(self.not_found(name));
        }
        let backup = self.backup_path(name)?;
        fs::read_to_string(&backup).map_err(|e| SketchError::io("read", &backup, e))
    }

    pub fn info(&self, name: &str) -> SketchResult<SketchInfo> {
        if !self.exists(name) {
            Self::validate_name(name)?;
            return Err(self.not_found(name));
        }
        let source_path = self.source_path(name)?;
        let meta = fs::metadata(&source_path).ok();

        Ok(SketchInfo {
            name: name.to_string(),
            size: meta.as_ref().map(|m| m.len()),
            modified: meta
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            has_backup: self.backup_path(name)?.exists(),
            source_path,
        })
    }
}

/// Point `backup` at the current contents of `source` without touching `source`.
fn back_up(source: &Path, backup: &Path) -> SketchResult<()> {
    match fs::remove_file(backup) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(SketchError::io("remove old backup", backup, e)),
    }
    if let Err(e) = fs::hard_link(source, backup) {
        tracing::debug!("Hard link to {} failed ({e}), copying", backup.display());
        fs::copy(source, backup).map_err(|e| SketchError::io("back up", source, e))?;
    }
    Ok(())
}

#[cfg(unix)]
fn default_source_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_source_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> SketchStore {
        SketchStore::new(dir.path(), "pde")
    }

    #[test]
    fn test_paths() {
        let s = SketchStore::new("/sketches", "pde");
        assert_eq!(s.sketch_dir("demo").unwrap(), PathBuf::from("/sketches/demo"));
        assert_eq!(
            s.source_path("demo").unwrap(),
            PathBuf::from("/sketches/demo/demo.pde")
        );
        assert_eq!(
            s.backup_path("demo").unwrap(),
            PathBuf::from("/sketches/demo/demo.pde.bak")
        );
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(SketchStore::validate_name(name), Err(SketchError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(SketchStore::validate_name("my_sketch-2").is_ok());
        assert!(SketchStore::validate_name("..dots").is_ok());
    }

    #[test]
    fn test_create_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let code = "void setup() {\r\n  size(200, 200);\n}\n// ünïcode ✓";
        let created = s.create("demo", code).unwrap();
        assert_eq!(created, dir.path().join("demo"));
        assert_eq!(fs::read_to_string(dir.path().join("demo/demo.pde")).unwrap(), code);
    }

    #[test]
    fn test_create_is_idempotent_and_skips_backup() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "first").unwrap();
        s.create("demo", "second").unwrap();
        assert_eq!(s.read("demo").unwrap(), "second");
        assert!(!s.backup_path("demo").unwrap().exists());
    }

    #[test]
    fn test_create_makes_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let s = SketchStore::new(dir.path().join("nested/root"), "pde");
        s.create("demo", "x").unwrap();
        assert!(dir.path().join("nested/root/demo/demo.pde").is_file());
    }

    #[test]
    fn test_update_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "c1").unwrap();
        s.update("demo", "c2").unwrap();
        assert_eq!(s.read("demo").unwrap(), "c2");
        assert_eq!(s.read_backup("demo").unwrap(), "c1");
    }

    #[test]
    fn test_update_twice_single_generation() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "c1").unwrap();
        s.update("demo", "c2").unwrap();
        s.update("demo", "c3").unwrap();
        assert_eq!(s.read("demo").unwrap(), "c3");
        assert_eq!(s.read_backup("demo").unwrap(), "c2");
    }

    #[test]
    fn test_update_without_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        fs::create_dir(dir.path().join("empty")).unwrap();
        s.update("empty", "fresh").unwrap();
        assert_eq!(s.read("empty").unwrap(), "fresh");
        assert!(!s.backup_path("empty").unwrap().exists());
    }

    #[test]
    fn test_update_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "c1").unwrap();
        s.update("demo", "c2").unwrap();
        let mut names: Vec<_> = fs::read_dir(dir.path().join("demo"))
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["demo.pde", "demo.pde.bak"]);
    }

    #[test]
    fn test_failed_backup_keeps_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "c1").unwrap();
        // A directory squatting on the backup path cannot be replaced.
        let backup = s.backup_path("demo").unwrap();
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("keep"), "x").unwrap();

        assert!(s.update("demo", "c2").is_err());
        assert_eq!(s.read("demo").unwrap(), "c1");
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("demo"))
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_backup_is_independent_of_new_source() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "c1").unwrap();
        s.update("demo", "c2").unwrap();
        // Later in-place writes to the live file must not leak into the backup.
        s.create("demo", "c3").unwrap();
        assert_eq!(s.read_backup("demo").unwrap(), "c1");
    }

    #[cfg(unix)]
    #[test]
    fn test_update_file_modes() {
        use std::os::unix::fs::PermissionsExt;
        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;

        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        fs::create_dir(dir.path().join("fresh")).unwrap();
        s.update("fresh", "x").unwrap();
        assert_eq!(mode(&s.source_path("fresh").unwrap()), 0o644);

        s.create("guarded", "c1").unwrap();
        let source = s.source_path("guarded").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o640)).unwrap();
        s.update("guarded", "c2").unwrap();
        assert_eq!(mode(&source), 0o640);
    }

    #[test]
    fn test_update_missing_sketch() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let err = s.update("ghost", "x").unwrap_err();
        assert!(matches!(err, SketchError::SketchNotFound { .. }));
        assert!(!dir.path().join("ghost").exists());
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("zeta", "z").unwrap();
        s.create("alpha", "a").unwrap();
        // Directory without a source file is not a sketch.
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("notes/readme.txt"), "hi").unwrap();
        // Any .pde file qualifies, not only <name>.pde.
        fs::create_dir(dir.path().join("odd")).unwrap();
        fs::write(dir.path().join("odd/Other.pde"), "x").unwrap();
        // Nested .pde files do not count.
        fs::create_dir_all(dir.path().join("deep/inner")).unwrap();
        fs::write(dir.path().join("deep/inner/inner.pde"), "x").unwrap();
        // Plain files at the root are ignored.
        fs::write(dir.path().join("loose.pde"), "x").unwrap();

        assert_eq!(s.list().unwrap(), vec!["alpha", "odd", "zeta"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("open", "x").unwrap();
        s.create("locked", "x").unwrap();
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read it anyway; nothing to check then.
        let readable = fs::read_dir(&locked).is_ok();
        let listed = s.list();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert_eq!(listed.unwrap(), vec!["open"]);
        }
    }

    #[test]
    fn test_list_empty_and_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).list().unwrap().is_empty());

        let missing = SketchStore::new(dir.path().join("nope"), "pde");
        assert!(matches!(missing.list(), Err(SketchError::RootMissing(_))));
    }

    #[test]
    fn test_info() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.create("demo", "12345").unwrap();
        let info = s.info("demo").unwrap();
        assert_eq!(info.size, Some(5));
        assert!(info.modified.is_some());
        assert!(!info.has_backup);

        s.update("demo", "x").unwrap();
        assert!(s.info("demo").unwrap().has_backup);
        assert!(matches!(s.info("nope"), Err(SketchError::SketchNotFound { .. })));
    }
}
