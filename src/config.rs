//! Alias table discovery: explicit flag, then the user config dir, then built-in.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bibkeys_core::AliasTable;
use tracing::{debug, info};

/// Where the active alias table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasSource {
    Flag(PathBuf),
    UserConfig(PathBuf),
    Builtin,
}

impl fmt::Display for AliasSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(path) | Self::UserConfig(path) => write!(f, "{}", path.display()),
            Self::Builtin => f.write_str("built-in"),
        }
    }
}

/// Loaded alias table plus its origin, for logging.
#[derive(Debug)]
pub struct LoadedAliases {
    pub table: AliasTable,
    pub source: AliasSource,
}

/// `$XDG_CONFIG_HOME/bibkeys/aliases.json`, else `$HOME/.config/bibkeys/aliases.json`.
pub fn resolve_default_aliases_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("bibkeys")
                .join("aliases.json"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("bibkeys")
            .join("aliases.json"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the alias table named by `--aliases`, or the user's default file if
/// present, or falls back to the built-in table.
pub fn load_aliases(explicit: Option<&Path>) -> Result<LoadedAliases> {
    if let Some(path) = explicit {
        let table = AliasTable::load(path)
            .with_context(|| format!("failed to load alias table from {}", path.display()))?;
        info!(path = %path.display(), canonicals = table.len(), "Loaded alias table");
        return Ok(LoadedAliases {
            table,
            source: AliasSource::Flag(path.to_path_buf()),
        });
    }

    if let Some(path) = resolve_default_aliases_path().filter(|p| p.exists()) {
        let table = AliasTable::load(&path)
            .with_context(|| format!("failed to load alias table from {}", path.display()))?;
        info!(path = %path.display(), canonicals = table.len(), "Loaded user alias table");
        return Ok(LoadedAliases {
            table,
            source: AliasSource::UserConfig(path),
        });
    }

    debug!("Using built-in alias table");
    Ok(LoadedAliases {
        table: AliasTable::builtin(),
        source: AliasSource::Builtin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serializes tests that touch process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Restores an env var to its previous value (or removes it) when dropped.
    struct RestoreEnv {
        key: &'static str,
        value: Option<OsString>,
    }

    impl RestoreEnv {
        fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
            let previous = env::var_os(key);
            // SAFETY: callers hold ENV_LOCK; restored on drop.
            unsafe { env::set_var(key, value) };
            Self {
                key,
                value: previous,
            }
        }
    }

    impl Drop for RestoreEnv {
        fn drop(&mut self) {
            // SAFETY: test restores env to prior state.
            match &self.value {
                Some(v) => unsafe { env::set_var(self.key, v) },
                None => unsafe { env::remove_var(self.key) },
            }
        }
    }

    #[test]
    fn test_default_path_prefers_xdg_config_home() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _xdg = RestoreEnv::set("XDG_CONFIG_HOME", "/tmp/xdg");
        assert_eq!(
            resolve_default_aliases_path(),
            Some(PathBuf::from("/tmp/xdg/bibkeys/aliases.json"))
        );
    }

    #[test]
    fn test_default_path_falls_back_to_home() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _xdg = RestoreEnv::set("XDG_CONFIG_HOME", "");
        let _home = RestoreEnv::set("HOME", "/home/someone");
        assert_eq!(
            resolve_default_aliases_path(),
            Some(PathBuf::from("/home/someone/.config/bibkeys/aliases.json"))
        );
    }

    #[test]
    fn test_missing_user_file_uses_builtin() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let _xdg = RestoreEnv::set("XDG_CONFIG_HOME", temp.path());

        let loaded = load_aliases(None).unwrap();
        assert_eq!(loaded.source, AliasSource::Builtin);
        assert_eq!(loaded.table, AliasTable::builtin());
    }

    #[test]
    fn test_user_file_is_discovered() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("bibkeys");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("aliases.json"), r#"{"LES": ["large eddy simulation"]}"#).unwrap();
        let _xdg = RestoreEnv::set("XDG_CONFIG_HOME", temp.path());

        let loaded = load_aliases(None).unwrap();
        assert!(matches!(loaded.source, AliasSource::UserConfig(_)));
        assert_eq!(loaded.table.len(), 1);
    }

    #[test]
    fn test_explicit_flag_wins_and_reports_bad_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_aliases(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to load alias table"));
    }
}
