// Locating and loading evaluator.toml for the CLI.

use dualvalue_baseball::config::{load_config_from, ConfigError, EngineConfig};
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "evaluator.toml";

/// Platform config directory, e.g. `~/.config/dualvalue` on Linux.
pub fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dualvalue").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Pick the config file to use.
///
/// An explicit path always wins, even if it does not exist (loading it then
/// fails loudly). Otherwise `<cwd>/config/evaluator.toml`, then the platform
/// config dir. `None` means built-in defaults.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    cwd: &Path,
    user_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = cwd.join("config").join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    user_dir
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Resolve and load the engine config, falling back to built-in defaults.
pub fn load_engine_config(explicit: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let user_dir = user_config_dir();
    match resolve_config_path(explicit, &cwd, user_dir.as_deref()) {
        Some(path) => {
            info!("Loading evaluator config from {}", path.display());
            load_config_from(&path)
        }
        None => {
            info!("No evaluator config found, using built-in defaults");
            Ok(EngineConfig::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dualvalue_settings_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn explicit_path_wins() {
        let cwd = scratch_dir("explicit");
        let explicit = cwd.join("elsewhere.toml");
        let resolved = resolve_config_path(Some(&explicit), &cwd, None);
        assert_eq!(resolved, Some(explicit));
        let _ = fs::remove_dir_all(&cwd);
    }

    #[test]
    fn local_config_dir_before_user_dir() {
        let cwd = scratch_dir("local");
        let user = scratch_dir("local_user");
        fs::create_dir_all(cwd.join("config")).unwrap();
        fs::write(cwd.join("config").join(CONFIG_FILE), "").unwrap();
        fs::write(user.join(CONFIG_FILE), "").unwrap();

        let resolved = resolve_config_path(None, &cwd, Some(&user));
        assert_eq!(resolved, Some(cwd.join("config").join(CONFIG_FILE)));

        let _ = fs::remove_dir_all(&cwd);
        let _ = fs::remove_dir_all(&user);
    }

    #[test]
    fn user_dir_used_when_no_local_file() {
        let cwd = scratch_dir("user_only");
        let user = scratch_dir("user_only_user");
        fs::write(user.join(CONFIG_FILE), "").unwrap();

        let resolved = resolve_config_path(None, &cwd, Some(&user));
        assert_eq!(resolved, Some(user.join(CONFIG_FILE)));

        let _ = fs::remove_dir_all(&cwd);
        let _ = fs::remove_dir_all(&user);
    }

    #[test]
    fn nothing_found_means_defaults() {
        let cwd = scratch_dir("none");
        assert_eq!(resolve_config_path(None, &cwd, None), None);
        let _ = fs::remove_dir_all(&cwd);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("dualvalue_settings_missing.toml");
        let err = load_engine_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
