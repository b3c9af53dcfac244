//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI arguments → environment variables → XDG paths → system → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file paths.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the table config (or None if not found).
    pub table: Option<PathBuf>,

    /// Path to the translations file (or None if not found).
    pub translations: Option<PathBuf>,

    /// Source of the table config (for diagnostics).
    pub table_source: ConfigSource,

    /// Source of the translations (for diagnostics).
    pub translations_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/table-filter/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_TABLE_PATH: &str = "TABLE_FILTER_CONFIG";
pub const ENV_TRANSLATIONS_PATH: &str = "TABLE_FILTER_TRANSLATIONS";
pub const ENV_CONFIG_DIR: &str = "TABLE_FILTER_CONFIG_DIR";

/// Standard config file names, in lookup order.
const TABLE_FILENAMES: &[&str] = &["table.json", "table.toml"];
const TRANSLATIONS_FILENAMES: &[&str] = &["translations.json"];

/// Application name for XDG directories.
const APP_NAME: &str = "table-filter";

/// Resolve configuration paths using the standard resolution order.
///
/// Resolution order for each file:
/// 1. Explicit CLI path (if it exists)
/// 2. Environment variable (TABLE_FILTER_CONFIG, TABLE_FILTER_TRANSLATIONS)
/// 3. TABLE_FILTER_CONFIG_DIR + filename
/// 4. XDG config directory (~/.config/table-filter/)
/// 5. System config (/etc/table-filter/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_table: Option<&Path>, cli_translations: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();

    paths.table = resolve_single_config(
        cli_table,
        ENV_TABLE_PATH,
        TABLE_FILENAMES,
        &mut paths.table_source,
    );

    paths.translations = resolve_single_config(
        cli_translations,
        ENV_TRANSLATIONS_PATH,
        TRANSLATIONS_FILENAMES,
        &mut paths.translations_source,
    );

    paths
}

fn resolve_single_config(
    cli_path: Option<&Path>,
    env_var: &str,
    filenames: &[&str],
    source: &mut ConfigSource,
) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        if path.exists() {
            *source = ConfigSource::CliArgument;
            return Some(path.to_path_buf());
        }
    }

    if let Ok(env_path) = std::env::var(env_var) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = first_existing(&PathBuf::from(config_dir), filenames) {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    if let Some(xdg) = xdg_config_dir() {
        if let Some(path) = first_existing(&xdg, filenames) {
            *source = ConfigSource::XdgConfig;
            return Some(path);
        }
    }

    if let Some(path) = first_existing(&system_config_dir(), filenames) {
        *source = ConfigSource::SystemConfig;
        return Some(path);
    }

    *source = ConfigSource::BuiltinDefault;
    None
}

fn first_existing(dir: &Path, filenames: &[&str]) -> Option<PathBuf> {
    filenames
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Whether a path should be parsed as TOML (by extension).
pub fn is_toml_path(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

/// Get the XDG config directory for table-filter.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("users.toml");
        std::fs::write(&table, "").unwrap();
        let paths = resolve_config(Some(&table), None);
        assert_eq!(paths.table.as_deref(), Some(table.as_path()));
        assert_eq!(paths.table_source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_first_existing_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("table.json"), "{}").unwrap();
        std::fs::write(dir.path().join("table.toml"), "").unwrap();
        let found = first_existing(dir.path(), TABLE_FILENAMES).unwrap();
        assert!(found.ends_with("table.json"));
    }

    #[test]
    fn test_is_toml_path() {
        assert!(is_toml_path(Path::new("/tmp/table.toml")));
        assert!(!is_toml_path(Path::new("/tmp/table.json")));
        assert!(!is_toml_path(Path::new("/tmp/table")));
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/table-filter"));
    }
}
