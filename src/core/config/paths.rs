use std::env;
use std::io;
use std::path::PathBuf;

const DATA_DIR_VAR: &str = "RAGPRESS_DATA_DIR";
const CONFIG_PATH_VAR: &str = "RAGPRESS_CONFIG_PATH";

/// Files the service reads or writes, all resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub config_path: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::resolve(|name| env::var(name).ok())
    }

    /// `config.yml`, `secrets.yaml` and `logs/` all live under `data_dir`.
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        Self {
            log_dir: data_dir.join("logs"),
            config_path: data_dir.join("config.yml"),
            secrets_path: data_dir.join("secrets.yaml"),
            data_dir,
        }
    }

    pub(crate) fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = non_blank(lookup(DATA_DIR_VAR))
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mut paths = Self::from_data_dir(data_dir);
        if let Some(config_path) = non_blank(lookup(CONFIG_PATH_VAR)) {
            paths.config_path = PathBuf::from(config_path);
        }
        paths
    }

    pub fn ensure_log_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The crate directory during development (where the sample `config.yml`
/// sits), otherwise the working directory.
fn default_data_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if cfg!(debug_assertions) && manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }
    env::current_dir().unwrap_or(manifest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_hang_off_the_data_dir() {
        let paths = AppPaths::resolve(|name| match name {
            DATA_DIR_VAR => Some("/srv/ragpress".to_string()),
            _ => None,
        });

        assert_eq!(paths.data_dir, PathBuf::from("/srv/ragpress"));
        assert_eq!(paths.log_dir, PathBuf::from("/srv/ragpress/logs"));
        assert_eq!(paths.config_path, PathBuf::from("/srv/ragpress/config.yml"));
        assert_eq!(paths.secrets_path, PathBuf::from("/srv/ragpress/secrets.yaml"));
    }

    #[test]
    fn config_path_override_leaves_secrets_in_data_dir() {
        let paths = AppPaths::resolve(|name| match name {
            DATA_DIR_VAR => Some("/srv/ragpress".to_string()),
            CONFIG_PATH_VAR => Some("/etc/ragpress.yml".to_string()),
            _ => None,
        });

        assert_eq!(paths.config_path, PathBuf::from("/etc/ragpress.yml"));
        assert_eq!(paths.secrets_path, PathBuf::from("/srv/ragpress/secrets.yaml"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let paths = AppPaths::resolve(|_| Some("  ".to_string()));

        assert_ne!(paths.data_dir, PathBuf::from("  "));
        assert_eq!(paths.config_path, paths.data_dir.join("config.yml"));
    }

    #[test]
    fn log_dir_is_created_on_demand() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::from_data_dir(dir.path().join("nested"));
        assert!(!paths.log_dir.exists());

        paths.ensure_log_dir().expect("log dir");

        assert!(paths.log_dir.is_dir());
    }
}
