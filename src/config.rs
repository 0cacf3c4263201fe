use crate::language::DEFAULT_LANGUAGE;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// hooks shipped by packages
pub const DEFAULT_DIR: &str = "/usr/share/containers/oci/hooks.d";
// administrator overrides, scanned last so they win
pub const OVERRIDE_DIR: &str = "/etc/containers/oci/hooks.d";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default = "default_hooks_dirs")]
    pub hooks_dirs: Vec<String>,
    #[serde(default)]
    pub extension_stages: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_hooks_dirs() -> Vec<String> {
    vec![DEFAULT_DIR.to_string(), OVERRIDE_DIR.to_string()]
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hooks_dirs: default_hooks_dirs(),
            extension_stages: vec![],
            language: default_language(),
        }
    }
}

impl Config {
    /// Reads a YAML config file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Config, anyhow::Error> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(anyhow!(e).context(format!("failed to read config file {}", path.display())));
            }
        };

        serde_yaml::from_str(&contents)
            .map_err(|e| anyhow!(e).context(format!("failed to parse config file {}", path.display())))
    }

    pub fn directories(&self) -> Vec<PathBuf> {
        self.hooks_dirs
            .iter()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, DEFAULT_DIR, OVERRIDE_DIR};
    use std::path::PathBuf;

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.yaml");
        std::fs::write(
            &path,
            "hooks-dirs:\n  - /opt/hooks.d\n  - /etc/hooks.d\nextension-stages:\n  - precreate\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.hooks_dirs, vec!["/opt/hooks.d", "/etc/hooks.d"]);
        assert_eq!(config.extension_stages, vec!["precreate"]);
        assert_eq!(config.language, "und-u-va-posix");
        assert_eq!(
            config.directories(),
            vec![PathBuf::from("/opt/hooks.d"), PathBuf::from("/etc/hooks.d")]
        );
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Config::load(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(missing, Config::default());
        assert_eq!(missing.hooks_dirs, vec![DEFAULT_DIR, OVERRIDE_DIR]);

        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "language: en-US\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.hooks_dirs, vec![DEFAULT_DIR, OVERRIDE_DIR]);
        assert_eq!(config.language, "en-US");
    }

    #[test]
    fn test_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "hooks-dirs: 3\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"), "{}", err);
    }

    #[test]
    fn test_tilde_expansion() {
        if std::env::var("HOME").is_err() {
            return;
        }
        let config = Config {
            hooks_dirs: vec!["~/hooks.d".to_string()],
            ..Default::default()
        };
        let dirs = config.directories();
        assert!(!dirs[0].starts_with("~"), "{:?}", dirs);
        assert!(dirs[0].ends_with("hooks.d"));
    }
}
