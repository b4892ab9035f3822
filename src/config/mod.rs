mod theme;

pub use theme::{Theme, ThemeName};

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const GIT_ENV: &str = "BLAMELINE_GIT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub theme: ThemeName,
    pub git_binary: String,
    pub default_remote: String,
    /// Lines moved by `J` / `K`.
    pub page_size: usize,
    pub summary_width: usize,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            git_binary: "git".to_string(),
            default_remote: "origin".to_string(),
            page_size: 10,
            summary_width: 45,
            log_file: std::env::temp_dir().join("blameline.log"),
        }
    }
}

impl Config {
    /// Reads `explicit` if given (it must exist), else the per-user config file if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blameline").join("config.toml"))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.message().to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.page_size == 0 {
            return Err("page_size must be at least 1".to_string());
        }
        if self.summary_width < 4 {
            return Err("summary_width must be at least 4".to_string());
        }
        if self.git_binary.trim().is_empty() {
            return Err("git_binary must not be empty".to_string());
        }
        Ok(())
    }

    /// Applies `BLAMELINE_GIT` (as `env`) and then the command line flag.
    pub fn with_git_override(mut self, env: Option<String>, flag: Option<String>) -> Self {
        if let Some(git) = flag.or(env).filter(|g| !g.trim().is_empty()) {
            self.git_binary = git;
        }
        self
    }

    pub fn current_theme(&self) -> Theme {
        match self.theme {
            ThemeName::Dark => Theme::dark(),
            ThemeName::Light => Theme::light(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let config = Config::parse(
            r#"
theme = "light"
git_binary = "/usr/local/bin/git"
default_remote = "upstream"
page_size = 25
summary_width = 30
log_file = "/var/tmp/bl.log"
"#,
        )
        .unwrap();
        assert_eq!(config.theme, ThemeName::Light);
        assert_eq!(config.git_binary, "/usr/local/bin/git");
        assert_eq!(config.default_remote, "upstream");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.summary_width, 30);
        assert_eq!(config.log_file, PathBuf::from("/var/tmp/bl.log"));
        assert_eq!(config.current_theme(), Theme::light());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::parse("theme = \"solarized\"").is_err());
        assert!(Config::parse("page_size = 0").is_err());
        assert!(Config::parse("summary_width = 2").is_err());
        assert!(Config::parse("unknown_key = 1").is_err());
        assert!(Config::parse("page_size = ").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_remote = \"fork\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.default_remote, "fork");
        assert_eq!(config.git_binary, "git");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_reports_path_on_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = [").unwrap();

        match Config::load(Some(&path)) {
            Err(Error::Config(message)) => assert!(message.contains("config.toml")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_git_override_precedence() {
        let config = Config::default();
        assert_eq!(config.clone().with_git_override(None, None).git_binary, "git");
        assert_eq!(
            config
                .clone()
                .with_git_override(Some("/opt/git".to_string()), None)
                .git_binary,
            "/opt/git"
        );
        assert_eq!(
            config
                .with_git_override(Some("/opt/git".to_string()), Some("/bin/git".to_string()))
                .git_binary,
            "/bin/git"
        );
    }
}
