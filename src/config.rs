use crate::error::{Result, UntarError};
use crate::extractor::format;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Optional forced handling: "tar" never decompresses, "tgz" always
    /// does. When absent each file's extension decides.
    pub mode: Option<String>,

    #[serde(default, rename = "group")]
    pub groups: Vec<FileGroup>,
}

/// One destination directory plus its ordered list of candidate archives.
#[derive(Debug, Clone, Deserialize)]
pub struct FileGroup {
    pub dest: PathBuf,
    pub src: Vec<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UntarError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| UntarError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| UntarError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["untar.toml", ".untar.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref mode) = cli_args.mode {
            self.mode = Some(mode.clone());
        }

        // The ad-hoc CLI group runs before any configured groups.
        if let Some(ref group) = cli_args.group {
            self.groups.insert(0, group.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Invalid mode aborts the whole task before any extraction begins.
        if !format::is_valid_mode(self.mode.as_deref()) {
            return Err(UntarError::InvalidMode {
                mode: self.mode.clone().unwrap_or_default(),
            });
        }

        if self.groups.is_empty() {
            return Err(UntarError::Config {
                message: "no file groups configured".to_string(),
            });
        }

        for group in &self.groups {
            if group.dest.as_os_str().is_empty() {
                return Err(UntarError::Config {
                    message: "file group has an empty destination directory".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        "\
# untar configuration
#
# mode forces handling of every archive regardless of extension:
#   \"tar\" - extract as-is, \"tgz\" - gunzip before extracting.
# Omit it to infer per file (.tgz and .gz sources are decompressed).
# mode = \"tgz\"

# Each [[group]] pairs a destination directory with an ordered list of
# source archives. Missing sources are warned about and skipped.
[[group]]
dest = \"extracted\"
src = [\"archives/example.tar.gz\", \"archives/example.tar\"]
"
        .to_string()
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub mode: Option<String>,
    pub group: Option<FileGroup>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Option<String>) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_group(mut self, group: Option<FileGroup>) -> Self {
        self.group = group;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.mode.is_none());
        assert!(config.groups.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "mode = \"tgz\"\n\n[[group]]\ndest = \"out\"\nsrc = [\"a.tgz\", \"b.tgz\"]\n"
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.mode.as_deref(), Some("tgz"));
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].dest, PathBuf::from("out"));
        assert_eq!(config.groups[0].src.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load_from_file("does-not-exist.toml");
        assert!(matches!(result, Err(UntarError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config {
            mode: Some("tar".to_string()),
            groups: vec![FileGroup {
                dest: PathBuf::from("configured"),
                src: vec![PathBuf::from("c.tar")],
            }],
        };

        let overrides = CliOverrides::new()
            .with_mode(Some("tgz".to_string()))
            .with_group(Some(FileGroup {
                dest: PathBuf::from("cli"),
                src: vec![PathBuf::from("a.tgz")],
            }));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.mode.as_deref(), Some("tgz"));
        assert_eq!(config.groups.len(), 2);
        // CLI group is processed first
        assert_eq!(config.groups[0].dest, PathBuf::from("cli"));
        assert_eq!(config.groups[1].dest, PathBuf::from("configured"));
    }

    #[test]
    fn test_validate_rejects_invalid_mode() {
        let config = Config {
            mode: Some("zip".to_string()),
            groups: vec![FileGroup {
                dest: PathBuf::from("out"),
                src: vec![],
            }],
        };

        match config.validate() {
            Err(UntarError::InvalidMode { mode }) => assert_eq!(mode, "zip"),
            other => panic!("expected InvalidMode, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_requires_groups() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(UntarError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_dest() {
        let config = Config {
            mode: None,
            groups: vec![FileGroup {
                dest: PathBuf::new(),
                src: vec![PathBuf::from("a.tar")],
            }],
        };
        assert!(matches!(
            config.validate(),
            Err(UntarError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_source_list_is_valid() {
        let config = Config {
            mode: None,
            groups: vec![FileGroup {
                dest: PathBuf::from("out"),
                src: vec![],
            }],
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = Config::create_sample_config();
        let config: Config = toml::from_str(&sample).unwrap();
        assert!(config.mode.is_none());
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].src.len(), 2);
        assert!(config.validate().is_ok());
    }
}
