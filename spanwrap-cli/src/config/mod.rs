//! Configuration resolution: file first, command-line flags on top

use std::path::Path;

use anyhow::Result;
use spanwrap_core::{Alphabet, ConfigBuilder, ConfigFile, SegmentationConfig};

use crate::error::CliError;

/// Values given on the command line, `None` when the flag was absent
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub modes: Option<Vec<String>>,
    pub wrapper_tag: Option<String>,
    pub identifier_attribute: Option<String>,
    pub assign_identifiers: Option<bool>,
    pub use_labels: Option<bool>,
    pub exclude: Option<String>,
    pub block: Option<String>,
    pub alphabet: Option<Alphabet>,
}

impl ConfigOverrides {
    /// Apply every present flag on top of `builder`
    pub fn apply(&self, mut builder: ConfigBuilder) -> spanwrap_core::Result<ConfigBuilder> {
        if let Some(modes) = &self.modes {
            builder = builder.mode_names(modes)?;
        }
        if let Some(tag) = &self.wrapper_tag {
            builder = builder.wrapper_tag(tag.as_str());
        }
        if let Some(name) = &self.identifier_attribute {
            builder = builder.identifier_attribute(name.as_str());
        }
        if let Some(enabled) = self.assign_identifiers {
            builder = builder.assign_identifiers(enabled);
        }
        if let Some(enabled) = self.use_labels {
            builder = builder.use_labels(enabled);
        }
        if let Some(selector) = &self.exclude {
            builder = builder.exclude_selector(selector.as_str());
        }
        if let Some(selector) = &self.block {
            builder = builder.block_selector(selector.as_str());
        }
        if let Some(alphabet) = self.alphabet {
            builder = builder.alphabet(alphabet);
        }
        Ok(builder)
    }
}

/// Build the effective configuration from an optional file and the flags
pub fn resolve_config(
    file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<SegmentationConfig> {
    let mut builder = SegmentationConfig::builder();

    if let Some(path) = file {
        let invalid = |reason: String| CliError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        };
        log::debug!("Loading configuration from {}", path.display());
        builder = ConfigFile::from_file(path)
            .and_then(|parsed| parsed.apply(builder))
            .map_err(|e| invalid(e.to_string()))?;
    }

    let config = overrides.apply(builder)?.build()?;
    log::debug!("Effective modes: {}", config.modes());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spanwrap_core::Mode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, &ConfigOverrides::default()).unwrap();
        assert!(config.has_mode(Mode::Letter));
        assert_eq!(config.wrapper_tag(), "t:span");
    }

    #[test]
    fn test_flags_override_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("spanwrap.toml");
        fs::write(
            &path,
            "[segmentation]\nmodes = [\"sentence\"]\nwrapper_tag = \"span\"\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            modes: Some(vec!["word".to_string()]),
            ..ConfigOverrides::default()
        };
        let config = resolve_config(Some(&path), &overrides).unwrap();

        assert!(config.has_mode(Mode::Word));
        assert!(!config.has_mode(Mode::Sentence));
        assert_eq!(config.wrapper_tag(), "span");
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "[segmentation]\nmodes = [\"paragraph\"]\n").unwrap();

        let error = resolve_config(Some(&path), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_invalid_flag_is_reported() {
        let overrides = ConfigOverrides {
            modes: Some(vec!["paragraph".to_string()]),
            ..ConfigOverrides::default()
        };
        let error = resolve_config(None, &overrides).unwrap_err();
        assert!(error.to_string().contains("paragraph"));
    }
}
