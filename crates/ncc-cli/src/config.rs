//! YAML configuration file for the `ncc` binary
//!
//! Everything here can also be given on the command line; flags win over
//! file values, and `--attr` values are appended after the file's.

use anyhow::{Context, Result, bail};
use ncc_compiler::CompileOptions;
use ncc_schema::ModelOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directories or individual `.yin` files
    pub schema_paths: Vec<PathBuf>,

    /// Walk schema directories recursively
    pub recursive: bool,

    /// Top-level schema container, `config` when unset
    pub root_element: Option<String>,

    /// Only modules whose namespace URI contains this string
    pub namespace_filter: Option<String>,

    pub compile: CompileOptions,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Model options with the file's values
    pub fn model_options(&self) -> ModelOptions {
        let mut options = ModelOptions::new();
        if let Some(root) = &self.root_element {
            options = options.with_root_element(root);
        }
        if let Some(filter) = &self.namespace_filter {
            options = options.with_namespace_filter(filter);
        }
        options
    }
}

/// Split a `name=value` root attribute argument
pub fn parse_attribute(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => bail!("invalid attribute '{raw}', expected name=value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = CliConfig::from_yaml("{}").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.compile.root_tag, "config");
        assert_eq!(config.model_options(), ModelOptions::default());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
schema_paths:
  - /opt/schemas
  - extra/vendor.yin
recursive: true
root_element: system
namespace_filter: example.com
compile:
  root_tag: filter
  root_attributes:
    - [type, subtree]
  write_keys: true
"#;
        let config = CliConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.schema_paths.len(), 2);
        assert!(config.recursive);
        assert_eq!(config.compile.root_tag, "filter");
        assert_eq!(
            config.compile.root_attributes,
            vec![("type".to_string(), "subtree".to_string())]
        );
        assert!(config.compile.write_keys);

        let expected = ModelOptions::new()
            .with_root_element("system")
            .with_namespace_filter("example.com");
        assert_eq!(config.model_options(), expected);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(CliConfig::from_yaml("schema_dirs: [a]").is_err());
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("message-id=101").unwrap(),
            ("message-id".to_string(), "101".to_string())
        );
        assert_eq!(parse_attribute("a=b=c").unwrap().1, "b=c");
        assert!(parse_attribute("novalue").is_err());
        assert!(parse_attribute("=x").is_err());
    }
}
