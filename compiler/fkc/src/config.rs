//! Run configuration.

use std::path::{Path, PathBuf};

use fk_diagnostic::{ErrorMode, ErrorPolicy};
use fk_kernel::{ExtractOptions, KernelSelection};
use fk_scope::{ResolveOptions, DEFAULT_IGNORED_MODULES};
use serde::{Deserialize, Serialize};

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Settings of one `fkc` run; every field has a default.
///
/// ```text
/// { "error_handling": "strict", "kernels_to_convert": ["*"] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub error_handling: ErrorMode,
    /// Modules that have no index record and resolve to nothing.
    pub module_ignore_list: Vec<String>,
    pub remove_outdated_scopes: bool,
    /// `*`, kernel line numbers or kernel names.
    pub kernels_to_convert: Vec<String>,
    /// Extra headers for the native source file.
    pub includes: Vec<String>,
    pub fortran_module_preamble: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            error_handling: ErrorMode::default(),
            module_ignore_list: DEFAULT_IGNORED_MODULES
                .iter()
                .map(ToString::to_string)
                .collect(),
            remove_outdated_scopes: true,
            kernels_to_convert: vec!["*".to_string()],
            includes: Vec::new(),
            fortran_module_preamble: String::new(),
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            policy: ErrorPolicy::new(self.error_handling),
            module_ignore_list: self.module_ignore_list.clone(),
            remove_outdated_scopes: self.remove_outdated_scopes,
        }
    }

    /// Extraction settings for an input whose file name is `basename`.
    pub fn extract_options(&self, basename: &str) -> ExtractOptions {
        ExtractOptions {
            resolve: self.resolve_options(),
            selection: self
                .kernels_to_convert
                .iter()
                .map(|s| match s.parse::<KernelSelection>() {
                    Ok(selection) => selection,
                    Err(never) => match never {},
                })
                .collect(),
            basename: basename.to_string(),
            includes: self.includes.clone(),
            fortran_module_preamble: self.fortran_module_preamble.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.error_handling, ErrorMode::Lenient);
        assert!(config.module_ignore_list.iter().any(|m| m == "iso_c_binding"));
    }

    #[test]
    fn fields_override_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{ "error_handling": "strict", "kernels_to_convert": ["12", "axpy"],
                 "remove_outdated_scopes": false }"#,
        )
        .unwrap();
        let options = config.extract_options("axpy.f90");
        assert!(options.resolve.policy.is_strict());
        assert!(!options.resolve.remove_outdated_scopes);
        assert_eq!(
            options.selection,
            vec![
                KernelSelection::Line(12),
                KernelSelection::Name("axpy".to_string())
            ]
        );
        assert_eq!(options.basename, "axpy.f90");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result: Result<RunConfig, _> = serde_json::from_str(r#"{ "error_handling": "loud" }"#);
        assert!(result.is_err());
    }
}
