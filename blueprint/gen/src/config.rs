//! Generator configuration.

use syn::Path;

use crate::errors::GeneratorError;

/// Default crate path generated code imports the runtime from.
pub const DEFAULT_RUNTIME_CRATE: &str = "blueprint_types";

/// Settings controlling what the generator emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Rust path of the runtime crate in generated code, e.g.
    /// `blueprint_types` or `my_crate::runtime`.
    pub runtime_crate: String,
    /// Also write a `Cargo.toml` next to the generated `src/`.
    pub emit_cargo_toml: bool,
    /// Package name of the generated crate; defaults to the API name.
    pub package_name: Option<String>,
    /// Path dependency on the runtime crate used by the generated manifest.
    pub runtime_path: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            emit_cargo_toml: false,
            package_name: None,
            runtime_path: "../blueprint/types".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Parses [`runtime_crate`](Self::runtime_crate) as a Rust path.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` when it is not a valid path.
    pub fn runtime_path_tokens(&self) -> Result<Path, GeneratorError> {
        syn::parse_str(&self.runtime_crate).map_err(|e| {
            GeneratorError::ConfigError(format!(
                "runtime crate '{}' is not a valid path: {}",
                self.runtime_crate, e
            ))
        })
    }

    /// Package name for the generated crate.
    pub fn package_name_for(&self, api_name: &str) -> String {
        self.package_name
            .clone()
            .unwrap_or_else(|| format!("{}-service", api_name.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;

    #[test]
    fn default_runtime_path_parses() {
        let config = GeneratorConfig::default();
        let path = config.runtime_path_tokens().unwrap();
        assert_eq!(path.to_token_stream().to_string(), "blueprint_types");
    }

    #[test]
    fn nested_runtime_path_parses() {
        let config = GeneratorConfig {
            runtime_crate: "service::runtime".into(),
            ..GeneratorConfig::default()
        };
        assert!(config.runtime_path_tokens().is_ok());
    }

    #[test]
    fn invalid_runtime_path() {
        let config = GeneratorConfig {
            runtime_crate: "not a path".into(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.runtime_path_tokens(),
            Err(GeneratorError::ConfigError(_))
        ));
    }

    #[test]
    fn package_name_defaults_to_api_name() {
        let config = GeneratorConfig::default();
        assert_eq!(config.package_name_for("Cellar"), "cellar-service");
        let config = GeneratorConfig {
            package_name: Some("wine".into()),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.package_name_for("Cellar"), "wine");
    }
}
