//! Error types for the blueprint generator.

use blueprint_define::RunError;
use thiserror::Error;

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The design failed to evaluate or validate.
    #[error(transparent)]
    Design(#[from] RunError),

    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Generating one output file failed; other files are unaffected.
    #[error("Failed to generate {element}: {source}")]
    Artifact {
        /// The resource, action, media type or file that failed.
        element: String,
        #[source]
        source: Box<GeneratorError>,
    },

    /// Several artifacts failed.
    #[error("{} artifact(s) failed:\n{}", .0.len(), join_errors(.0))]
    Artifacts(Vec<GeneratorError>),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Two design names map to the same Rust identifier.
    #[error(
        "Naming collision in {scope}: '{first}' and '{second}' both generate '{ident}'"
    )]
    NamingCollision {
        /// Where the collision happens, e.g. `resource "bottle" params`.
        scope: String,
        first: String,
        second: String,
        /// The identifier both names map to.
        ident: String,
    },
}

impl GeneratorError {
    /// Wraps `self` as the failure of `element`.
    pub fn in_artifact(self, element: impl Into<String>) -> Self {
        GeneratorError::Artifact {
            element: element.into(),
            source: Box::new(self),
        }
    }
}

fn join_errors(errors: &[GeneratorError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
