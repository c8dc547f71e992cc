//! Output assembly and file writing for generated code.
//!
//! This module handles the final phase of code generation: checking the
//! generated modules, formatting them and writing them to disk atomically.
//!
//! ## Safety Guarantees
//!
//! - **Validation**: every file is parsed with `syn` before writing
//! - **Formatting**: output is formatted with `prettyplease`
//! - **Atomic writes**: temp file + rename, so no partial file is ever
//!   observed and a failed artifact never replaces a valid one

use std::fs;
use std::io;
use std::path::Path;

use blueprint_define::ApiDefinition;
use colored::Colorize;
use proc_macro2::TokenStream;
use tracing::{debug, info, instrument, warn};

use crate::cargo_gen::{CARGO_TOML, render_cargo_toml};
use crate::codegen::{GeneratedModule, assemble_lib_rs, generate_modules, module_names};
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::validation::check_naming_collisions;

/// A formatted file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory, e.g. `src/lib.rs`.
    pub path: String,
    pub content: String,
}

/// Everything one generation run produced.
#[derive(Debug, Default)]
pub struct Generation {
    pub files: Vec<GeneratedFile>,
    /// One error per artifact that could not be generated.
    pub errors: Vec<GeneratorError>,
    /// Module files left out because their module failed.
    pub omitted: Vec<String>,
}

impl Generation {
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// `Ok` with the files when every artifact succeeded.
    ///
    /// ## Errors
    ///
    /// Returns the single artifact error, or `GeneratorError::Artifacts`
    /// when several failed.
    pub fn into_result(mut self) -> Result<Vec<GeneratedFile>, GeneratorError> {
        match self.errors.len() {
            0 => Ok(self.files),
            1 => Err(self.errors.remove(0)),
            _ => Err(GeneratorError::Artifacts(self.errors)),
        }
    }
}

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats generated code using prettyplease.
///
/// Prepends an auto-generated notice as a regular comment.
pub fn format_code(file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!(
        "// This code was automatically generated by blueprint-gen. Do not edit manually.\n\n{}",
        formatted
    )
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    if let Err(e) = fs::write(&temp_path, content) {
        // Never leave a half-written temp file behind.
        let _ = fs::remove_file(&temp_path);
        return Err(GeneratorError::WriteError {
            path: temp_path.display().to_string(),
            source: e,
        });
    }

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

fn remove_stale(path: &Path) -> Result<(), GeneratorError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GeneratorError::WriteError {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

fn render_module(module: &GeneratedModule) -> Result<GeneratedFile, GeneratorError> {
    let file = validate_code(&module.tokens)?;
    Ok(GeneratedFile {
        path: format!("src/{}.rs", module.name),
        content: format_code(&file),
    })
}

/// Generates and formats every file for `api` without touching the disk.
///
/// A module that fails to generate or parse is reported in
/// [`Generation::errors`] and left out of `lib.rs`; the other files are
/// still produced.
///
/// ## Errors
///
/// Fails outright only on an invalid configuration or when two design
/// names map to the same identifier.
#[instrument(skip_all, fields(api = %api.name))]
pub fn generate_files(api: &ApiDefinition, config: &GeneratorConfig) -> Result<Generation, GeneratorError> {
    let rt = config.runtime_path_tokens()?;
    check_naming_collisions(api)?;

    let (modules, mut errors) = generate_modules(api, &rt);
    let mut kept = Vec::with_capacity(modules.len());
    let mut files = Vec::with_capacity(modules.len() + 2);
    for module in modules {
        match render_module(&module) {
            Ok(file) => {
                files.push(file);
                kept.push(module);
            }
            Err(e) => {
                warn!(module = %module.name, error = %e, "generated module does not parse");
                errors.push(e.in_artifact(format!("file \"src/{}.rs\"", module.name)));
            }
        }
    }

    let omitted = module_names(api)
        .into_iter()
        .filter(|name| !kept.iter().any(|m| &m.name == name))
        .map(|name| format!("src/{name}.rs"))
        .collect();

    let lib = validate_code(&assemble_lib_rs(api, &kept))?;
    files.insert(
        0,
        GeneratedFile {
            path: "src/lib.rs".to_string(),
            content: format_code(&lib),
        },
    );

    if config.emit_cargo_toml {
        files.push(GeneratedFile {
            path: CARGO_TOML.to_string(),
            content: render_cargo_toml(api, config),
        });
    }

    info!(files = files.len(), failed = errors.len(), "generated files");
    Ok(Generation {
        files,
        errors,
        omitted,
    })
}

/// Generates all files for `api` and writes them under `output_dir`.
///
/// In dry-run mode the files are printed to stdout instead. Files that
/// were generated are written even when other artifacts failed, and the
/// file of a failed module left by an earlier run is removed so the
/// directory matches `lib.rs`.
///
/// ## Returns
///
/// The paths of the generated files, relative to `output_dir`.
///
/// ## Errors
///
/// Returns an error if:
/// - Any artifact failed to generate (after writing the others)
/// - File writing fails
pub fn generate_and_write(
    api: &ApiDefinition,
    config: &GeneratorConfig,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Vec<String>, GeneratorError> {
    let generation = generate_files(api, config)?;

    for file in &generation.files {
        if dry_run {
            println!("{}\n{}", format!("=== {} ===", file.path).bold().cyan(), file.content);
        } else {
            write_atomic(&output_dir.join(&file.path), &file.content)?;
        }
    }
    if !dry_run {
        for path in &generation.omitted {
            remove_stale(&output_dir.join(path))?;
        }
        info!(output = %output_dir.display(), "wrote generated crate");
    }

    let paths = generation.files.iter().map(|f| f.path.clone()).collect();
    generation.into_result().map(|_| paths)
}
