//! Cargo.toml generation for a standalone generated crate.

use blueprint_define::ApiDefinition;

use crate::config::GeneratorConfig;

/// File name of the manifest, relative to the output directory.
pub const CARGO_TOML: &str = "Cargo.toml";

/// Renders the manifest of the generated crate.
///
/// The crate depends only on the runtime, through a path dependency.
///
/// ## Examples
///
/// ```
/// use blueprint_define::ApiDefinition;
/// use blueprint_gen::cargo_gen::render_cargo_toml;
/// use blueprint_gen::config::GeneratorConfig;
///
/// let manifest = render_cargo_toml(&ApiDefinition::new("cellar"), &GeneratorConfig::default());
/// assert!(manifest.contains("name = \"cellar-service\""));
/// ```
pub fn render_cargo_toml(api: &ApiDefinition, config: &GeneratorConfig) -> String {
    let name = config.package_name_for(&api.name);
    let description = api
        .title
        .as_deref()
        .unwrap_or(&api.name)
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!(
        r#"# This file was automatically generated by blueprint-gen. Do not edit manually.

[package]
name = "{name}"
version = "0.1.0"
edition = "2024"
description = "{description}"
publish = false

[dependencies]
blueprint-types = {{ path = "{runtime}" }}
"#,
        runtime = config.runtime_path.replace('\\', "/"),
    )
}
