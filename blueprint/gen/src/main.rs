//! Blueprint Code Generator
//!
//! Generates a typed Rust service crate from a registered design.

use std::path::Path;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use blueprint_definitions::{DESIGN_NAMES, design};
use blueprint_gen::config::GeneratorConfig;
use blueprint_gen::errors::GeneratorError;
use blueprint_gen::output::generate_and_write;

/// Blueprint code generator - transforms designs into typed Rust services
#[derive(Parser, Debug)]
#[command(name = "blueprint-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Design to generate code for (e.g., "cellar")
    #[arg(short, long)]
    design: String,

    /// Output directory of the generated crate
    #[arg(short, long, default_value = "generated")]
    output: String,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Also emit a Cargo.toml for a standalone crate
    #[arg(long)]
    cargo: bool,

    /// Package name of the generated crate
    #[arg(long)]
    name: Option<String>,

    /// Rust path of the runtime crate in generated code
    #[arg(long, default_value = blueprint_gen::config::DEFAULT_RUNTIME_CRATE)]
    runtime_crate: String,

    /// Print the finalized design as JSON and exit
    #[arg(long)]
    print_design: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(registry) = design(&cli.design) else {
        return Err(GeneratorError::ConfigError(format!(
            "Unknown design: '{}'. Available designs: {}",
            cli.design,
            DESIGN_NAMES.join(", ")
        )));
    };
    let api = registry.run()?;
    debug!(
        resources = api.resources.len(),
        media_types = api.media_types.len(),
        user_types = api.user_types.len(),
        "design loaded"
    );

    if cli.print_design {
        let json = serde_json::to_string_pretty(&api)
            .map_err(|e| GeneratorError::CodeGenError(format!("Cannot serialize design: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    let mut config = GeneratorConfig {
        runtime_crate: cli.runtime_crate,
        emit_cargo_toml: cli.cargo,
        package_name: cli.name,
        ..GeneratorConfig::default()
    };
    if cli.cargo {
        config.runtime_path = workspace_runtime_path();
    }

    let output_dir = Path::new(&cli.output);
    let written = generate_and_write(&api, &config, output_dir, cli.dry_run)?;
    if !cli.dry_run {
        info!(files = written.len(), output = %output_dir.display(), "generation complete");
    }

    Ok(())
}

// Absolute path of the runtime crate next to this one.
fn workspace_runtime_path() -> String {
    let runtime = Path::new(env!("CARGO_MANIFEST_DIR")).join("../types");
    std::path::absolute(&runtime)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| GeneratorConfig::default().runtime_path)
}
