//! ScriptMeta CLI - Build Pipeline Adapter
//!
//! Commands: render, check, inject, contract
//! Outputs JSON to stdout
//! Returns non-zero on lint failure
//!
//! All file I/O lives here; the library stays a pure transformation.

use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use scriptmeta_core::{
    pipeline::ARTIFACT_SUFFIX, Artifact, InjectionPipeline, Linter, MetadataConfig, MinifyContract,
    BLOCK_OPEN,
};

#[derive(Parser)]
#[command(name = "scriptmeta-cli")]
#[command(about = "ScriptMeta CLI - Userscript Header Synthesizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the metadata document
    #[arg(short, long, default_value = "meta.json")]
    meta: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered header block
    Render,

    /// Lint the metadata document
    Check,

    /// Prepend the header to every *.user.js artifact in a directory
    Inject {
        /// Directory holding the build output
        #[arg(short, long, default_value = "dist")]
        dist: PathBuf,
    },

    /// Print the comment shapes the minifier must preserve
    Contract,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match MetadataConfig::load_from_file(&cli.meta) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load metadata: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Render => {
            let pipeline = InjectionPipeline::new(config);
            print!("{}", pipeline.render_header());
            ExitCode::SUCCESS
        }

        Commands::Check => {
            let result = Linter::new().check(&config);
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Lint failure
            }
        }

        Commands::Inject { dist } => {
            let artifacts = match collect_artifacts(&dist) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!(r#"{{"error": "Failed to read artifacts: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let pipeline = InjectionPipeline::new(config);
            let report = pipeline.inject_all(&artifacts);

            for injected in &report.artifacts {
                if let Err(e) = fs::write(dist.join(&injected.name), &injected.content) {
                    eprintln!(r#"{{"error": "Failed to write {}: {}"}}"#, injected.name, e);
                    return ExitCode::FAILURE;
                }
            }

            println!("{}", serde_json::to_string_pretty(&report).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Contract => {
            println!(
                "{}",
                serde_json::to_string_pretty(&MinifyContract::current()).unwrap()
            );
            ExitCode::SUCCESS
        }
    }
}

/// Enumerate qualifying artifacts in name order. Files that already start
/// with the opening delimiter are skipped, so re-running the command does
/// not stack a second header.
fn collect_artifacts(dist: &Path) -> Result<Vec<Artifact>, io::Error> {
    let mut names = vec![];
    if dist.exists() {
        for entry in fs::read_dir(dist)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(ARTIFACT_SUFFIX) {
                names.push(name);
            }
        }
    }
    names.sort();

    let mut artifacts = vec![];
    for name in names {
        let content = fs::read_to_string(dist.join(&name))?;
        if content.starts_with(BLOCK_OPEN) {
            warn!(artifact = %name, "header already present, skipping");
            continue;
        }
        artifacts.push(Artifact { name, content });
    }
    Ok(artifacts)
}
