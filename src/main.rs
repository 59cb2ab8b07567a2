//! idiff: compare two container images
//!
//! Diffs build history, filesystem contents, or installed apt and npm
//! packages between two images.

#![allow(clippy::struct_excessive_bools)]

use anyhow::{Context, Result};
use clap::Parser;
use idiff::{
    cli::{self, UsageError},
    config::{
        AppConfig, ConfigPreset, DiffConfig, DiffSources, Validatable, generate_full_example_config,
        generate_json_schema, load_or_default,
    },
    pipeline::exit_codes,
    reports::ReportFormat,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "idiff")]
#[command(version)]
#[command(about = "Compare two container images", long_about = None)]
#[command(after_help = "DIFFERS:
    hist (history)    Build history steps (default)
    dir (fs, file)    Filesystem entries and contents
    apt               Debian packages from the dpkg database
    node              npm packages across layers

EXIT CODES:
    0  Success
    1  Changes detected, or entries not compared (with --fail-on-change)
    2  Usage error
    3  Error occurred, or entries not compared

EXAMPLES:
    # Compare the build history of two local images
    idiff 3f2a9c1e8b7d 8e1b2c3d4f5a

    # Compare installed npm packages of two tags as JSON
    idiff registry.example.com/app:1.0 registry.example.com/app:1.1 node --json

    # Compare two saved archives in a CI job
    idiff old.tar new.tar dir --preset ci-cd")]
struct Cli {
    /// Two image IDs, references, `docker save` archives or extracted
    /// archive directories, followed by an optional differ
    #[arg(value_name = "IMAGE1 IMAGE2 [DIFFER]")]
    args: Vec<String>,

    /// Output the diff as JSON
    #[arg(long)]
    json: bool,

    /// Output format
    #[arg(short, long)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Configuration preset (default, ci-cd, summary)
    #[arg(long)]
    preset: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long)]
    no_color: bool,

    /// Exit with code 1 if the images differ or an entry cannot be compared
    #[arg(long)]
    fail_on_change: bool,

    /// Abort on the first file that cannot be compared
    #[arg(long)]
    fail_fast: bool,

    /// Leave extracted images on disk after the run
    #[arg(long)]
    keep_extracted: bool,

    /// Directory to extract images into
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Docker CLI binary used to save and pull images
    #[arg(long, env = "IDIFF_DOCKER")]
    docker: Option<String>,

    /// Print a commented example configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Print the JSON schema of the configuration file and exit
    #[arg(long)]
    config_schema: bool,
}

impl Cli {
    /// Settings given on the command line, as a config layer.
    fn overrides(&self) -> AppConfig {
        let mut config = AppConfig::default();
        if self.json {
            config.output.format = ReportFormat::Json;
        } else if let Some(format) = self.output {
            config.output.format = format;
        }
        config.output.file.clone_from(&self.output_file);
        config.output.no_color = self.no_color;
        config.behavior.quiet = self.quiet;
        config.behavior.fail_on_change = self.fail_on_change;
        config.behavior.fail_fast = self.fail_fast;
        config.acquisition.keep_extracted = self.keep_extracted;
        config.acquisition.work_dir.clone_from(&self.work_dir);
        if let Some(docker) = &self.docker {
            config.acquisition.docker_binary.clone_from(docker);
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if let Some(usage) = e.downcast_ref::<UsageError>() {
                eprintln!("{usage}");
                exit_codes::USAGE
            } else {
                eprintln!("Error: {e:#}");
                exit_codes::ERROR
            }
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    if cli.init_config {
        print!("{}", generate_full_example_config());
        return Ok(exit_codes::SUCCESS);
    }
    if cli.config_schema {
        println!("{}", generate_json_schema()?);
        return Ok(exit_codes::SUCCESS);
    }

    let (image1, image2, kind) = cli::parse_positionals(&cli.args)?;

    let mut app = match &cli.preset {
        Some(name) => AppConfig::from_preset(ConfigPreset::from_name(name).ok_or_else(|| {
            let valid: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
            UsageError::UnknownPreset(format!(
                "Unknown preset: {name}. Valid presets: {}",
                valid.join(", ")
            ))
        })?),
        None => AppConfig::default(),
    };
    let (file_config, loaded_from) = load_or_default(cli.config.as_deref());
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    app.merge(&file_config);
    app.merge(&cli.overrides());

    let errors = app.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("invalid configuration:\n  {}", details.join("\n  "));
    }

    let config = DiffConfig::from_app(DiffSources { image1, image2 }, kind, app);
    cli::run_diff(config).context("diff failed")
}
