use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use fnapi_core::config::{self, CONFIG_FILE_NAME, FnapiConfig};
use fnapi_core::document;
use fnapi_core::manifest::Manifest;
use fnapi_core::ui::{self, UiOptions};
use fnapi_core::{CompileOptions, DocsService, OutputFormat, Registry, SpecVersion};

#[derive(Parser)]
#[command(name = "fnapi", about = "Compile handler metadata into OpenAPI documents", version)]
struct Cli {
    /// Config file to read defaults from
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a handler manifest into an OpenAPI document
    Generate(GenerateArgs),

    /// Validate an existing OpenAPI document
    Validate {
        /// Path to the OpenAPI document (YAML or JSON)
        input: PathBuf,
    },

    /// Write the Swagger UI page
    Ui {
        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// URL the page loads the OpenAPI document from
        #[arg(long)]
        spec_url: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize a new fnapi configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// Handler manifest (YAML or JSON)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// API title
    #[arg(long)]
    title: Option<String>,

    /// API version string
    #[arg(long)]
    api_version: Option<String>,

    /// OpenAPI version to emit (3.0.0 or 3.1.0)
    #[arg(long)]
    spec_version: Option<SpecVersion>,

    /// Output encoding (json or yaml)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            let cfg = try_load_config(&cli.config)?;
            cmd_generate(args, cfg)
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Ui {
            title,
            spec_url,
            output,
        } => cmd_ui(title, spec_url, output),

        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "fnapi", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config, falling back to defaults when it is absent.
fn try_load_config(path: &Path) -> Result<FnapiConfig> {
    Ok(config::load_config(path)?.unwrap_or_default())
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest = if is_json(path) {
        Manifest::from_json(&content)
    } else {
        Manifest::from_yaml(&content)
    };
    manifest.with_context(|| format!("invalid manifest {}", path.display()))
}

/// Write `content` to `output`, or print it when no output is given.
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

/// Compile the manifest and render it; flags win over config values.
fn render_document(args: &GenerateArgs, cfg: &FnapiConfig) -> Result<String> {
    let manifest_path = args.manifest.as_ref().unwrap_or(&cfg.manifest);
    let manifest = load_manifest(manifest_path)?;

    let registry = Registry::new();
    let count = manifest
        .register_into(&registry)
        .with_context(|| format!("failed to register handlers from {}", manifest_path.display()))?;
    log::info!("loaded {count} handlers from {}", manifest_path.display());

    let options = CompileOptions {
        title: args.title.clone().unwrap_or_else(|| cfg.title.clone()),
        version: args
            .api_version
            .clone()
            .unwrap_or_else(|| cfg.version.clone()),
        spec_version: args.spec_version.unwrap_or(cfg.spec_version),
    };
    let format = args.format.unwrap_or(cfg.format);
    let service = DocsService::from_config(&registry, cfg);
    Ok(service.render(&options, format)?)
}

fn cmd_generate(args: GenerateArgs, cfg: FnapiConfig) -> Result<()> {
    let rendered = render_document(&args, &cfg)?;
    let output = args.output.as_deref().or(cfg.output.as_deref());
    emit(&rendered, output)
}

fn cmd_validate(input: &Path) -> Result<()> {
    let content =
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;

    let parsed = if is_json(input) {
        document::from_json(&content)?
    } else {
        document::from_yaml(&content)?
    };

    eprintln!(
        "Valid OpenAPI {} document: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());
    let operations: usize = parsed.paths.values().map(|item| item.len()).sum();
    eprintln!("  Operations: {operations}");

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_ui(title: Option<String>, spec_url: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let defaults = UiOptions::default();
    let options = UiOptions {
        title: title.unwrap_or(defaults.title),
        spec_url: spec_url.unwrap_or(defaults.spec_url),
        custom_csp: None,
    };
    let html = ui::render_swagger_ui(&options)?;
    emit(&html, output.as_deref())
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
