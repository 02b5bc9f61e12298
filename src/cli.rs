//! Command-line interface
//!
//! - `generate`: build a spacer program from part dimensions
//! - `verify`: check a program for crashes, bore steps and dimensions
//! - `feasibility`: check part dimensions against the lathe standards
//! - `config`: write or show the configuration file

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};

use spacerkit_camtools::ProgramGenerator;
use spacerkit_core::{
    Diagnostic, FeedMode, LatheConfig, LatheId, LatheMatch, PartSpecBuilder, SpacerType,
    StandardsMatrix, ThicknessKey,
};
use spacerkit_settings::{default_config_path, Config, FileFormat};
use spacerkit_verifier::{FeasibilityValidator, PartMetadata, ProgramVerifier};

/// Exit code when a program or part has critical findings
pub const EXIT_CRITICAL: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "spacerkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
#[command(about = "G-code generation and verification for lathe wheel spacers", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true, env = "SPACERKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a spacer program
    Generate(GenerateArgs),

    /// Verify a program file ("-" reads stdin)
    Verify(VerifyArgs),

    /// Check part dimensions against the lathe standards
    Feasibility(FeasibilityArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination (default: the platform config path)
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show,
}

/// Report rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One finding per line
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Program number (O-number)
    #[arg(short, long)]
    pub program_number: u32,

    /// Header comment (default: built from the dimensions)
    #[arg(long)]
    pub title: Option<String>,

    /// Round size, inches
    #[arg(short, long)]
    pub round: f64,

    /// Thickness key, e.g. 1.25 or 15MM
    #[arg(short, long)]
    pub thickness: String,

    /// Center bore, mm
    #[arg(long)]
    pub cb: f64,

    /// Lathe (default: the only lathe that runs the round size)
    #[arg(short, long)]
    pub lathe: Option<String>,

    /// Spacer type
    #[arg(long = "type", default_value = "standard")]
    pub spacer_type: SpacerType,

    /// Outer bore (hub OD), mm
    #[arg(long)]
    pub ob: Option<f64>,

    /// Hub height, inches
    #[arg(long)]
    pub hub_height: Option<f64>,

    /// Counterbore diameter, mm
    #[arg(long)]
    pub counterbore: Option<f64>,

    /// Counterbore depth, inches
    #[arg(long)]
    pub counterbore_depth: Option<f64>,

    /// Add the shop fit tolerance to CB and OB
    #[arg(long)]
    pub tolerancing: bool,

    /// Feed/speed source
    #[arg(long, default_value = "proven")]
    pub feed_mode: FeedMode,

    /// Verify the generated program and fail on critical findings
    #[arg(long)]
    pub check: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Program file
    pub file: PathBuf,

    /// Write the corrected program here when a fix was applied
    #[arg(long, value_name = "PATH")]
    pub fix: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub part: PartArgs,
}

#[derive(Debug, Args)]
pub struct FeasibilityArgs {
    /// Report format
    #[arg(long, value_enum, default_value_t)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub part: PartArgs,
}

/// Part dimensions, all optional
#[derive(Debug, Default, Args)]
pub struct PartArgs {
    /// Round size, inches
    #[arg(long)]
    pub round: Option<f64>,

    /// Thickness key, e.g. 1.25 or 15MM
    #[arg(long)]
    pub thickness: Option<ThicknessKey>,

    /// Center bore, mm
    #[arg(long)]
    pub cb: Option<f64>,

    /// Outer bore (hub OD), mm
    #[arg(long)]
    pub ob: Option<f64>,

    /// Hub height, inches
    #[arg(long)]
    pub hub_height: Option<f64>,

    /// Counterbore diameter, mm
    #[arg(long)]
    pub counterbore: Option<f64>,

    /// Lathe
    #[arg(long)]
    pub lathe: Option<LatheId>,

    /// Spacer type
    #[arg(long = "type")]
    pub spacer_type: Option<SpacerType>,
}

impl PartArgs {
    /// Metadata, or `None` when no dimension was given
    pub fn metadata(&self) -> Option<PartMetadata> {
        let metadata = PartMetadata {
            round_size: self.round,
            thickness: self.thickness.as_ref().map(ThicknessKey::inches),
            cb_mm: self.cb,
            ob_mm: self.ob,
            hub_height: self.hub_height,
            counterbore_mm: self.counterbore,
            lathe: self.lathe,
            spacer_type: self.spacer_type,
        };
        (metadata != PartMetadata::default()).then_some(metadata)
    }
}

/// Load the configuration named on the command line, or the default file
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match default_config_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            Err(e) => {
                warn!(error = %e, "no config directory, using defaults");
                Ok(Config::default())
            }
        },
    }
}

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<ExitCode> {
    let Cli {
        config: config_path,
        command,
        ..
    } = cli;
    let load = || {
        let config = load_config(config_path.as_deref())?;
        debug!(?config, "configuration loaded");
        Ok::<_, anyhow::Error>(config)
    };

    match command {
        Commands::Generate(args) => generate(&load()?, args),
        Commands::Verify(args) => verify(&load()?, args),
        Commands::Feasibility(args) => feasibility(&load()?, args),
        Commands::Config {
            action: ConfigAction::Show,
        } => show_config(&load()?),
        Commands::Config {
            action: ConfigAction::Init { path, force },
        } => init_config(path.or_else(|| config_path.clone()), force),
    }
}

/// Lathe for a round size when none was named
pub fn resolve_lathe(standards: &StandardsMatrix, round_size: f64) -> Result<LatheId> {
    match standards.lathes_for_round(round_size) {
        LatheMatch::Unique(lathe) => Ok(lathe),
        LatheMatch::Ambiguous(lathes) => {
            let names: Vec<String> = lathes.iter().map(ToString::to_string).collect();
            bail!(
                "{}in rounds run on {}; pick one with --lathe",
                round_size,
                names.join(" or ")
            )
        }
        LatheMatch::Unsupported => bail!("no lathe runs {}in rounds", round_size),
    }
}

fn generate(config: &Config, args: GenerateArgs) -> Result<ExitCode> {
    let standards = config.load_standards().context("Failed to load standards")?;
    let lathe = match args.lathe {
        Some(lathe) => lathe,
        None => resolve_lathe(&standards, args.round)?.to_string(),
    };

    let mut builder = PartSpecBuilder::new()
        .program_number(args.program_number)
        .round_size(args.round)
        .thickness(args.thickness)
        .cb_mm(args.cb)
        .lathe(lathe)
        .spacer_type(args.spacer_type)
        .tolerancing(args.tolerancing)
        .feed_mode(args.feed_mode);
    builder.title = args.title;
    builder.outer_bore_mm = args.ob;
    builder.hub_height = args.hub_height;
    builder.counterbore_mm = args.counterbore;
    builder.counterbore_depth = args.counterbore_depth;

    let generator = ProgramGenerator::new(config.generator.clone())
        .with_lathes(standards.lathe_config(LatheConfig::standard()));
    let spec = builder
        .build(generator.tuning())
        .context("Invalid part dimensions")?;
    let text = generator
        .generate(&spec)
        .with_context(|| format!("Failed to generate O{:05}", spec.program_number))?;

    let mut code = ExitCode::SUCCESS;
    if args.check {
        let verifier = ProgramVerifier::new(config.verifier.clone(), &standards);
        let report = verifier.verify(&text, Some(&PartMetadata::from(&spec)));
        // stdout may be carrying the program
        for diagnostic in &report.diagnostics {
            eprintln!("{}", diagnostic);
        }
        if report.has_critical() {
            code = ExitCode::from(EXIT_CRITICAL);
        }
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), program = spec.program_number, "program written");
        }
        None => print!("{}", text),
    }
    Ok(code)
}

fn read_program(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read program from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn verify(config: &Config, args: VerifyArgs) -> Result<ExitCode> {
    let standards = config.load_standards().context("Failed to load standards")?;
    let text = read_program(&args.file)?;
    let metadata = args.part.metadata();

    let verifier = ProgramVerifier::new(config.verifier.clone(), &standards);
    let report = verifier.verify(&text, metadata.as_ref());

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            print_diagnostics(&report.diagnostics);
            if report.diagnostics.is_empty() {
                println!("{}: no findings", args.file.display());
            }
        }
    }

    if let (Some(path), Some(fixed)) = (&args.fix, &report.fixed_text) {
        std::fs::write(path, fixed)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "corrected program written");
    }

    Ok(if report.has_critical() {
        ExitCode::from(EXIT_CRITICAL)
    } else {
        ExitCode::SUCCESS
    })
}

fn feasibility(config: &Config, args: FeasibilityArgs) -> Result<ExitCode> {
    let standards = config.load_standards().context("Failed to load standards")?;
    let Some(metadata) = args.part.metadata() else {
        bail!("no part dimensions given");
    };

    let report = FeasibilityValidator::new(&standards).validate(&metadata);
    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            print_diagnostics(&report.diagnostics());
            println!("{}", if report.feasible { "feasible" } else { "NOT feasible" });
        }
    }

    Ok(if report.feasible {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_CRITICAL)
    })
}

fn init_config(dest: Option<PathBuf>, force: bool) -> Result<ExitCode> {
    let dest = match dest {
        Some(dest) => dest,
        None => default_config_path().context("No config directory on this platform")?,
    };
    if dest.exists() && !force {
        bail!("{} exists; use --force to replace it", dest.display());
    }
    Config::default()
        .save_to_file(&dest)
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    println!("wrote {}", dest.display());
    Ok(ExitCode::SUCCESS)
}

fn show_config(config: &Config) -> Result<ExitCode> {
    print!("{}", config.to_string_pretty(FileFormat::Toml)?);
    Ok(ExitCode::SUCCESS)
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        println!("{}", diagnostic);
    }
}
