use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subcap::captions::{FixedConfidence, LineShaper, RandomConfidence, Shaper, WordShaper};
use subcap::config::{self, ConfidenceMode, Layout};
use subcap::convert::{self, Converter};

#[derive(Parser)]
#[command(name = "subcap")]
#[command(about = "Convert SubRip subtitles into caption JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One caption per subtitle, timed in seconds
    Lines {
        #[command(flatten)]
        run: RunArgs,
    },

    /// One caption per word, timed in milliseconds
    Words {
        #[command(flatten)]
        run: RunArgs,

        /// Fixed confidence for every word instead of a random one
        #[arg(long, value_parser = parse_confidence)]
        confidence: Option<f64>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Subtitle files or directories (default: <ROOT>/public)
    paths: Vec<PathBuf>,

    /// Directory that relative paths resolve against (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Where JSON files are written (default: <ROOT>/public)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration profile or file path
    #[arg(short, long)]
    profile: Option<String>,

    /// Keep the input directory structure in the output directory
    #[arg(long)]
    mirror: bool,
}

fn parse_confidence(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    ConfidenceMode::fixed(value)
        .map(|_| value)
        .map_err(|e| e.to_string())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subcap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (run, confidence, words) = match cli.command {
        Commands::Lines { run } => (run, None, false),
        Commands::Words { run, confidence } => (run, confidence, true),
    };

    let mut app_config = config::load_app_config().context("Failed to load app config")?;
    if let Some(p) = &run.profile {
        let profile_path = config::resolve_profile_path(p)?;
        let profile =
            config::load_config_file(&profile_path).context("Failed to load profile")?;
        app_config = app_config.merge(profile);
    }

    // command line wins over config files
    if let Some(dir) = run.output_dir {
        app_config.output_dir = Some(dir);
    }
    if run.mirror {
        app_config.layout = Some(Layout::Mirror);
    }
    if let Some(value) = confidence {
        app_config.confidence = Some(ConfidenceMode::Fixed(value));
    }

    let root = match run.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let settings = app_config.into_settings(root);

    let shaper: Box<dyn Shaper> = if words {
        match settings.confidence {
            ConfidenceMode::Random => Box::new(WordShaper::new(RandomConfidence)),
            ConfidenceMode::Fixed(value) => Box::new(WordShaper::new(FixedConfidence(value))),
        }
    } else {
        Box::new(LineShaper)
    };

    let mut converter = Converter::new(&settings, shaper);
    convert::run(&settings, &run.paths, &mut converter)?;
    println!("{}", converter.summary());

    Ok(())
}
