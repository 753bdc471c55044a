use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info};
use winseat::attachment::{AttachmentOption, AttachmentParameters};
use winseat::common::channel::{channel, drain};
use winseat::common::config::{Config, config_file};
use winseat::common::log;
use winseat::seat::{Seat, SeatEvent};
use winseat::sys::geometry::{Point, Rect, Size};
use winseat::sys::keymap::StaticKeymap;
use winseat::sys::window::VirtualDisplay;

#[derive(Parser)]
#[command(name = "winseat")]
#[command(about = "Popup placement and seat input replay")]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute where a window of the given size goes
    Place(PlaceArgs),
    /// Feed a trace of compositor input through a seat and print what it emits
    Replay {
        /// JSON lines: one seat event or {"advance": MS} per line
        trace: PathBuf,
        /// TOML description of monitors, windows and outputs
        #[arg(long)]
        display: Option<PathBuf>,
    },
    /// Validate a config file
    CheckConfig { path: Option<PathBuf> },
}

#[derive(clap::Args)]
struct PlaceArgs {
    /// Start from a preset in the config file
    #[arg(long)]
    preset: Option<String>,
    #[arg(long, value_delimiter = ',', value_parser = parse_option)]
    primary: Vec<AttachmentOption>,
    #[arg(long, value_delimiter = ',', value_parser = parse_option)]
    secondary: Vec<AttachmentOption>,
    /// Attachment rectangle as X,Y,WIDTH,HEIGHT
    #[arg(long, allow_hyphen_values = true)]
    rect: Option<Rect>,
    /// Origin of the rectangle's coordinate space as X,Y
    #[arg(long, allow_hyphen_values = true)]
    origin: Option<Point>,
    /// Window size as WIDTHxHEIGHT
    #[arg(long)]
    size: Size,
    /// Area the window must stay inside, as X,Y,WIDTH,HEIGHT
    #[arg(long, allow_hyphen_values = true)]
    bounds: Option<Rect>,
    #[arg(long)]
    rtl: bool,
}

fn parse_option(s: &str) -> Result<AttachmentOption, String> {
    s.parse().map_err(|_| format!("unknown attachment option {s:?}"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceEntry {
    Advance { advance: u64 },
    Event(SeatEvent),
}

fn main() {
    let opt: Cli = Parser::parse();
    if let Err(e) = run(opt) {
        eprintln!("winseat: {e:#}");
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::read(path).with_context(|| format!("reading {}", path.display())),
        None if config_file().exists() => Config::read(&config_file()),
        None => Ok(Config::default()),
    }
}

fn setup(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = load_config(path)?;
    log::init_logging(&config.settings.log_filter);
    debug!(settings = ?config.settings, "Loaded config");
    Ok(config)
}

fn run(opt: Cli) -> anyhow::Result<()> {
    let config_path = opt.config.as_deref();
    match opt.command {
        Commands::Place(args) => place(&setup(config_path)?, args),
        Commands::Replay { trace, display } => replay(&setup(config_path)?, &trace, display.as_deref()),
        Commands::CheckConfig { path } => check_config(path.as_deref().or(config_path)),
    }
}

fn place(config: &Config, args: PlaceArgs) -> anyhow::Result<()> {
    let mut params = match &args.preset {
        Some(name) => config.preset(name)?.clone(),
        None => AttachmentParameters::new(),
    };
    params.add_primary_options(&args.primary);
    params.add_secondary_options(&args.secondary);
    if args.rect.is_some() {
        params.set_attachment_rectangle(args.rect);
    }
    if args.origin.is_some() {
        params.set_attachment_origin(args.origin);
    }
    if args.rtl {
        params.set_right_to_left(true);
    }

    let placement =
        params.choose_position(args.size, args.bounds).context("no placement")?;
    info!(?placement, "Placed");
    println!("{}", serde_json::to_string(&placement)?);
    Ok(())
}

fn replay(config: &Config, trace: &Path, display: Option<&Path>) -> anyhow::Result<()> {
    let display = match display {
        Some(path) => VirtualDisplay::parse(&std::fs::read_to_string(path)?)
            .with_context(|| format!("reading {}", path.display()))?,
        None => VirtualDisplay::default(),
    };
    let file = std::fs::File::open(trace).with_context(|| format!("opening {}", trace.display()))?;

    let (tx, mut rx) = channel();
    let mut seat = Seat::new(0, display, StaticKeymap::us(), config.settings.clone(), tx);
    let mut out = std::io::stdout().lock();

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: TraceEntry =
            serde_json::from_str(&line).with_context(|| format!("{}:{}", trace.display(), lineno + 1))?;
        match entry {
            TraceEntry::Advance { advance } => seat.advance_time(seat.now() + advance),
            TraceEntry::Event(event) => seat.handle_event(event),
        }
        for event in drain(&mut rx) {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    Ok(())
}

fn check_config(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file);
    let config = Config::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: ok", path.display());
        return Ok(());
    }
    for issue in &issues {
        println!("{issue}");
    }
    anyhow::bail!("{} issue(s) in {}", issues.len(), path.display())
}
