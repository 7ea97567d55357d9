use anyhow::{Context, Result};
use clap::Parser;
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;

use hello_triangle::{
    app,
    config::{self, AppConfig, Overrides},
    context::Profile,
    demos,
    utils::AppError,
};

#[derive(Parser)]
#[command(name = "hello-triangle", about = "OpenGL hello-triangle tutorial programs")]
struct Cli {
    /// Demo to run (see --list).
    #[arg(default_value = demos::DEFAULT_DEMO)]
    demo: String,

    /// Print the available demos and exit.
    #[arg(long)]
    list: bool,

    /// Config file to read instead of the per-user default.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width in pixels.
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Window height in pixels.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Window title, replacing the demo's own.
    #[arg(long)]
    title: Option<String>,

    /// Requested OpenGL version, e.g. "3.3".
    #[arg(long, value_name = "MAJOR.MINOR")]
    gl_version: Option<String>,

    /// Context profile (core or compatibility).
    #[arg(long)]
    profile: Option<Profile>,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    no_vsync: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            title: self.title.clone(),
            vsync: self.no_vsync.then_some(false),
            gl_version: self.gl_version.clone(),
            profile: self.profile,
            log_level: self.log_level.clone(),
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => config::load_or_create_default().unwrap_or_else(|e| {
            log::warn!("Using built-in defaults: {}", e);
            AppConfig::default()
        }),
    };

    config.apply(cli.overrides())?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        for demo in demos::catalog() {
            println!("{:<16}{}", demo.name, demo.title);
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level()?);

    let demo = demos::find(&cli.demo).ok_or_else(|| AppError::UnknownDemo {
        name: cli.demo.clone(),
        available: demos::names().join(", "),
    })?;

    app::run(&demo, &config)?;
    Ok(())
}

fn main() -> ExitCode {
    // Filtering is narrowed through `log::set_max_level` once the config is known.
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Trace).init() {
        eprintln!("Failed to initialize logger: {e}");
        return ExitCode::FAILURE;
    }
    log::set_max_level(LevelFilter::Info);

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
