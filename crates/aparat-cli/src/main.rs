use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use aparat_infrastructure::FsAssetSource;

mod commands;
mod context;
mod display;
mod repl;

use context::AppContext;

#[derive(Parser)]
#[command(name = "aparat")]
#[command(about = "APARAT - one-credit product photo studio", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to config.toml (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep config, secrets, flags and exports under this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use the simulated gateway regardless of configuration
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Keep the generation lock in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive studio session (default)
    Repl,
    /// Render one photo and export it
    Render {
        /// Product photo to upload
        path: PathBuf,
    },
    /// Show the lock state and active configuration
    Status,
    /// Clear the generation lock
    Reset,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "aparat=debug" } else { "aparat=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let ctx = AppContext::build(&cli.global).await?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl::run(&ctx, ctx.session().await?).await?,
        Commands::Render { path } => render(&ctx, path).await?,
        Commands::Status => status(&ctx).await?,
        Commands::Reset => {
            ctx.credit_gate().reset().await?;
            display::success("Generation lock cleared. One credit available.");
        }
    }

    Ok(())
}

/// Landing -> Hub -> upload -> export in one go.
async fn render(ctx: &AppContext, path: PathBuf) -> Result<()> {
    let uc = ctx.session().await?;
    uc.start().await?;

    let source = FsAssetSource::new(path);
    display::info(&format!("Rendering {} ...", source.path().display()));
    let result = match uc.submit(&source).await {
        Ok(result) => result,
        Err(e) => {
            display::failure(&e);
            return Err(e.into());
        }
    };
    display::summary(&result);

    let exported = ctx
        .exporter
        .export(&result)
        .await
        .context("Failed to export the render")?;
    display::success(&format!("Saved {}", exported.display()));
    Ok(())
}

async fn status(ctx: &AppContext) -> Result<()> {
    let locked = ctx.credit_gate().is_persistently_locked().await?;
    let generation = &ctx.config.generation;

    let lock = if locked { "locked".red() } else { "open".green() };
    println!("{:<10} {}", "lock:".bright_black(), lock);
    let gateway = match ctx.gateway() {
        Ok(gateway) if gateway.is_simulated() => format!("{} (demo mode)", gateway.name()),
        Ok(gateway) => gateway.name().to_string(),
        Err(e) => format!("unavailable ({e})"),
    };
    println!("{:<10} {}", "gateway:".bright_black(), gateway);
    println!("{:<10} {}", "model:".bright_black(), generation.model);
    println!("{:<10} {}", "aspect:".bright_black(), generation.aspect_ratio);
    println!("{:<10} {}", "config:".bright_black(), ctx.config_path.display());
    match &ctx.flags_path {
        Some(path) => println!("{:<10} {}", "flags:".bright_black(), path.display()),
        None => println!("{:<10} {}", "flags:".bright_black(), "in memory"),
    }
    println!("{:<10} {}", "exports:".bright_black(), ctx.exporter.dir().display());
    Ok(())
}
