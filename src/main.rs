//! `suite-orchestrator` binary
//!
//! Loads configuration (CLI > environment > file > defaults), runs the
//! suite and exits 0 on success, 1 otherwise.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use suite_orchestrator::cli::{Args, Command, ConfigAction, ListArgs, RunArgs};
use suite_orchestrator::config::{find_config_file, print_env_help, EnvConfig, SuiteConfig};
use suite_orchestrator::control::InterruptAction;
use suite_orchestrator::models::ModulePlan;
use suite_orchestrator::output::{OutputFormat, ResultFormatter};
use suite_orchestrator::results::ResultStore;
use suite_orchestrator::utils::{init_logger, LogLevel};
use suite_orchestrator::SuiteOrchestrator;

/// Conventional exit code for a SIGINT-terminated process
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(LogLevel::from_verbose(args.verbose));

    match args.command {
        Command::Run(run_args) => {
            let code = run_suite(run_args).await?;
            std::process::exit(code);
        }
        Command::List(list_args) => list_modules(list_args),
        Command::Config(config_args) => match config_args.action {
            ConfigAction::Show { config, env_help } => show_config(config.as_deref(), env_help)?,
            ConfigAction::Init { path, force } => init_config(&path, force)?,
        },
    }

    Ok(())
}

/// Load file configuration, then apply environment overrides
fn load_config(explicit: Option<&str>) -> Result<SuiteConfig> {
    let env = EnvConfig::load()?;

    let path = explicit
        .map(PathBuf::from)
        .or_else(|| env.config_file.as_deref().map(PathBuf::from))
        .or_else(find_config_file);

    let mut config = match path {
        Some(path) => {
            info!("Using config file {}", path.display());
            SuiteConfig::load(&path)?
        }
        None => SuiteConfig::default(),
    };

    env.apply(&mut config)?;
    Ok(config)
}

async fn run_suite(args: RunArgs) -> Result<i32> {
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", args.format))?;

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config)?;
    let thresholds = config.quality_thresholds.clone();

    let orchestrator = SuiteOrchestrator::from_config(config)?;

    let stop = orchestrator.emergency_stop();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match stop.on_interrupt() {
                InterruptAction::FinishCurrentModule => {
                    warn!("Interrupt received, finishing the current module (Ctrl-C again to abort)")
                }
                InterruptAction::Exit => {
                    warn!("Interrupted, exiting");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        }
    });

    let result = orchestrator.execute().await?;

    let formatter = ResultFormatter::new(format).with_thresholds(&thresholds);
    println!("{}", formatter.format_result(&result));

    let store = match (&args.output, args.save) {
        (Some(path), _) => Some(ResultStore::new(path)),
        (None, true) => Some(ResultStore::default_dir()),
        (None, false) => None,
    };
    if let Some(store) = store {
        let path = store.save(&result)?;
        println!("Results saved to {}", path.display());
    }

    Ok(result.exit_code())
}

fn list_modules(args: ListArgs) {
    println!("\nTest modules (execution order):");
    println!("─────────────────────────────────────────────");

    for (index, descriptor) in ModulePlan::standard().descriptors().iter().enumerate() {
        if args.detailed {
            println!(
                "  {}. {:15} {:25} phase: {}",
                index + 1,
                descriptor.kind.name(),
                descriptor.kind.title(),
                descriptor.phase
            );
        } else {
            println!("  {}. {}", index + 1, descriptor.kind.name());
        }
    }

    println!("\nAliases: auth, access, chat, ui, ux, perf, sec");
}

fn show_config(explicit: Option<&str>, env_help: bool) -> Result<()> {
    if env_help {
        print_env_help();
        return Ok(());
    }

    let config = load_config(explicit)?;
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
    println!("{yaml}");
    Ok(())
}

fn init_config(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        bail!("{path} already exists (use --force to overwrite)");
    }

    SuiteConfig::example().save(path)?;
    println!("Wrote example configuration to {path}");
    Ok(())
}
