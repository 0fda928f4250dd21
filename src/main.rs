//! pwquality - main entry point
//!
//! Thin caller around the reconciliation engine: gathers desired parameters
//! from flags and an optional params file, runs one pass and reports.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use pwquality_conf::cli::{ApplyArgs, Cli, Commands};
use pwquality_conf::params::{KNOWN_PARAMETERS, PwqualityParams};
use pwquality_conf::engine::ensure_exists;
use pwquality_conf::{ApplyOptions, PwqualityError, ReconciliationResult, plan, read_config};

/// Initialize the logger; RUST_LOG overrides the default `info` level.
///
/// Logs go to stderr so stdout stays clean for `--json` output.
fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logger();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        if cli.json {
            let kind = e
                .downcast_ref::<PwqualityError>()
                .map(|err| err.kind().to_string());
            println!("{}", json!({ "failed": true, "msg": format!("{:#}", e), "kind": kind }));
        } else {
            eprintln!("✗ {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Apply(args) => run_apply(cli, args),
        Commands::Show => run_show(cli),
        Commands::Params => run_params(cli),
    }
}

fn load_params_file(path: &Path) -> Result<PwqualityParams> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {:?}", path))?;
    let params: PwqualityParams = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse parameters JSON in {:?}", path))?;
    Ok(params)
}

fn run_apply(cli: &Cli, args: &ApplyArgs) -> Result<()> {
    let base = match &args.params_file {
        Some(path) => {
            info!("Loading parameters from {:?}", path);
            load_params_file(path)?
        }
        None => PwqualityParams::default(),
    };
    let params = base.overlay(args.flag_params());

    let desired = params.to_desired();
    if desired.is_empty() {
        anyhow::bail!("No parameters given; see `pwquality apply --help`");
    }

    let plan = plan(&cli.config, &desired)?;

    let result = if cli.dry_run {
        info!("Dry run: {} change(s) not written", plan.changes().len());
        plan.preview()
    } else {
        if !plan.is_empty() && !nix::unistd::geteuid().is_root() {
            warn!(
                "Not running as root; writing {} may be refused",
                cli.config.display()
            );
        }
        plan.apply(ApplyOptions {
            backup: params.backup,
        })?
    };

    print_result(cli, &result)
}

fn print_result(cli: &Cli, result: &ReconciliationResult) -> Result<()> {
    if cli.json {
        let out = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        println!("{}", out);
        return Ok(());
    }

    let path = cli.config.display();
    if !result.changed {
        println!("✓ {} already matches the requested parameters", path);
        return Ok(());
    }

    if cli.dry_run {
        println!("Would update {} setting(s) in {}:", result.changes.len(), path);
    } else {
        println!("✓ Updated {} setting(s) in {}:", result.changes.len(), path);
    }
    for (key, value) in result.changes.iter() {
        println!("  {} = {}", key, value);
    }
    if let Some(backup) = &result.backup_file {
        println!("Backup saved to {}", backup.display());
    }
    Ok(())
}

fn run_show(cli: &Cli) -> Result<()> {
    ensure_exists(&cli.config)?;
    let parsed = read_config(&cli.config)?;

    if cli.json {
        let out = serde_json::to_string_pretty(&parsed.current)
            .context("Failed to serialize configuration")?;
        println!("{}", out);
    } else {
        println!("Current {} content:", cli.config.display());
        print!("{}", parsed.to_text());
    }
    Ok(())
}

fn run_params(cli: &Cli) -> Result<()> {
    if cli.json {
        let list: Vec<_> = KNOWN_PARAMETERS
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "key": p.file_key(),
                    "type": p.kind.to_string(),
                    "description": p.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for p in KNOWN_PARAMETERS {
        let key = if p.file_key() == p.name {
            String::new()
        } else {
            format!(" (written as {})", p.file_key())
        };
        println!("{:<18} {:<5} {}{}", p.name, p.kind.to_string(), p.description, key);
    }
    Ok(())
}
