//! Command-line entry point over `docmanager_core`.
//!
//! # Responsibility
//! - Check core linkage (`ping`).
//! - Run maintenance commands such as locale copy against a SQLite store.

use clap::{Parser, Subcommand};
use docmanager_core::{
    init_logging, open_db, CopyOutcome, DocumentManagerConfig, LocaleCopier, NodeStore,
    PropertyEncoder, SqliteNodeStore,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "docmanager", about = "Document manager maintenance commands")]
struct Cli {
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// JSON file with default locale and namespace prefixes.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core liveness and version.
    Ping,

    /// Copy one locale onto another for a subtree.
    LocaleCopy {
        /// SQLite database file.
        db: PathBuf,
        /// Absolute path of the subtree root, e.g. `/cmf/pages`.
        root: String,
        /// Source locale.
        src: String,
        /// Destination locale.
        dest: String,
        /// Replace destination properties that already exist.
        #[arg(long)]
        overwrite: bool,
        /// Report what would change without saving.
        #[arg(long)]
        dry_run: bool,
    },
}

struct LocaleCopyArgs<'a> {
    db: &'a Path,
    root: &'a str,
    src: &'a str,
    dest: &'a str,
    overwrite: bool,
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = docmanager_core::default_log_level();
        if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
            eprintln!("Logging error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let config = match &cli.config {
        Some(path) => match DocumentManagerConfig::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Config error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => DocumentManagerConfig::default(),
    };

    match cli.command {
        Command::Ping => {
            println!("docmanager_core ping={}", docmanager_core::ping());
            println!("docmanager_core version={}", docmanager_core::core_version());
            ExitCode::SUCCESS
        }
        Command::LocaleCopy {
            db,
            root,
            src,
            dest,
            overwrite,
            dry_run,
        } => run_locale_copy(
            &config,
            &LocaleCopyArgs {
                db: &db,
                root: &root,
                src: &src,
                dest: &dest,
                overwrite,
                dry_run,
            },
        ),
    }
}

fn run_locale_copy(config: &DocumentManagerConfig, args: &LocaleCopyArgs<'_>) -> ExitCode {
    match locale_copy(config, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_locale_copy module=cli status=error error={message}");
            eprintln!("Locale copy failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn locale_copy(config: &DocumentManagerConfig, args: &LocaleCopyArgs<'_>) -> Result<(), String> {
    let registry = config.namespace_registry().map_err(|err| err.to_string())?;
    let copier = LocaleCopier::new(PropertyEncoder::new(Arc::new(registry)));

    let conn = open_db(args.db).map_err(|err| err.to_string())?;
    let mut store = SqliteNodeStore::try_new(&conn).map_err(|err| err.to_string())?;

    let report = copier
        .copy(&mut store, args.root, args.src, args.dest, args.overwrite)
        .map_err(|err| err.to_string())?;

    for entry in &report {
        match entry.outcome {
            CopyOutcome::Processed => {
                println!("{} [processed] {} properties", entry.path, entry.copied)
            }
            outcome => println!("{} [{}]", entry.path, outcome),
        }
    }

    let processed = report
        .iter()
        .filter(|entry| entry.outcome == CopyOutcome::Processed)
        .count();
    if args.dry_run {
        println!("dry run: {processed} of {} nodes would change", report.len());
        return Ok(());
    }

    store.save().map_err(|err| err.to_string())?;
    info!(
        "event=cli_locale_copy module=cli status=ok root={} processed={}",
        args.root, processed
    );
    println!("copied {} to {} on {processed} of {} nodes", args.src, args.dest, report.len());
    Ok(())
}
