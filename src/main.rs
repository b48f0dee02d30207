//! Rote - Adaptive recall drill over key-value knowledge sets
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rote::config::{rote_home, Config};
use rote::error::exit_codes;
use rote::storage::{FileCompletionLog, FileSetStore};

// =============================================================================
// CLI Definition
// =============================================================================

/// Rote - Adaptive recall drill over key-value knowledge sets
#[derive(Parser)]
#[command(name = "rote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drill a knowledge set through Practice, Quiz, and Final
    Run {
        /// Set id to drill (defaults to drill.default_set from config)
        set: Option<String>,
        /// Output the final summary as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress the final summary
        #[arg(long, short)]
        quiet: bool,
        /// Sleep through review pauses, showing a countdown
        #[arg(long)]
        wait: bool,
    },

    /// List stored knowledge sets
    Sets {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Maximum number of sets to show
        #[arg(long, short, default_value = "50")]
        limit: usize,
    },

    /// Show one knowledge set in full
    Show {
        /// Set id to show
        set: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Build a knowledge set from a word list file
    Build {
        /// Id for the new set
        set: String,
        /// Word list file, one candidate per line
        #[arg(long)]
        from: PathBuf,
        /// Replace the set if it already exists
        #[arg(long, short)]
        force: bool,
        /// Maximum accepted values per key
        #[arg(long, default_value = "5")]
        values_per_key: usize,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Add, replace, or remove a key in a stored set
    Edit {
        /// Set id to edit
        set: String,
        /// Key to add, replace, or remove
        #[arg(long, short)]
        key: String,
        /// Comma-separated accepted values for the key
        #[arg(long, value_delimiter = ',')]
        values: Vec<String>,
        /// Remove the key instead of writing values
        #[arg(long)]
        remove_key: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Delete a stored knowledge set
    Drop {
        /// Set id to delete
        set: String,
        /// Actually delete
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List completed sessions, newest first
    Results {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Maximum number of records to show (defaults to history.limit)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Initialize Rote directories and project config
    Init {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Rewrite the project config file even if it exists
        #[arg(long, short)]
        force: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    // Set up panic handler
    setup_panic_handler();

    // Run the CLI
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("rote error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.rote/crash.log and exits with code 3, so a crash is
/// both visible and distinguishable from an ordinary command failure.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        // Log to stderr
        eprintln!("rote panic: {}", info);

        // Try to log to crash file
        if let Some(home) = rote_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        // Exit with crash code
        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Run {
            set,
            json,
            quiet,
            wait,
        } => run_drill(set, json, quiet, wait),
        Commands::Sets { json, quiet, limit } => run_sets(json, quiet, limit),
        Commands::Show { set, json, quiet } => run_show(&set, json, quiet),
        Commands::Build {
            set,
            from,
            force,
            values_per_key,
            json,
            quiet,
        } => run_build(&set, &from, force, values_per_key, json, quiet),
        Commands::Edit {
            set,
            key,
            values,
            remove_key,
            json,
            quiet,
        } => run_edit(&set, &key, values, remove_key, json, quiet),
        Commands::Drop {
            set,
            force,
            json,
            quiet,
        } => run_drop(&set, force, json, quiet),
        Commands::Results { json, quiet, limit } => run_results(json, quiet, limit),
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn run_drill(
    set: Option<String>,
    json: bool,
    quiet: bool,
    wait: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::run::{RunCommand, RunOptions};

    let config = Config::load();
    let set_id = match set.or_else(|| config.drill.default_set.clone()) {
        Some(id) => id,
        None => {
            eprintln!("rote error: no set given and no drill.default_set configured");
            return Ok(ExitCode::from(exit_codes::ERROR as u8));
        }
    };

    let store = FileSetStore::new()?;
    let log = FileCompletionLog::new()?;

    let cmd = RunCommand::new(store, log);
    let options = RunOptions {
        json,
        quiet,
        set_id,
        wait,
        poll_interval_ms: config.drill.poll_interval_ms,
    };

    let mut input = std::io::stdin().lock();
    let mut out = std::io::stdout();
    let output = cmd.run(&options, &mut input, &mut out);

    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_sets(json: bool, quiet: bool, limit: usize) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::sets::{SetsCommand, SetsOptions};

    let store = FileSetStore::new()?;

    let cmd = SetsCommand::new(store);
    let options = SetsOptions { json, quiet, limit };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_show(set: &str, json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::show::{ShowCommand, ShowOptions};

    let store = FileSetStore::new()?;

    let cmd = ShowCommand::new(store);
    let options = ShowOptions {
        json,
        quiet,
        set_id: set.to_string(),
    };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_build(
    set: &str,
    from: &Path,
    force: bool,
    values_per_key: usize,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::build::{BuildCommand, BuildOptions};
    use rote::suggest::WordListProvider;

    let store = FileSetStore::new()?;
    let provider = WordListProvider::from_file(from)?;

    let cmd = BuildCommand::new(store, provider);
    let options = BuildOptions {
        json,
        quiet,
        set_id: set.to_string(),
        force,
        values_per_key,
    };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_edit(
    set: &str,
    key: &str,
    values: Vec<String>,
    remove_key: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::edit::{EditCommand, EditOptions};

    let store = FileSetStore::new()?;

    let cmd = EditCommand::new(store);
    let options = EditOptions {
        json,
        quiet,
        set_id: set.to_string(),
        key: key.to_string(),
        values,
        remove_key,
    };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_drop(
    set: &str,
    force: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::drop::{DropCommand, DropOptions};

    let store = FileSetStore::new()?;

    let cmd = DropCommand::new(store);
    let options = DropOptions {
        json,
        quiet,
        set_id: set.to_string(),
        force,
    };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_results(
    json: bool,
    quiet: bool,
    limit: Option<usize>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::results::{ResultsCommand, ResultsOptions};

    let config = Config::load();
    let log = FileCompletionLog::new()?;

    let cmd = ResultsCommand::new(log);
    let options = ResultsOptions {
        json,
        quiet,
        limit: limit.unwrap_or(config.history.limit),
    };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use rote::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(cwd.to_string_lossy().to_string());
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
