use clap::Parser;
use planboard::{CliResult, Command, InputSource, Snapshot};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable name for the snapshot path
const PB_SNAPSHOT_ENV: &str = "PB_SNAPSHOT";

/// Planboard - project planning views from a JSON snapshot
#[derive(Parser)]
#[command(name = "pb")]
#[command(version = "0.1.0")]
#[command(about = "Project planning views: WBS tree, Kanban board and Gantt timeline", long_about = None)]
struct Args {
    /// Snapshot JSON file, or "-" for stdin (can also be set via PB_SNAPSHOT env var)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

/// Get the snapshot source from command line, environment variable, or default.
///
/// Priority:
/// 1. Command line --input argument
/// 2. PB_SNAPSHOT environment variable (if non-empty)
/// 3. Standard input
fn resolve_input(cli_input: Option<PathBuf>) -> InputSource {
    // First priority: explicit command line argument
    if let Some(path) = cli_input {
        return InputSource::from_path(path);
    }

    // Second priority: environment variable (if set and non-empty)
    if let Ok(env_path) = std::env::var(PB_SNAPSHOT_ENV)
        && !env_path.is_empty()
    {
        return InputSource::from_path(env_path);
    }

    // Third priority: stdin
    InputSource::Stdin
}

/// Initialize logging from the RUST_LOG environment variable
///
/// Examples:
/// - `RUST_LOG=trace` - show all trace logs
/// - `RUST_LOG=debug` - show debug and above
/// - `RUST_LOG=planboard_views=debug` - debug logs from the view models only
/// - `RUST_LOG=warn` - show warn and above (default)
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

fn main() {
    init_logging();

    if let Err(e) = run_app() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// Main application logic - separated for testability
fn run_app() -> CliResult<()> {
    let args = Args::parse();
    let output = run_with_args(&args)?;
    println!("{}", output);
    Ok(())
}

/// Run the application with the given arguments
fn run_with_args(args: &Args) -> CliResult<String> {
    let snapshot = if args.command.needs_snapshot() {
        let source = resolve_input(args.input.clone());
        debug!("Reading snapshot from {}", source);
        Snapshot::load(&source)?
    } else {
        Snapshot::default()
    };

    args.command.execute(&snapshot, args.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn temp_snapshot(contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "pb-main-test-{}-{:?}-{}.json",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["pb", "tree", "flatten"]).unwrap();
        assert!(args.input.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_args_require_command() {
        assert!(Args::try_parse_from(["pb"]).is_err());
    }

    #[test]
    fn test_args_global_flags_after_command() {
        let args =
            Args::try_parse_from(["pb", "timeline", "--input", "plan.json", "--json"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("plan.json")));
        assert!(args.json);
    }

    #[test]
    fn test_run_with_args_reads_file() {
        let path = temp_snapshot(r#"{"nodes": [{"id": "a", "title": "Root"}]}"#);
        let args = Args::try_parse_from([
            "pb",
            "--input",
            path.to_str().unwrap(),
            "tree",
            "show",
        ])
        .unwrap();

        let output = run_with_args(&args);
        let _ = std::fs::remove_file(&path);
        assert_eq!(output.unwrap(), "1 Root [BACKLOG]");
    }

    #[test]
    fn test_run_with_args_columns_needs_no_snapshot() {
        let args = Args::try_parse_from([
            "pb",
            "--input",
            "/nonexistent/planboard.json",
            "board",
            "columns",
        ])
        .unwrap();
        assert!(run_with_args(&args).is_ok());
    }

    #[test]
    fn test_run_with_args_missing_file() {
        let args = Args::try_parse_from([
            "pb",
            "--input",
            "/nonexistent/planboard.json",
            "timeline",
        ])
        .unwrap();
        let err = run_with_args(&args).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read snapshot from"));
    }

    // ========================================
    // resolve_input tests
    // ========================================

    #[test]
    #[serial]
    fn test_resolve_input_cli_takes_priority() {
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::set_var(PB_SNAPSHOT_ENV, "/from/env.json") };

        let source = resolve_input(Some(PathBuf::from("/from/cli.json")));
        assert_eq!(source, InputSource::File(PathBuf::from("/from/cli.json")));

        unsafe { env::remove_var(PB_SNAPSHOT_ENV) };
    }

    #[test]
    #[serial]
    fn test_resolve_input_uses_env_var() {
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::set_var(PB_SNAPSHOT_ENV, "/from/env.json") };

        let source = resolve_input(None);
        assert_eq!(source, InputSource::File(PathBuf::from("/from/env.json")));

        unsafe { env::remove_var(PB_SNAPSHOT_ENV) };
    }

    #[test]
    #[serial]
    fn test_resolve_input_ignores_empty_env_var() {
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::set_var(PB_SNAPSHOT_ENV, "") };

        assert_eq!(resolve_input(None), InputSource::Stdin);

        unsafe { env::remove_var(PB_SNAPSHOT_ENV) };
    }

    #[test]
    #[serial]
    fn test_resolve_input_dash_is_stdin() {
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::remove_var(PB_SNAPSHOT_ENV) };

        assert_eq!(
            resolve_input(Some(PathBuf::from("-"))),
            InputSource::Stdin
        );
        assert_eq!(resolve_input(None), InputSource::Stdin);
    }
}
