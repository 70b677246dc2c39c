mod diff;
mod migrate;
mod project;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Migrates spx projects from v2.0.0-pre.5 to v2.0.0-pre.9.
#[derive(Parser)]
#[command(
    name = "spx-migrator",
    version,
    about = "spx 2.0 API migration tool"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate one project (a directory or a JSON file map)
    Migrate {
        /// Project directory or JSON file map
        input: PathBuf,
        /// Where to write the migrated project [default: <input>_migrated]
        #[arg(long)]
        out: Option<PathBuf>,
        /// Where to write the diff [default: <out>.diff]
        #[arg(long)]
        diff: Option<PathBuf>,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Migrate every JSON file map in a directory
    Batch {
        /// Directory of `*.json` file maps
        dir: PathBuf,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Options shared by `migrate` and `batch`.
#[derive(Debug, Clone, Args)]
pub(crate) struct RunArgs {
    /// Skip projects that fail legacy validation and write a .skip marker
    #[arg(long)]
    pub skip_legacy_validate: bool,

    /// Skip projects that use removed APIs and write a .skip marker
    #[arg(long)]
    pub skip_removed_apis: bool,

    /// Skip projects without main.spx and write a .skip marker
    #[arg(long)]
    pub skip_no_main: bool,

    /// Skip projects that fail target validation and write a .skip marker
    #[arg(long)]
    pub skip_target_validate: bool,

    /// Build tool used to validate projects
    #[arg(long, default_value = "xgo")]
    pub validator_program: String,

    /// Do not build projects before and after migrating
    #[arg(long)]
    pub no_validate: bool,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spx_migrator=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Migrate {
            input,
            out,
            diff,
            run,
        } => migrate::cmd_migrate(
            &input,
            out.as_deref(),
            diff.as_deref(),
            &run,
            cli.output,
            cli.quiet,
        ),
        Commands::Batch { dir, out, run } => {
            migrate::cmd_batch(&dir, &out, &run, cli.output, cli.quiet)
        }
    }
}

/// Print an error to stderr in the selected format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
