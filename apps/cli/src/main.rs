mod flow;
mod internal;
mod text;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`tracing` directive syntax).
const LOG_ENV: &str = "NEOGROVE_LOG";

#[derive(Parser)]
#[command(
    name = "neogrove",
    about = "Editor helper for grove workspaces and flow plans",
    author,
    version
)]
struct Cli {
    /// Grove configuration file (defaults to GROVE_CONFIG or ~/.config/grove/grove.yml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run 'flow run' on the given file.
    Chat(ChatArgs),
    /// Interact with flow plans.
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Interact with AI models.
    #[command(subcommand)]
    Models(ModelsCommand),
    /// Append editor selections and questions to a markdown file.
    #[command(subcommand)]
    Text(TextCommand),
    /// Commands used by the editor plugin itself.
    #[command(subcommand, hide = true)]
    Internal(InternalCommand),
    /// Print version information.
    Version(VersionArgs),
}

#[derive(Args)]
struct ChatArgs {
    /// Note to run.
    #[arg(value_name = "FILE_PATH")]
    file_path: String,
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Initialize a new plan directory using the interactive wizard.
    Init(PlanInitArgs),
    /// List all available plans; extra arguments are passed through.
    List(PassThroughArgs),
    /// Show the status of a plan.
    Status(PlanStatusArgs),
    /// Add a job to a plan using the interactive wizard.
    Add(PlanTarget),
    /// Run a plan.
    Run(PlanTarget),
    /// List available job templates; extra arguments are passed through.
    TemplateList(PassThroughArgs),
    /// View or edit plan configuration.
    Config(PlanConfigArgs),
}

#[derive(Args)]
struct PlanInitArgs {
    /// Plan directory name.
    #[arg(value_name = "DIRECTORY")]
    dir: Option<String>,
    /// Markdown file whose content seeds the initial job.
    #[arg(long, value_name = "FILE")]
    extract_all_from: Option<String>,
}

#[derive(Args)]
struct PlanTarget {
    /// Plan name or directory.
    #[arg(value_name = "PLAN")]
    plan: String,
}

#[derive(Args)]
struct PlanStatusArgs {
    /// Plan name or directory.
    #[arg(value_name = "PLAN")]
    plan: String,
    /// Flags forwarded to flow; bare words are dropped.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "FLAGS")]
    flags: Vec<String>,
}

#[derive(Args)]
struct PlanConfigArgs {
    /// Plan name or directory.
    #[arg(value_name = "PLAN")]
    plan: String,
    /// Read a configuration value (e.g. model).
    #[arg(long, value_name = "KEY")]
    get: Option<String>,
    /// Set a configuration value (key=value); repeatable or comma separated.
    #[arg(long, value_name = "KEY=VALUE", value_delimiter = ',')]
    set: Vec<String>,
}

#[derive(Args)]
struct PassThroughArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List available models; extra arguments are passed through.
    List(PassThroughArgs),
}

#[derive(Subcommand)]
enum TextCommand {
    /// Append stdin as a fenced code block.
    Select(TextSelectArgs),
    /// Append a question from the argument or stdin.
    Ask(TextAskArgs),
}

#[derive(Args)]
struct TextSelectArgs {
    /// Markdown file to append to.
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
    /// Language of the snippet (e.g. go, lua).
    #[arg(short, long, default_value = "")]
    lang: String,
}

#[derive(Args)]
struct TextAskArgs {
    /// Markdown file to append to.
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
    /// Question text; read from stdin when omitted.
    question: Option<String>,
}

#[derive(Subcommand)]
enum InternalCommand {
    /// Map absolute paths read from stdin to workspace aliases (JSON on stdout).
    ResolveAliases(ResolveAliasesArgs),
    /// Print extended git status for a path as JSON.
    GitStatus(GitStatusArgs),
}

#[derive(Args)]
struct ResolveAliasesArgs {
    /// Discovery snapshot to use instead of scanning the search paths.
    #[arg(long, env = "NEOGROVE_DISCOVERY", value_name = "FILE")]
    discovery: Option<PathBuf>,
}

#[derive(Args)]
struct GitStatusArgs {
    /// Path inside the repository (defaults to the current directory).
    path: Option<PathBuf>,
}

#[derive(Args)]
struct VersionArgs {
    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        config,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);

    match command {
        Commands::Chat(args) => flow::chat(&args.file_path),
        Commands::Plan(command) => flow::plan(command),
        Commands::Models(ModelsCommand::List(args)) => flow::models_list(args.args),
        Commands::Text(TextCommand::Select(args)) => text::select(&args.file, &args.lang),
        Commands::Text(TextCommand::Ask(args)) => text::ask(&args.file, args.question),
        Commands::Internal(InternalCommand::ResolveAliases(args)) => {
            internal::resolve_aliases(config.as_deref(), args.discovery.as_deref())
        }
        Commands::Internal(InternalCommand::GitStatus(args)) => {
            internal::git_status(args.path);
            Ok(())
        }
        Commands::Version(args) => print_version(args.json),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_version(json: bool) -> Result<()> {
    let info = VersionInfo {
        name: env!("CARGO_BIN_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    };
    if json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!("{} {}", info.name, info.version);
    }
    Ok(())
}
