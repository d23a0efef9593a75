use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "casegen",
    version,
    about = "Generate Jest test suites for an issue-creation bot from git history"
)]
pub struct Cli {
    /// Config file (defaults to ./casegen.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `casegen=trace` (RUST_LOG wins)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a suite from templates and a JSON file of case records
    Render(RenderArgs),

    /// Turn cloned repositories' history into test suites and diff files
    Generate(GenerateArgs),

    /// List the placeholders a template references
    Placeholders {
        /// Template path or `builtin:<name>`
        template: String,
    },

    /// Append recorded issues.create calls to the issue CSV
    LogIssues(LogIssuesArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Preamble template, emitted once without substitution
    #[arg(long)]
    pub preamble: Option<String>,

    /// Per-case template
    #[arg(long)]
    pub testcase: Option<String>,

    /// Postamble template, emitted once after all cases
    #[arg(long)]
    pub postamble: Option<String>,

    /// JSON array of objects mapping placeholder names to values
    #[arg(long)]
    pub cases: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Cloned repositories laid out as <owner>/<repo>
    #[arg(long)]
    pub repos_dir: Option<PathBuf>,

    /// Where per-commit .diff files are written
    #[arg(long)]
    pub diffs_dir: Option<PathBuf>,

    /// Where <owner>/<repo>.test.js files are written
    #[arg(long)]
    pub tests_dir: Option<PathBuf>,

    /// Repository summary JSON with each repo's bot issues
    #[arg(long)]
    pub repos_file: Option<PathBuf>,

    /// Repositories processed in parallel
    #[arg(short, long, default_value_t = 4)]
    pub jobs: usize,
}

#[derive(Args, Debug)]
pub struct LogIssuesArgs {
    /// JSON array of {owner, repo, title, body} objects
    #[arg(long)]
    pub calls: PathBuf,

    /// Timestamp recorded with every row (the head commit's timestamp)
    #[arg(long)]
    pub timestamp: String,

    /// Issue CSV (defaults to the configured issues_csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
