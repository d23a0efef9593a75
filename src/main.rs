mod case;
mod cli;
mod config;
mod cutoff;
mod generate;
mod git;
mod issue_log;
mod template;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::case::load_case_records;
use crate::cli::{Cli, Command, GenerateArgs, LogIssuesArgs, RenderArgs};
use crate::config::{CasegenConfig, TemplatesConfig};
use crate::cutoff::Cutoffs;
use crate::generate::{generate_all, OutputDirs};
use crate::issue_log::{load_issue_calls, IssueLog, IssueRow};
use crate::template::{Template, TemplateSet, TemplateSource};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run_render(args: RenderArgs, config: &CasegenConfig) -> Result<()> {
    // CLI flags override the configured template sources
    let sources = TemplatesConfig {
        preamble: args
            .preamble
            .unwrap_or_else(|| config.templates.preamble.clone()),
        testcase: args
            .testcase
            .unwrap_or_else(|| config.templates.testcase.clone()),
        postamble: args.postamble.or_else(|| config.templates.postamble.clone()),
    };
    let templates = TemplateSet::load(&sources)?;
    let cases = load_case_records(&args.cases)?;
    let suite = templates.render_suite(&cases)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &suite)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(cases = cases.len(), path = %path.display(), "suite written");
        }
        None => std::io::stdout().lock().write_all(suite.as_bytes())?,
    }
    Ok(())
}

async fn run_generate(args: GenerateArgs, mut config: CasegenConfig) -> Result<()> {
    // CLI flags override config values before the tests_dir fallback applies
    if let Some(dir) = args.repos_dir {
        config.repos_dir = dir;
    }
    if let Some(dir) = args.diffs_dir {
        config.diffs_dir = dir;
    }
    if let Some(dir) = args.tests_dir {
        config.tests_dir = Some(dir);
    }
    if let Some(file) = args.repos_file {
        config.repos_file = file;
    }
    let dirs = OutputDirs {
        diffs_dir: config.diffs_dir.clone(),
        tests_dir: config.tests_dir().to_path_buf(),
    };

    let templates = TemplateSet::load(&config.templates)?;
    let cutoffs = Cutoffs::load(&config.repos_file)?;

    let started = std::time::Instant::now();
    let summary = generate_all(&config.repos_dir, &cutoffs, templates, dirs, args.jobs).await?;
    info!(
        repos = summary.repos.len(),
        suites = summary.suites_written(),
        cases = summary.total_cases(),
        elapsed = ?started.elapsed(),
        "generation finished"
    );
    Ok(())
}

fn run_placeholders(template: &str) -> Result<()> {
    let template = Template::load(&TemplateSource::parse(template))?;
    let mut out = std::io::stdout().lock();
    for name in template.placeholders()? {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

fn run_log_issues(args: LogIssuesArgs, config: CasegenConfig) -> Result<()> {
    let log = IssueLog::new(args.output.unwrap_or(config.issues_csv));
    let rows: Vec<IssueRow> = load_issue_calls(&args.calls)?
        .into_iter()
        .map(|call| IssueRow::from_call(call, &args.timestamp))
        .collect();
    log.append(&rows)?;
    info!(rows = rows.len(), path = %log.path().display(), "issues appended");
    Ok(())
}

async fn run(cli: Cli, config: CasegenConfig) -> Result<()> {
    match cli.command {
        Command::Render(args) => run_render(args, &config),
        Command::Generate(args) => run_generate(args, config).await,
        Command::Placeholders { template } => run_placeholders(&template),
        Command::LogIssues(args) => run_log_issues(args, config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();

    let cli = Cli::parse();

    let (config, config_note) = config::load_config(cli.config.as_deref());
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    init_tracing(&level);
    if let Some(note) = config_note {
        warn!("{note}");
    }

    if let Err(e) = run(cli, config).await {
        eprintln!("casegen: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
