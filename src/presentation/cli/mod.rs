use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::env;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::application::context::{ProgressReporter, RunContext};
use crate::application::use_cases::repository_summary::{
    RepositorySummaryUseCase, SummaryResult, WorkingTreeState,
};
use crate::application::use_cases::run_operation::{RunOperationConfig, RunOperationUseCase};
use crate::common::result::OptionExt;
use crate::domain::entities::app_config::{home_dir, AppConfig};
use crate::domain::entities::operation::Operation;
use crate::domain::entities::operation_result::BatchResult;
use crate::domain::entities::repository::Repository;
use crate::domain::value_objects::remote_host::{RemoteHost, RemoteHostError};
use crate::infrastructure::filesystem::{ConfigStore, RepositoryDiscoverer};
use crate::infrastructure::git::client::SystemGitClient;
use crate::infrastructure::logging::ResultLogger;
use crate::infrastructure::network::{ConnectivityProbe, ConnectivityStatus};
use crate::presentation::ui::display::{format_duration, DisplayHelper};
use crate::presentation::ui::progress::{IndicatifReporter, PlainReporter};

/// Output format options for the summary command
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// githerd - run git operations across a herd of sibling repositories
#[derive(Parser)]
#[command(name = "githerd")]
#[command(about = "Run git operations across every repository under a directory")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Root directory to scan for repositories (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<String>,

    /// Path to the configuration file (defaults to ~/.githerd.yml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show working-tree status for every repository
    Status {
        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Fetch from the configured remote in every repository
    Fetch {
        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Remote host to probe before the batch, as HOST or HOST:PORT
        #[arg(short, long)]
        remote: Option<String>,

        /// Skip the connectivity precheck
        #[arg(long)]
        no_precheck: bool,
    },

    /// Pull from the configured remote in every repository
    Pull {
        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Remote host to probe before the batch, as HOST or HOST:PORT
        #[arg(short, long)]
        remote: Option<String>,

        /// Skip the connectivity precheck
        #[arg(long)]
        no_precheck: bool,
    },

    /// Push local commits in every repository
    Push {
        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Remote host to probe before the batch, as HOST or HOST:PORT
        #[arg(short, long)]
        remote: Option<String>,

        /// Skip the connectivity precheck
        #[arg(long)]
        no_precheck: bool,
    },

    /// Stage all changes and commit in every repository
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Show the most recent commits for every repository
    Log {
        /// Maximum number of commits to show
        #[arg(short = 'n', long, default_value_t = 10)]
        max_count: usize,

        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Show a branch/changes/drift overview of every repository
    Summary {
        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        // Set up colored output
        if self.cli.no_color {
            colored::control::set_override(false);
        }

        // Change directory if specified
        if let Some(ref dir) = self.cli.directory {
            env::set_current_dir(dir)
                .with_context(|| format!("cannot change directory to '{}'", dir))?;
        }

        // Handle the command
        match self.handle_command().await {
            Ok(true) => Ok(()),
            Ok(false) => exit(1),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> anyhow::Result<bool> {
        match &self.cli.command {
            Commands::Status { jobs } => self.handle_batch_command(Operation::Status, *jobs, None, true).await,
            Commands::Fetch {
                jobs,
                remote,
                no_precheck,
            } => {
                self.handle_batch_command(Operation::Fetch, *jobs, remote.clone(), *no_precheck)
                    .await
            }
            Commands::Pull {
                jobs,
                remote,
                no_precheck,
            } => {
                self.handle_batch_command(Operation::Pull, *jobs, remote.clone(), *no_precheck)
                    .await
            }
            Commands::Push {
                jobs,
                remote,
                no_precheck,
            } => {
                self.handle_batch_command(Operation::Push, *jobs, remote.clone(), *no_precheck)
                    .await
            }
            Commands::Commit { message, jobs } => {
                let operation = Operation::commit(message.clone())
                    .map_err(|e| anyhow::anyhow!("invalid commit message: {}", e))?;
                self.handle_batch_command(operation, *jobs, None, true).await
            }
            Commands::Log { max_count, jobs } => {
                self.handle_batch_command(Operation::log(*max_count), *jobs, None, true)
                    .await
            }
            Commands::Summary { output } => self.handle_summary_command(output.clone()).await,
        }
    }

    /// Run one operation across every discovered repository.
    async fn handle_batch_command(
        &self,
        operation: Operation,
        jobs: Option<usize>,
        remote_override: Option<String>,
        skip_precheck: bool,
    ) -> anyhow::Result<bool> {
        let display = self.display();
        let config = self.load_config();
        let repositories = self.discover_repositories(&config)?;

        display.info(&format!(
            "Running git {} across {} repositories",
            operation,
            repositories.len()
        ));

        // Connectivity precheck, once per run, before any network-dependent batch
        let connectivity = if operation.requires_network() && !skip_precheck {
            self.precheck_connectivity(&display, &config, remote_override)
                .await?
        } else {
            None
        };

        // Reporter: live bars on a TTY, plain lines otherwise
        let interactive = atty::is(atty::Stream::Stdout) && !self.cli.no_color;
        let indicatif = interactive
            .then(|| Arc::new(IndicatifReporter::new(operation.name(), repositories.len())));
        let reporter: Arc<dyn ProgressReporter> = match &indicatif {
            Some(reporter) => reporter.clone(),
            None => Arc::new(PlainReporter),
        };

        // Result log next to the user's home unless configured otherwise
        let logger = self.create_logger(&config);

        let ctx = Arc::new(RunContext::new(reporter, logger));

        // Ctrl-C stops launching new repositories; in-flight subprocesses finish
        let signal_ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\ninterrupt received, letting in-flight operations finish...");
                signal_ctx.request_cancel();
            }
        });

        let git = Arc::new(
            SystemGitClient::new().with_timeout(config.command_timeout_secs),
        );
        let run_config = RunOperationConfig::new(operation)
            .with_parallel_jobs(jobs.or(Some(config.parallel_jobs)));
        let use_case = RunOperationUseCase::new(run_config, git);

        let batch = use_case
            .execute(repositories, connectivity.as_ref(), &ctx)
            .await?;

        if let Some(reporter) = &indicatif {
            reporter.finish();
        }

        self.print_captured_output(&display, &batch);
        self.print_batch_summary(&display, &batch, &ctx)?;

        Ok(batch.is_success())
    }

    /// Run the summary overview command.
    async fn handle_summary_command(&self, output: OutputFormat) -> anyhow::Result<bool> {
        let display = self.display();
        let config = self.load_config();
        let repositories = self.discover_repositories(&config)?;

        let git = Arc::new(
            SystemGitClient::new().with_timeout(config.command_timeout_secs),
        );
        let use_case = RepositorySummaryUseCase::new(git);
        let result = use_case.execute(&repositories).await;

        match output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&result)?),
            OutputFormat::Text => self.print_summary_table(&display, &result),
        }

        Ok(result.error_count == 0)
    }

    /// Load the configuration, degrading to defaults with a warning when the
    /// file is unreadable.
    fn load_config(&self) -> AppConfig {
        let path = match &self.cli.config {
            Some(path) => Some(std::path::PathBuf::from(path)),
            None => AppConfig::default_path(),
        };

        let Some(path) = path else {
            warn!("cannot determine home directory; using built-in defaults");
            return AppConfig::default();
        };

        match ConfigStore::new().load_or_create(&path) {
            Ok(config) => config,
            Err(e) => {
                self.display()
                    .warning(&format!("Could not load config file: {}", e));
                AppConfig::default()
            }
        }
    }

    /// Discover repositories under the current directory, preferred ones
    /// first.
    fn discover_repositories(&self, config: &AppConfig) -> anyhow::Result<Vec<Repository>> {
        let root = env::current_dir()?;
        let mut repositories = RepositoryDiscoverer::discover(&root)?;

        if repositories.is_empty() {
            bail!("No git repositories found in {}", root.display());
        }

        RepositoryDiscoverer::promote_preferred(&mut repositories, &config.preferred_repos);

        if self.cli.verbose {
            let names: Vec<_> = repositories.iter().map(|r| r.name.as_str()).collect();
            self.display().info(&format!(
                "Found {} repositories: {}",
                repositories.len(),
                names.join(", ")
            ));
        }

        Ok(repositories)
    }

    /// Probe the configured remote once. Returns `None` when no remote is
    /// configured.
    async fn precheck_connectivity(
        &self,
        display: &DisplayHelper,
        config: &AppConfig,
        remote_override: Option<String>,
    ) -> anyhow::Result<Option<ConnectivityStatus>> {
        let Some(remote) = remote_override.or_else(|| config.git_server.clone()) else {
            return Ok(None);
        };

        let remote: RemoteHost = remote
            .parse()
            .map_err(|e: RemoteHostError| anyhow::anyhow!("invalid remote '{}': {}", remote, e))?;

        display.info(&format!("Checking connectivity to {}...", remote));
        let probe = ConnectivityProbe::new()
            .with_timeout(Duration::from_secs(config.probe_timeout_secs));
        let status = probe.check(&remote).await;

        match &status {
            ConnectivityStatus::Reachable => {
                display.success(&format!("Git server {} is reachable", remote));
            }
            ConnectivityStatus::Unreachable { reason } => {
                display.warning(&format!("Git server is not reachable: {}", reason));
            }
        }

        Ok(Some(status))
    }

    fn create_logger(&self, config: &AppConfig) -> Option<ResultLogger> {
        let dir = config.log_dir.clone().or_else(home_dir);
        let dir = match dir.ok_or_internal_error("cannot determine a log directory") {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "result logging disabled");
                return None;
            }
        };

        match ResultLogger::create_in(&dir) {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!(error = %e, "result logging disabled");
                None
            }
        }
    }

    /// Print captured stdout of successful operations, the way `git status`
    /// or `git log` output is expected to be seen.
    fn print_captured_output(&self, display: &DisplayHelper, batch: &BatchResult) {
        for result in &batch.results {
            if result.is_success() && !result.stdout.trim().is_empty() {
                println!("\n{}:", display.format_repo(&result.repository));
                println!("{}", result.stdout.trim_end());
            }
        }
    }

    /// Print the final per-run summary and append the result log.
    fn print_batch_summary(
        &self,
        display: &DisplayHelper,
        batch: &BatchResult,
        ctx: &RunContext,
    ) -> anyhow::Result<()> {
        println!();
        let counts = format!(
            "{} succeeded, {} failed, {} skipped",
            batch.succeeded_count, batch.failed_count, batch.skipped_count
        );
        let elapsed = format_duration(Duration::from_millis(batch.total_duration_ms));

        if batch.is_success() {
            display.success(&format!(
                "git {} completed: {} ({})",
                batch.operation, counts, elapsed
            ));
        } else if batch.interrupted_count > 0 {
            display.warning(&format!(
                "git {} interrupted: {}, {} interrupted ({})",
                batch.operation, counts, batch.interrupted_count, elapsed
            ));
        } else {
            display.error(&format!(
                "git {} finished with failures: {} ({})",
                batch.operation, counts, elapsed
            ));
        }

        let failed = batch.failed_results();
        if !failed.is_empty() {
            for result in failed {
                let reason = result
                    .error_excerpt()
                    .unwrap_or_else(|| "unknown error".to_string());
                println!("  {}: {}", display.format_repo(&result.repository), reason.red());
            }
        }

        if let Some(path) = ctx.log_results(batch)? {
            display.info(&format!("Detailed log saved to {}", path.display()));
        }

        Ok(())
    }

    fn print_summary_table(&self, display: &DisplayHelper, result: &SummaryResult) {
        let rows: Vec<Vec<String>> = result
            .repositories
            .iter()
            .map(|repo| {
                let status = match repo.state {
                    WorkingTreeState::Clean => "clean".to_string(),
                    WorkingTreeState::Dirty => "dirty".to_string(),
                    WorkingTreeState::Error => "error".to_string(),
                };
                let changes = if repo.uncommitted > 0 {
                    repo.uncommitted.to_string()
                } else {
                    "-".to_string()
                };
                let mut drift = Vec::new();
                if repo.ahead > 0 {
                    drift.push(format!("↑{}", repo.ahead));
                }
                if repo.behind > 0 {
                    drift.push(format!("↓{}", repo.behind));
                }
                let sync = if drift.is_empty() {
                    "ok".to_string()
                } else {
                    drift.join(" ")
                };

                vec![
                    repo.name.clone(),
                    repo.branch.clone().unwrap_or_else(|| "(detached)".to_string()),
                    status,
                    changes,
                    sync,
                ]
            })
            .collect();

        display.print_table(&["Repository", "Branch", "Status", "Changes", "Sync"], &rows);

        println!();
        let line = format!(
            "{} repositories: {} clean, {} dirty, {} errors",
            result.total_count(),
            result.clean_count,
            result.dirty_count,
            result.error_count
        );
        if result.error_count > 0 {
            display.error(&line);
        } else if result.has_issues() {
            display.warning(&line);
        } else {
            display.success(&line);
        }

        for repo in &result.repositories {
            if let Some(error) = &repo.error_message {
                println!("  {}: {}", display.format_repo(&repo.name), error.red());
            }
        }
    }

    fn display(&self) -> DisplayHelper {
        if self.cli.no_color {
            DisplayHelper::new(false)
        } else {
            DisplayHelper::auto()
        }
    }
}
