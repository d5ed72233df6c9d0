use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::context::ProgressReporter;
use crate::domain::entities::operation_result::{OperationResult, Outcome};
use crate::presentation::ui::display::format_duration;

/// Live progress display: one overall bar plus a spinner per in-flight
/// repository. Terminal rendering is serialized internally, so events may
/// arrive from concurrent tasks.
pub struct IndicatifReporter {
    multi: MultiProgress,
    overall: ProgressBar,
    spinners: Mutex<HashMap<String, ProgressBar>>,
}

impl IndicatifReporter {
    /// Create a reporter for a batch of `total` repositories.
    pub fn new(operation: &str, total: usize) -> Self {
        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>2}/{len:2} {msg}")
                .expect("overall bar template is valid")
                .progress_chars("#>-"),
        );
        overall.set_message(format!("git {}", operation));

        Self {
            multi,
            overall,
            spinners: Mutex::new(HashMap::new()),
        }
    }

    /// Finish the overall bar and clear leftover spinners.
    pub fn finish(&self) {
        let mut spinners = self.spinners.lock().expect("spinner map lock");
        for (_, spinner) in spinners.drain() {
            spinner.finish_and_clear();
        }
        self.overall.finish_and_clear();
    }

    fn outcome_line(result: &OperationResult) -> String {
        let elapsed = format_duration(Duration::from_millis(result.duration_ms));
        match result.outcome {
            Outcome::Succeeded => format!(
                "{} {} ({})",
                "✓".green().bold(),
                result.repository.bold(),
                elapsed
            ),
            Outcome::Failed => {
                let reason = result.error_excerpt().unwrap_or_else(|| "unknown error".to_string());
                format!(
                    "{} {}: {}",
                    "✗".red().bold(),
                    result.repository.bold(),
                    reason.red()
                )
            }
            Outcome::Skipped => {
                let reason = result.error_excerpt().unwrap_or_else(|| "skipped".to_string());
                format!(
                    "{} {}: {}",
                    "-".yellow().bold(),
                    result.repository.bold(),
                    reason.yellow()
                )
            }
            Outcome::Interrupted => format!(
                "{} {}: {}",
                "!".yellow().bold(),
                result.repository.bold(),
                "interrupted".yellow()
            ),
        }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn repository_started(&self, repository: &str) {
        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"])
                .template("{spinner:.green} {msg}")
                .expect("spinner template is valid"),
        );
        spinner.set_message(format!("Processing {}...", repository));
        spinner.enable_steady_tick(Duration::from_millis(120));

        self.spinners
            .lock()
            .expect("spinner map lock")
            .insert(repository.to_string(), spinner);
    }

    fn repository_finished(&self, result: &OperationResult) {
        if let Some(spinner) = self
            .spinners
            .lock()
            .expect("spinner map lock")
            .remove(&result.repository)
        {
            spinner.finish_and_clear();
        }

        self.overall.println(Self::outcome_line(result));
        self.overall.inc(1);
    }
}

/// Line-per-event reporter for non-interactive output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainReporter;

impl ProgressReporter for PlainReporter {
    fn repository_started(&self, repository: &str) {
        println!("[RUN ] {}", repository);
    }

    fn repository_finished(&self, result: &OperationResult) {
        let elapsed = format_duration(Duration::from_millis(result.duration_ms));
        match result.outcome {
            Outcome::Succeeded => println!("[ OK ] {} ({})", result.repository, elapsed),
            Outcome::Failed => println!(
                "[FAIL] {}: {}",
                result.repository,
                result.error_excerpt().unwrap_or_else(|| "unknown error".to_string())
            ),
            Outcome::Skipped => println!(
                "[SKIP] {}: {}",
                result.repository,
                result.error_excerpt().unwrap_or_else(|| "skipped".to_string())
            ),
            Outcome::Interrupted => println!("[INT ] {}", result.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_lines_carry_reason() {
        colored::control::set_override(false);

        let success = OperationResult::new("alpha", "pull").with_success(
            0,
            String::new(),
            String::new(),
            1500,
        );
        let line = IndicatifReporter::outcome_line(&success);
        assert!(line.contains("alpha"));
        assert!(line.contains("1.5s"));

        let failure = OperationResult::new("beta", "pull").with_failure(
            Some(1),
            "fatal: repository not found".to_string(),
            100,
        );
        let line = IndicatifReporter::outcome_line(&failure);
        assert!(line.contains("beta"));
        assert!(line.contains("repository not found"));

        colored::control::unset_override();
    }

    #[test]
    fn test_reporter_lifecycle_does_not_panic() {
        let reporter = IndicatifReporter::new("status", 1);
        reporter.repository_started("alpha");
        let result = OperationResult::new("alpha", "status").with_success(
            0,
            String::new(),
            String::new(),
            10,
        );
        reporter.repository_finished(&result);
        reporter.finish();
    }
}
