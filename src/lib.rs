pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FileGroup};
pub use error::{Result, UnitError, UntarError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract_archive, filter_sources, needs_gunzip, ArchiveMode, ConfigSnapshot, TaskReport,
    UnitOutcome, UnitStatus, UnpackStats,
};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use crate::extractor::format;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;

/// Main library interface: runs the configured extraction task.
pub struct Untar {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    report_path: Option<PathBuf>,
}

impl Untar {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager =
            ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            report_path: None,
        }
    }

    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    /// Create an Untar instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(
            Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
                .with_report_path(cli_args.report.clone()),
        )
    }

    /// Run the extraction task over every configured file group.
    ///
    /// Groups and their sources are processed strictly one at a time, in
    /// declared order. Per-unit failures are logged and recorded but never
    /// abort the task; the only fatal error is an invalid mode, rejected
    /// before any filesystem side effects.
    pub async fn run_task(&self) -> Result<TaskReport> {
        let mode = format::parse_mode(self.config.mode.as_deref())?;

        self.output_formatter.start_operation("Starting archive extraction");

        let start_time = Instant::now();
        let mut report = TaskReport::new(ConfigSnapshot::from_config(&self.config));

        for group in &self.config.groups {
            let filtered = filter_sources(group);

            for missing in &filtered.missing {
                self.log_warning(&format!(
                    "Source file \"{}\" not found.",
                    missing.display()
                ));
            }
            report.missing_sources.extend(filtered.missing);

            if filtered.sources.is_empty() {
                continue;
            }

            let progress = self
                .progress_manager
                .create_archive_progress(filtered.sources.len() as u64);

            for source in filtered.sources {
                let gunzip = needs_gunzip(&source, mode);

                self.log_info(&format!(
                    "Untarring {} to {}",
                    source.display(),
                    filtered.dest.display()
                ));
                progress.set_message(source.display().to_string());

                let unit_start = Instant::now();
                let outcome = self
                    .run_unit(source.clone(), filtered.dest.clone(), gunzip)
                    .await?;
                let duration = unit_start.elapsed();

                match outcome {
                    Ok(stats) => {
                        if stats.entries_skipped > 0 {
                            self.log_warning(&format!(
                                "{}: skipped {} entries outside the destination",
                                source.display(),
                                stats.entries_skipped
                            ));
                        }
                        self.output_formatter.debug(&format!(
                            "{}: {} entries written",
                            source.display(),
                            stats.entries_written
                        ));
                        report.record(UnitOutcome::extracted(
                            source,
                            filtered.dest.clone(),
                            gunzip,
                            stats,
                            duration,
                        ));
                    }
                    Err(unit_error) => {
                        self.log_error(&unit_error.to_string());
                        report.record(UnitOutcome::failed(
                            source,
                            filtered.dest.clone(),
                            gunzip,
                            &unit_error,
                            duration,
                        ));
                    }
                }
                progress.inc(1);
            }

            ui::progress::finish_progress_with_summary(
                &progress,
                &format!("Processed {} archive(s)", progress.length().unwrap_or(0)),
                progress.elapsed(),
            );
        }

        report.finish(start_time.elapsed());

        if let Some(ref report_path) = self.report_path {
            report.save_json(report_path)?;
            self.log_info(&format!("Report written to {}", report_path.display()));
        }

        self.output_formatter.print_task_summary(&report);

        Ok(report)
    }

    /// One extraction unit. The blocking pipeline runs off the async
    /// runtime; the await is what serializes units.
    async fn run_unit(
        &self,
        source: PathBuf,
        dest: PathBuf,
        gunzip: bool,
    ) -> Result<std::result::Result<UnpackStats, UnitError>> {
        task::spawn_blocking(move || extract_archive(&source, &dest, gunzip))
            .await
            .map_err(|e| UntarError::Config {
                message: format!("Extraction task failed: {}", e),
            })
    }

    // Log lines go through the progress manager so they stay ordered with
    // the bars.
    fn log_info(&self, message: &str) {
        self.progress_manager.suspend(|| self.output_formatter.info(message));
    }

    fn log_warning(&self, message: &str) {
        self.progress_manager.suspend(|| self.output_formatter.warning(message));
    }

    fn log_error(&self, message: &str) {
        self.progress_manager.suspend(|| self.output_formatter.error(message));
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(UntarError::Io)?;
        Ok(())
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &UntarError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convenience function to extract archives with minimal setup
pub async fn untar_simple(
    sources: Vec<PathBuf>,
    dest: &Path,
    verbose: bool,
) -> Result<TaskReport> {
    let config = Config {
        mode: None,
        groups: vec![FileGroup {
            dest: dest.to_path_buf(),
            src: sources,
        }],
    };

    let untar = Untar::new(
        config,
        OutputMode::Human,
        if verbose { 1 } else { 0 },
        false,
    );

    untar.run_task().await
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
