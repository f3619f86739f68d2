use crate::config::{CliOverrides, Config, FileGroup};
use crate::error::{Result, UntarError};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "untar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract tar and tgz archives into configured destinations")]
#[command(
    long_about = "untar streams each configured archive through optional gzip \
                       decompression and tar extraction into its destination directory. \
                       Archives are processed strictly one at a time; failures are logged \
                       and the remaining archives still run."
)]
#[command(after_help = "EXAMPLES:\n  \
    untar release.tar.gz --dest out\n  \
    untar a.tgz b.tgz --dest vendor --mode tgz\n  \
    untar --config untar.toml --verbose\n  \
    untar --config untar.toml --report report.json\n\n\
    Run with --generate-config to write a sample configuration file.")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Archive files to extract (forms an ad-hoc file group with --dest)
    pub sources: Vec<PathBuf>,

    /// Destination directory for the archives given on the command line
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Force handling of every archive: "tar" or "tgz" (default: infer per file)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write the task report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be extracted without executing)
    #[arg(long, help = "Show the extraction plan without touching the filesystem")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides()?;
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> Result<CliOverrides> {
        let group = match (&self.dest, self.sources.is_empty()) {
            (Some(dest), false) => Some(FileGroup {
                dest: dest.clone(),
                src: self.sources.clone(),
            }),
            (Some(_), true) => {
                return Err(UntarError::Config {
                    message: "--dest was given but no source archives".to_string(),
                })
            }
            (None, false) => {
                return Err(UntarError::Config {
                    message: "source archives were given without --dest".to_string(),
                })
            }
            (None, true) => None,
        };

        Ok(CliOverrides::new()
            .with_mode(self.mode.clone())
            .with_group(group))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
