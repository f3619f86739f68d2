use crate::error::{UntarError, UserFriendlyError};
use crate::extractor::{TaskReport, UnitStatus};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods. Per-file lines and missing-source warnings
    // are part of the task's contract, so info/warning print at the
    // default verbosity; only quiet suppresses them.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &UntarError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_task_summary(&self, report: &TaskReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => self.print_json_summary(report),
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_task_report(&self, report: &TaskReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &TaskReport) {
        println!();
        self.print_separator();

        let failed = report.failed_count();
        if failed == 0 {
            if self.use_colors {
                println!(
                    "{} {}",
                    style("Archive extraction completed!").green().bold(),
                    CHECKMARK
                );
            } else {
                println!("✓ Archive extraction completed!");
            }
        } else if self.use_colors {
            println!(
                "{} {}",
                style("Archive extraction finished with errors").yellow().bold(),
                WARNING
            );
        } else {
            println!("! Archive extraction finished with errors");
        }

        println!();
        println!(
            "  Archives extracted: {}",
            self.highlight(report.extracted_count())
        );
        println!(
            "  Entries written:    {}",
            self.highlight(report.total_entries())
        );
        if !report.missing_sources.is_empty() {
            println!(
                "  Missing sources:    {}",
                self.highlight(report.missing_sources.len())
            );
        }
        if failed > 0 {
            println!("  Failed archives:    {}", self.highlight(failed));
        }
        println!(
            "  Time taken:         {}",
            self.highlight(format_duration(report.duration))
        );

        if failed > 0 {
            println!();
            println!("  Failed archives were skipped; the task still reports success.");
        }

        self.print_separator();
    }

    fn highlight<T: std::fmt::Display>(&self, value: T) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }

    fn print_json_summary(&self, report: &TaskReport) {
        let summary = serde_json::json!({
            "type": "summary",
            "archives_extracted": report.extracted_count(),
            "archives_failed": report.failed_count(),
            "entries_written": report.total_entries(),
            "missing_sources": report.missing_sources.len(),
            "duration_ms": report.duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, report: &TaskReport) {
        println!("COMPLETED: Archive extraction");
        println!("Archives extracted: {}", report.extracted_count());
        println!("Entries written: {}", report.total_entries());
        if !report.missing_sources.is_empty() {
            println!("Missing sources: {}", report.missing_sources.len());
        }
        if report.failed_count() > 0 {
            println!("Failed archives: {}", report.failed_count());
        }
        println!("Duration: {:?}", report.duration);
    }

    fn print_human_report(&self, report: &TaskReport) {
        if self.quiet {
            return;
        }

        for unit in &report.units {
            if let UnitStatus::Extracted { entries, skipped } = &unit.status {
                let mut line = format!(
                    "{} -> {}: {} entries",
                    unit.source.display(),
                    unit.dest.display(),
                    entries
                );
                if *skipped > 0 {
                    line.push_str(&format!(" ({} unsafe entries skipped)", skipped));
                }
                self.debug(&line);
            }
        }

        if report.failed_count() > 0 {
            println!("Issues encountered:");
            for unit in &report.units {
                if let UnitStatus::Failed { error, .. } = &unit.status {
                    println!("  - {}", error);
                }
            }
        }
    }

    fn print_plain_report(&self, report: &TaskReport) {
        println!("REPORT: {} unit(s)", report.units.len());
        for unit in &report.units {
            match &unit.status {
                UnitStatus::Extracted { entries, skipped } => {
                    println!(
                        "OK {} -> {} ({} entries, {} skipped)",
                        unit.source.display(),
                        unit.dest.display(),
                        entries,
                        skipped
                    );
                }
                UnitStatus::Failed { stage, error } => {
                    println!("FAILED [{}] {}", stage, error);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
