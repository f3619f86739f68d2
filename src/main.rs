use clap::Parser;
use std::process;
use untar::{
    extractor, Cli, OutputFormatter, OutputMode, Untar, UntarError, UserFriendlyError,
};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create Untar instance
    let untar = match Untar::from_cli(&cli) {
        Ok(untar) => untar,
        Err(e) => {
            print_startup_error(&e);
            return error_exit_code(&e);
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&untar);
    }

    // Execute the extraction task. Per-unit failures are logged and
    // reported but do not fail the task: the exit code is nonzero only
    // for configuration-level errors caught above or during the run.
    match untar.run_task().await {
        Ok(report) => {
            untar.output_formatter().print_task_report(&report);
            0
        }
        Err(e) => {
            untar.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn error_exit_code(error: &UntarError) -> i32 {
    match error {
        UntarError::InvalidMode { .. } => 2,
        UntarError::Config { .. } => 3,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "untar.toml".to_string());

    match Untar::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  untar --config {}", config_path);
            println!("\nEdit the file to list your archives and destinations.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(untar: &Untar) -> i32 {
    let formatter = untar.output_formatter();
    let config = untar.config();

    formatter.info("DRY RUN MODE - No archives will be extracted");
    formatter.print_separator();

    let mode = match extractor::format::parse_mode(config.mode.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return error_exit_code(&e);
        }
    };

    match mode {
        Some(mode) => formatter.info(&format!("Mode: {} (overrides file extensions)", mode)),
        None => formatter.info("Mode: inferred per file from extension"),
    }

    for group in &config.groups {
        let filtered = extractor::filter_sources(group);

        println!("  Destination: {}", group.dest.display());
        for missing in &filtered.missing {
            formatter.warning(&format!(
                "Source file \"{}\" not found.",
                missing.display()
            ));
        }
        for source in &filtered.sources {
            let gunzip = extractor::needs_gunzip(source, mode);
            println!(
                "    {} ({})",
                source.display(),
                if gunzip { "gunzip + untar" } else { "untar" }
            );
        }
        if filtered.sources.is_empty() {
            println!("    (no archives to extract)");
        }
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform actual extraction");

    0
}

fn print_startup_error(error: &UntarError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
