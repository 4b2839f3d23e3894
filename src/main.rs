use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hostadm::audit::{ts_now, AuditEvent, AuditLogger};
use hostadm::config::{Command, Config, Settings};
use hostadm::ui::App;
use hostadm_core::report::{render, ReportConfig, ReportGenerator, ReportOptions};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    // Non-interactive subcommands bypass the menu UI
    if let Some(command) = cli.command {
        return run_command(command, &settings);
    }

    // Run the application
    let mut app = App::new(settings);
    app.run()
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("hostadm=debug")
    } else {
        EnvFilter::new("hostadm=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run_command(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Report {
            target_dir,
            max_depth,
            unit,
            format,
            sort,
            size_threshold,
            modified_within_days,
        } => {
            let defaults = &settings.report;
            let opts = ReportOptions {
                target_dir,
                max_depth: max_depth.unwrap_or(defaults.max_depth),
                unit: unit.unwrap_or_else(|| defaults.unit.clone()),
                format: format.unwrap_or_else(|| defaults.format.clone()),
                sort: sort.unwrap_or_else(|| defaults.sort.clone()),
                size_threshold: size_threshold.unwrap_or(defaults.size_threshold),
                modified_within_days,
            };

            let config =
                ReportConfig::with_additional_excludes(&settings.report.additional_excludes);
            let generator = ReportGenerator::new(config);

            let (report, format) = generator
                .collect(&opts)
                .context("Report generation failed")?;
            let rendered = render(&report, format).context("Report rendering failed")?;

            let mut audit = AuditLogger::new(settings.audit.enabled, settings.audit.max_size_bytes);
            audit.log(&AuditEvent::ReportGenerated {
                ts: ts_now(),
                target: report.target.clone(),
                format: format.display_name().to_string(),
                entries: report.entries.len(),
                total_size: report.total_size,
                unit: report.unit.to_string(),
            });

            println!("{}", rendered);
            Ok(())
        }
    }
}
