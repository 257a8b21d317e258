use anyhow::Context;
use clap::Parser;
use omikuji::core::service::StatisticsReport;
use omikuji::domain::model::HistoryEntry;
use omikuji::utils::{error::ErrorKind, logger};
use omikuji::{build_service, CliConfig, Command, OmikujiConfig, OmikujiError};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting omikuji CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match &cli.config {
        Some(path) => OmikujiConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => OmikujiConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 驗證配置並建立儲存
    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("❌ Configuration or store initialisation failed: {}", e);
            fail(&cli, &e);
        }
    };

    match &cli.command {
        Command::Draw => match service.draw().await {
            Ok(record) => {
                if cli.json {
                    println!("{}", serde_json::to_string(&json!({ "result": record.outcome }))?);
                } else {
                    println!("{}", record.outcome);
                }
            }
            Err(OmikujiError::DrawNotRecorded { outcome, source }) => {
                // 抽籤本身已經發生，只是沒有存下來
                tracing::error!("❌ Draw of {} not recorded: {}", outcome, source);
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&json!({
                            "result": outcome,
                            "recorded": false,
                            "error": ErrorKind::Storage.as_str(),
                        }))?
                    );
                } else {
                    println!("{} (not recorded)", outcome);
                    eprintln!("❌ {}", source.user_friendly_message());
                }
                std::process::exit(exit_code(ErrorKind::Storage));
            }
            Err(e) => fail(&cli, &e),
        },
        Command::History { limit } => {
            let entries = service.history(*limit).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_history(&entries);
            }
        }
        Command::Stats { start, end } => {
            match service.statistics(start.as_deref(), end.as_deref()).await {
                Ok(report) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        print_report(&report);
                    }
                }
                Err(e) => fail(&cli, &e),
            }
        }
    }

    Ok(())
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidRange => 1,
        ErrorKind::Storage => 2,
        ErrorKind::Configuration => 3,
    }
}

/// Prints a generic message plus the machine-readable kind and exits.
fn fail(cli: &CliConfig, e: &OmikujiError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    if cli.json {
        println!(
            "{}",
            json!({ "error": e.kind().as_str(), "message": e.user_friendly_message() })
        );
    } else {
        eprintln!("❌ {} [{}]", e.user_friendly_message(), e.kind().as_str());
        eprintln!("💡 {}", e.recovery_suggestion());
    }
    std::process::exit(exit_code(e.kind()))
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No draws yet.");
        return;
    }
    for entry in entries {
        println!(
            "{}  {}",
            entry.outcome.label(),
            entry
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn print_report(report: &StatisticsReport) {
    println!(
        "{} ~ {}: {} draws",
        report.start_date, report.end_date, report.result.total
    );
    for entry in &report.legend {
        println!(
            "  {}  {} ({}%)",
            entry.category, entry.count, entry.percent
        );
    }
    if report.result.unrecognized > 0 {
        println!("  ({} records with unknown outcomes skipped)", report.result.unrecognized);
    }

    for segment in &report.segments {
        match segment.category {
            Some(category) => println!(
                "  {} {:>6.2}% - {:>6.2}%",
                category, segment.start_percent, segment.end_percent
            ),
            None => println!("  (nothing to chart)"),
        }
    }
}
