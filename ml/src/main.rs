use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use maplineage::cli::{Cli, Command, OutputFormat};
use maplineage::config::Config;
use maplineage::{ConnectorReport, InferenceReport, UnboundPolicy, TARGET_DEFINITION};

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = log_level {
        let level: log::LevelFilter = level
            .parse()
            .map_err(|_| eyre::eyre!("Invalid log level: {}", level))?;
        builder.filter_level(level);
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("maplineage starting");

    match cli.command {
        Command::Connectors {
            mapping,
            output,
            skip_unresolved,
        } => {
            let section = &mut config.connectors;
            if mapping.is_some() {
                section.mapping = mapping;
            }
            if let Some(output) = output {
                section.output = output;
            }
            if skip_unresolved {
                section.on_unresolved_instance = UnboundPolicy::Skip;
            }

            let job = section.job()?;
            let summary = maplineage::run_connector_lineage(&job)
                .context(format!("Connector lineage failed for {}", job.mapping.display()))?;
            println!(
                "{} Wrote {} ({} edges, {} skipped)",
                "✓".green(),
                summary.output.display().to_string().cyan(),
                summary.lineage_rows,
                summary.unresolved
            );
        }
        Command::Infer {
            mapping,
            repo_metadata,
            session_log,
            output,
        } => {
            let section = &mut config.inference;
            if mapping.is_some() {
                section.mapping = mapping;
            }
            if repo_metadata.is_some() {
                section.repo_metadata = repo_metadata;
            }
            if session_log.is_some() {
                section.session_log = session_log;
            }
            if let Some(output) = output {
                section.output = output;
            }

            let job = section.job()?;
            let summary = maplineage::run_inferred_lineage(&job)
                .context(format!("Inferred lineage failed for {}", job.mapping.display()))?;
            println!(
                "{} Wrote {} ({} records, {} unresolved)",
                "✓".green(),
                summary.output.display().to_string().cyan(),
                summary.lineage_rows,
                summary.unresolved
            );
        }
        Command::Show {
            mapping,
            inferred,
            format,
        } => {
            if inferred {
                let report = maplineage::analyze_inference(
                    &mapping,
                    config.inference.repo_metadata.as_deref(),
                    config.inference.session_log.as_deref(),
                )?;
                print_inferred(&report, format)?;
            } else {
                let report = maplineage::analyze_connectors(&mapping, config.connectors.on_unresolved_instance)?;
                print_connectors(&report, format)?;
            }
        }
        Command::Config { write } => match write {
            Some(path) => {
                config
                    .save(&path)
                    .context(format!("Failed to write config to {}", path.display()))?;
                println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
            }
            None => print!("{}", serde_yaml::to_string(&config)?),
        },
    }

    Ok(())
}

fn print_connectors(report: &ConnectorReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.lineage.edges)?);
        }
        OutputFormat::Text => {
            if report.lineage.edges.is_empty() {
                println!("No connectors found");
            }
            for edge in &report.lineage.edges {
                let kind = report
                    .transformations
                    .kind_of(&edge.to_transformation)
                    .unwrap_or(TARGET_DEFINITION);
                println!(
                    "{}.{} -> {}.{} {}",
                    edge.from_transformation.yellow(),
                    edge.from_field,
                    edge.to_transformation.cyan(),
                    edge.to_field,
                    format!("({})", kind).dimmed()
                );
            }
            for connector in &report.lineage.skipped {
                println!(
                    "{} line {}: {}.{} -> {}.{}",
                    "skipped".red(),
                    connector.line,
                    connector.from_instance,
                    connector.from_field,
                    connector.to_instance,
                    connector.to_field
                );
            }
        }
    }
    Ok(())
}

fn print_inferred(report: &InferenceReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.records)?);
        }
        OutputFormat::Text => {
            if report.records.is_empty() {
                println!("No target fields found");
            }
            for record in &report.records {
                let target = format!("{}.{}", record.target_name, record.target_field);
                if !record.is_resolved() {
                    println!("{} <- {}", target.cyan(), "unresolved".red());
                    continue;
                }
                let source = if record.has_source() {
                    format!("{}.{}", record.source_name, record.source_field)
                } else {
                    "?".to_string()
                };
                println!(
                    "{} <- {} {} <- {}",
                    target.cyan(),
                    record.transformation_name.yellow(),
                    format!("({})", record.transformation_type).dimmed(),
                    source
                );
            }
        }
    }
    Ok(())
}
