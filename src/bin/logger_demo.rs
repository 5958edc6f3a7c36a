use relation_service::logger::*;
use relation_service::settings::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    debug!("hidden: bootstrap filter is info");
    info!("bootstrap info log");

    // $ cargo run --bin logger_demo -- --settings=settings/dev.toml
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    info!(filter = %project_settings.log.filter, "filter reloaded from settings");
    debug!(target: "relation_service::server", "visible under the dev filter");
    trace!("hidden unless the filter asks for trace");

    let is_err = logger
        .reload_from_config(&LogConfig {
            filter: "relation_service=loud".to_string(),
        })
        .is_err();
    info!(is_err, "malformed filter rejected");

    Ok(())
}
