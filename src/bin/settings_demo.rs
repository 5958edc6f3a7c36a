use relation_service::settings::*;

fn main() -> anyhow::Result<()> {
    // $ cargo run --bin settings_demo -- --settings=settings/release.toml
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;

    println!("http:    {:?}", project_settings.http);
    println!("store:   {:?}", project_settings.store.backend);
    println!("counter: {:?}", project_settings.counter.backend);
    println!("bus:     {:?}", project_settings.bus.backend);

    let is_err = parse_settings(Some("settings/missing.toml")).is_err();
    println!("missing file rejected: {is_err}");

    Ok(())
}
