use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "relation-service", about = "Friend, favorite and party relations")]
pub struct Cli {
    /// Settings file; defaults to settings/dev.toml (debug) or settings/release.toml.
    #[arg(long)]
    pub settings: Option<String>,
}
