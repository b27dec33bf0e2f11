//! Default configuration command
//!
//! Usage: idmatch default-config > idmatch.toml

use idmatch_core::MatchConfig;

pub fn execute() -> anyhow::Result<()> {
    let toml = MatchConfig::default().to_toml()?;
    print!("{}", toml);
    Ok(())
}
