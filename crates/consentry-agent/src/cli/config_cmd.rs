use super::commands::ConfigAction;
use consentry_agent::AgentConfig;
use consentry_types::{AgentError, AgentResult};
use std::path::Path;

pub fn handle_config(config_path: &Path, action: Option<ConfigAction>) -> AgentResult<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = AgentConfig::load(config_path)?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| AgentError::Config(format!("Failed to render config: {}", e)))?;
            println!("{}", rendered);
        }
        ConfigAction::Validate => {
            AgentConfig::load(config_path)?;
            println!("Configuration OK: {:?}", config_path);
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                return Err(AgentError::Config(format!(
                    "Config already exists at {:?} (use --force to overwrite)",
                    config_path
                )));
            }
            AgentConfig::default().save(config_path)?;
            println!("Default configuration written to {:?}", config_path);
        }
    }
    Ok(())
}
