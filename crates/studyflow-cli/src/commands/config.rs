use clap::Subcommand;
use studyflow_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// max-daily-hours | neutral-importance | date-format | show-tips
        key: String,
        value: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            match key.as_str() {
                "max-daily-hours" => config.scheduler.max_daily_hours = value.parse()?,
                "neutral-importance" => config.scheduler.neutral_importance = value.parse()?,
                "date-format" => config.display.date_format = value,
                "show-tips" => config.display.show_tips = value.parse()?,
                _ => return Err(format!("unknown configuration key '{key}'").into()),
            }
            config.save()?;
            println!("configuration updated");
        }
    }
    Ok(())
}
