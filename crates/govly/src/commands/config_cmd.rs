//! Config command handlers.

use dialoguer::Password;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{active_profile_name, config_path, load_config_or_default};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let config = load_config_or_default();
            let profile = active_profile_name(global, &config);
            let mut lines = vec![
                format!("config file:     {}", config_path().display()),
                format!("active profile:  {profile}"),
                format!("output:          {}", config.defaults.output),
                format!("poll interval:   {}s", config.defaults.poll_interval),
                format!("timeout:         {}s", config.defaults.timeout),
            ];
            for (name, entry) in &config.profiles {
                let key_source = if entry.api_key.is_some() {
                    "plaintext"
                } else if entry.api_key_env.is_some() {
                    "env"
                } else {
                    "keyring"
                };
                lines.push(format!("profile {name}: api key via {key_source}"));
            }
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetKey => {
            let config = load_config_or_default();
            let profile = active_profile_name(global, &config);
            let key = Password::new()
                .with_prompt(format!("API key for profile '{profile}'"))
                .interact()
                .map_err(|e| CliError::Validation(format!("prompt failed: {e}")))?;
            govly_config::store_api_key(&profile, &key)?;
            if !global.quiet {
                eprintln!("API key stored in the system keyring for profile '{profile}'");
            }
            Ok(())
        }
    }
}
