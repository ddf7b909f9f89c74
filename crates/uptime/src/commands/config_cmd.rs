//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_config() -> Result<Config, CliError> {
    let mut cfg = Config::default();

    cfg.api.base_url = Input::new()
        .with_prompt("Monitoring service API URL")
        .default(cfg.api.base_url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.polling.endpoints_secs = Input::new()
        .with_prompt("Refresh endpoints every (seconds)")
        .default(cfg.polling.endpoints_secs)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.polling.alerts_secs = Input::new()
        .with_prompt("Refresh alerts every (seconds)")
        .default(cfg.polling.alerts_secs)
        .interact_text()
        .map_err(prompt_err)?;

    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { defaults } => {
            let path = config::active_path(global);
            if path.exists()
                && !super::util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let cfg = if defaults || !std::io::stdin().is_terminal() {
                Config::default()
            } else {
                prompt_config()?
            };
            // Refuse to write something that would not load back.
            config::dashboard_config(&cfg)?;
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let rendered =
                toml::to_string_pretty(&cfg).map_err(uptime_config::ConfigError::from)?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::active_path(global).display().to_string(), false);
            Ok(())
        }
    }
}
