//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Mask every plaintext key before the config is printed.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
    }
}

/// TOML for table output, since that is what the file itself looks like.
fn to_toml<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    toml::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::effective_path(global);
    match args.command {
        ConfigCommand::Init => {
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", path.display()),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
                eprintln!("Next: headdeck setup");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load(global)?;
            redact(&mut cfg);
            let out = match &global.output {
                OutputFormat::Table => to_toml(&cfg)?,
                format => output::render_single(
                    format,
                    &cfg,
                    |_| String::new(),
                    |c| c.default_profile.clone().unwrap_or_default(),
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use headdeck_config::Profile;

    use super::*;

    #[test]
    fn redact_masks_plaintext_keys_only() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                api_key: Some("hskey-secret".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert("env".into(), Profile::default());
        redact(&mut cfg);
        assert_eq!(cfg.profiles["lab"].api_key.as_deref(), Some(REDACTED));
        assert!(cfg.profiles["env"].api_key.is_none());
    }

    #[test]
    fn table_output_is_toml() {
        let out = to_toml(&Config::default()).unwrap();
        assert!(out.contains("[gateway]"));
        assert!(out.contains("upstream"));
    }

    #[test]
    fn toml_failure_is_a_render_error() {
        let err = to_toml(&42_u32).unwrap_err();
        assert!(matches!(err, CliError::Render(_)));
    }
}
