//! `headdeck setup`: store the API key in the system keyring and check it.

use std::sync::Arc;

use headdeck_api::{Credential, CredentialStore, MemoryCredentialStore};
use headdeck_config::KeyringCredentialStore;
use headdeck_core::Aggregator;

use crate::cli::{GlobalOpts, SetupArgs};
use crate::config;
use crate::error::CliError;

use super::Session;

pub async fn handle(args: &SetupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let (profile_name, profile) = config::active_profile(global, &cfg)?;
    let store = KeyringCredentialStore::new(&profile_name);

    if args.clear {
        store.clear()?;
        if !global.quiet {
            eprintln!("API key removed for profile '{profile_name}'");
        }
        return Ok(());
    }

    let key = match global.api_key.clone() {
        Some(key) => key,
        None => rpassword::prompt_password(format!("API key for '{profile_name}': "))?,
    };
    let credential = Credential::new(key.trim());
    if credential.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }

    store.set(credential.clone())?;
    tracing::info!(account = store.account(), "API key stored in keyring");
    if !global.quiet {
        eprintln!("API key stored for profile '{profile_name}'");
    }

    if args.no_verify {
        return Ok(());
    }

    let settings = config::client_settings(global, &cfg, &profile)?;
    let session = Session {
        aggregator: Aggregator::connect(
            settings.base_url,
            Arc::new(MemoryCredentialStore::with_credential(credential)),
            &settings.transport,
        )?,
        profile: profile_name,
    };
    let agg = &session.aggregator;
    session
        .fetch_checked(agg.fetch_users())
        .await
        .map_err(|_| CliError::AuthRejected {
            profile: session.profile.clone(),
        })?;
    if let Some(err) = agg.error(headdeck_core::ResourceKind::Users) {
        return Err(err.into());
    }

    if !global.quiet {
        eprintln!(
            "Verified: the server lists {} user(s)",
            agg.count(headdeck_core::ResourceKind::Users)
        );
    }
    Ok(())
}
