//! Command dispatch: bridges CLI args -> aggregator fetches -> output formatting.

pub mod config_cmd;
pub mod resources;
pub mod serve;
pub mod setup;
pub mod summary;

use headdeck_core::Aggregator;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Users => resources::users(&connect(global)?, global).await,
        Command::Nodes => resources::nodes(&connect(global)?, global).await,
        Command::Routes => resources::routes(&connect(global)?, global).await,
        Command::ApiKeys => resources::api_keys(&connect(global)?, global).await,
        Command::Summary(args) => summary::handle(&connect(global)?, &args, global).await,
        Command::Serve(args) => serve::handle(&args, global).await,
        Command::Setup(args) => setup::handle(&args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// A connected aggregator for the active profile.
pub struct Session {
    pub aggregator: Aggregator,
    pub profile: String,
}

impl Session {
    /// Run `fetch` and report whether it ended in the setup redirect.
    pub async fn fetch_checked<F>(&self, fetch: F) -> Result<(), CliError>
    where
        F: Future<Output = ()>,
    {
        let epoch = self.aggregator.navigation().epoch();
        fetch.await;
        if self.aggregator.navigation().epoch() == epoch {
            Ok(())
        } else {
            Err(CliError::SetupRequired {
                profile: self.profile.clone(),
            })
        }
    }
}

fn connect(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = config::load(global)?;
    let (profile_name, profile) = config::active_profile(global, &cfg)?;
    let settings = config::client_settings(global, &cfg, &profile)?;
    let credentials = config::credential_store(global, &profile, &profile_name);

    tracing::debug!(
        profile = %profile_name,
        gateway = %settings.base_url,
        "connecting"
    );
    let aggregator = Aggregator::connect(settings.base_url, credentials, &settings.transport)?;
    Ok(Session {
        aggregator,
        profile: profile_name,
    })
}
