//! `headdeck serve`: run the gateway until Ctrl+C / SIGTERM.

use tokio_util::sync::CancellationToken;

use crate::cli::{GlobalOpts, ServeArgs};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: &ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let gateway = config::gateway_config(global, &cfg, args)?;

    let credentials = if args.inject_credential || cfg.gateway.inject_credential {
        let (profile_name, profile) = config::active_profile(global, &cfg)?;
        tracing::info!(profile = %profile_name, "injecting stored API key upstream");
        Some(config::credential_store(global, &profile, &profile_name))
    } else {
        None
    };

    let token = CancellationToken::new();
    tokio::spawn(headdeck_gateway::shutdown_on_signal(token.clone()));

    if !global.quiet {
        eprintln!(
            "headdeck gateway on http://{} -> {}",
            gateway.listen, gateway.upstream
        );
    }
    headdeck_gateway::serve(gateway, credentials, token).await?;
    Ok(())
}
