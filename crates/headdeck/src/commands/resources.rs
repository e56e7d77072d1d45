//! Collection listing handlers: users, nodes, routes, api-keys.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use headdeck_core::{ApiKey, CollectionState, Node, Route, User};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            created: timestamp(u.created_at.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id.clone(),
            name: n.display_name().to_owned(),
            user: n.user.name.clone(),
            ip: output::or_dash(&n.ip_addresses.join(", ")),
            online: if n.online { "yes" } else { "no" }.into(),
            last_seen: timestamp(n.last_seen.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Prefix")]
    prefix: String,
    #[tabled(rename = "Advertised")]
    advertised: bool,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "Primary")]
    primary: bool,
}

impl From<&Route> for RouteRow {
    fn from(r: &Route) -> Self {
        Self {
            id: r.id.clone(),
            node: r.node.display_name().to_owned(),
            prefix: r.prefix.clone(),
            advertised: r.advertised,
            enabled: r.enabled,
            primary: r.is_primary,
        }
    }
}

#[derive(Tabled)]
struct ApiKeyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Prefix")]
    prefix: String,
    #[tabled(rename = "Expires")]
    expiration: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&ApiKey> for ApiKeyRow {
    fn from(k: &ApiKey) -> Self {
        Self {
            id: k.id.clone(),
            prefix: k.prefix.clone(),
            expiration: timestamp(k.expiration.as_ref()),
            last_seen: timestamp(k.last_seen.as_ref()),
        }
    }
}

fn timestamp(ts: Option<&DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn users(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let agg = &session.aggregator;
    session.fetch_checked(agg.fetch_users()).await?;
    let data = settled(agg.users())?;
    let out = output::render_list(
        &global.output,
        data.as_slice(),
        |u| UserRow::from(u),
        |u| u.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn nodes(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let agg = &session.aggregator;
    session.fetch_checked(agg.fetch_nodes()).await?;
    let data = settled(agg.nodes())?;
    let out = output::render_list(
        &global.output,
        data.as_slice(),
        |n| NodeRow::from(n),
        |n| n.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn routes(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let agg = &session.aggregator;
    session.fetch_checked(agg.fetch_routes()).await?;
    let data = settled(agg.routes())?;
    let out = output::render_list(
        &global.output,
        data.as_slice(),
        |r| RouteRow::from(r),
        |r| r.prefix.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn api_keys(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let agg = &session.aggregator;
    session.fetch_checked(agg.fetch_api_keys()).await?;
    let data = settled(agg.api_keys())?;
    let out = output::render_list(
        &global.output,
        data.as_slice(),
        |k| ApiKeyRow::from(k),
        |k| k.prefix.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// The collection's data, or its fetch error.
fn settled<T>(state: CollectionState<T>) -> Result<std::sync::Arc<Vec<T>>, CliError> {
    match state.error {
        Some(err) => Err(err.into()),
        None => Ok(state.data),
    }
}
