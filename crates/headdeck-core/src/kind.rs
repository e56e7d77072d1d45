// ── Resource kinds ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// One of the four fetchable collections. Declaration order is the
/// navigation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Users,
    Nodes,
    Routes,
    ApiKeys,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Nodes => "Nodes",
            Self::Routes => "Routes",
            Self::ApiKeys => "API Keys",
        }
    }

    /// The view path that lists this collection.
    pub fn path(self) -> &'static str {
        match self {
            Self::Users => "/users",
            Self::Nodes => "/nodes",
            Self::Routes => "/routes",
            Self::ApiKeys => "/api-keys",
        }
    }

    pub fn icon(self) -> NavIcon {
        match self {
            Self::Users => NavIcon::User,
            Self::Nodes => NavIcon::Hexagon,
            Self::Routes => NavIcon::Route,
            Self::ApiKeys => NavIcon::BookKey,
        }
    }
}

/// Icon identifier handed to the rendering layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NavIcon {
    User,
    Hexagon,
    Route,
    BookKey,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn order_is_users_nodes_routes_api_keys() {
        let kinds: Vec<_> = ResourceKind::iter().collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Users,
                ResourceKind::Nodes,
                ResourceKind::Routes,
                ResourceKind::ApiKeys
            ]
        );
    }

    #[test]
    fn display_is_kebab_case() {
        assert_eq!(ResourceKind::ApiKeys.to_string(), "api-keys");
        assert_eq!(NavIcon::BookKey.to_string(), "book-key");
    }
}
