// headdeck-core: Reactive data layer between headdeck-api and consumers (CLI/UI).

pub mod aggregator;
pub mod error;
pub mod kind;
pub mod nav;
pub mod navigation;
pub mod state;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::Aggregator;
pub use error::CoreError;
pub use kind::{NavIcon, ResourceKind};
pub use nav::{NavCounts, NavEntry, nav_entries, select};
pub use navigation::Navigation;
pub use state::{CollectionState, FetchError};
pub use stream::{StateStream, StateWatchStream};

// Re-export the entity types so consumers need only one dependency.
pub use headdeck_api::{ApiKey, Node, PreAuthKey, Route, User};
