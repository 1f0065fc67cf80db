// Library interface for feedwire (used by the replay binary and integration tests)
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod host;

#[macro_use]
pub mod logging;

pub mod navigation;
pub mod notify;
pub mod page;
pub mod server_config;
pub mod timeline;
pub mod view;
