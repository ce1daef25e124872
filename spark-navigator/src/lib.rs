pub mod config;
pub mod dispatch;
pub mod logging;
pub mod navigate;
pub mod runtime;

pub use config::NavigatorConfig;
pub use dispatch::CommandDispatcher;
pub use navigate::engine::NavigationEngine;
pub use runtime::Navigator;
