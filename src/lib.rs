pub mod config;
pub mod error;
pub mod failover;
pub mod providers;
pub mod server;
pub(crate) mod utils;

pub use config::Config;
pub use error::{HearthError, ProviderError};
pub use failover::{FailoverRouter, RoutedCompletion};
