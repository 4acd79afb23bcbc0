mod hearth;
mod provider;

pub use hearth::HearthError;
pub use provider::ProviderError;
