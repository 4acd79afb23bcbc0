mod adapter;
mod bootstrap;
mod chat_completions;
mod claude;
mod http;
mod kind;
mod manifest;
mod policy;

pub use adapter::{ChatAdapter, Completion, VendorCredentials, build_adapter};
pub use bootstrap::{provider_specs_from_config, spawn_router};
pub use chat_completions::ChatCompletionsAdapter;
pub use claude::ClaudeAdapter;
pub use http::build_http_client;
pub use kind::ProviderKind;
pub use manifest::{ProviderManifestEntry, load_manifest, save_manifest};
pub use policy::{ActionForError, UPSTREAM_BODY_PREVIEW_CHARS, classify_status, classify_upstream_error};
