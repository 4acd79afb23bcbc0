mod actor;
mod clock;
mod context;
mod registry;
mod router;

pub use actor::{Candidate, SendPlan};
pub use clock::{Clock, LocalClock, ManualClock};
pub use context::{ConversationContext, DEFAULT_MAX_CONTEXT_ENTRIES};
pub use registry::{Provider, ProviderId, ProviderRegistry, ProviderSpec, ProviderStatus};
pub use router::{FailoverRouter, RoutedCompletion};
