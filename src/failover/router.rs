use super::{
    actor::{self, FailureReport, RouterActorHandle, RouterArgs, SuccessReport},
    clock::{Clock, LocalClock},
    registry::{ProviderId, ProviderSpec, ProviderStatus},
};
use crate::error::HearthError;
use crate::providers::{ActionForError, ProviderManifestEntry, save_manifest};
use hearth_schema::ChatMessage;
use std::{path::Path, sync::Arc, time::Instant};
use tracing::{debug, info, warn};

/// Reply from whichever provider answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCompletion {
    pub text: String,
    pub provider: String,
    pub tokens_used: u64,
}

/// A reserved quota slot. Dropping it unsettled (the send future was cancelled mid-call)
/// hands the slot back to the router.
struct Reservation<'a> {
    handle: &'a RouterActorHandle,
    id: ProviderId,
    settled: bool,
}

impl Reservation<'_> {
    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.handle.release(self.id);
        }
    }
}

/// Multi-provider failover router.
///
/// Cheap to clone; every clone talks to the same router actor, which is the single writer for
/// quota counters, availability, the rotation index and the conversation context.
#[derive(Clone)]
pub struct FailoverRouter {
    handle: RouterActorHandle,
}

impl FailoverRouter {
    /// Spawns a router over `specs` (rotation order) using the local calendar date.
    pub async fn spawn(
        specs: Vec<ProviderSpec>,
        max_context_entries: usize,
    ) -> Result<Self, HearthError> {
        Self::spawn_with_clock(specs, max_context_entries, Arc::new(LocalClock)).await
    }

    pub async fn spawn_with_clock(
        specs: Vec<ProviderSpec>,
        max_context_entries: usize,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, HearthError> {
        let handle = actor::spawn(RouterArgs {
            specs,
            max_context_entries,
            clock,
        })
        .await?;
        Ok(Self { handle })
    }

    /// Delivers `message` through the first provider that answers, starting at the rotation
    /// index. Each available provider is tried at most once, and only after a quota slot has
    /// been reserved for it.
    pub async fn send(
        &self,
        message: &str,
        preserve_context: bool,
    ) -> Result<RoutedCompletion, HearthError> {
        if message.trim().is_empty() {
            return Err(HearthError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        let plan = self.handle.plan(preserve_context).await?;
        let mut attempts = 0;

        for candidate in plan.candidates {
            // Concurrent sends may have used up the slot this plan saw as free.
            let Some(leased_on) = self.handle.reserve(candidate.id).await? else {
                debug!(provider = %candidate.name, "Quota taken by concurrent sends, skipping");
                continue;
            };
            attempts += 1;
            let mut reservation = Reservation {
                handle: &self.handle,
                id: candidate.id,
                settled: false,
            };

            let start = Instant::now();
            match candidate
                .adapter
                .send_message(message, &plan.context)
                .await
            {
                Ok(completion) => {
                    info!(
                        provider = %candidate.name,
                        position = candidate.position,
                        tokens_used = completion.tokens_used,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "[{}] Message delivered",
                        candidate.name
                    );

                    // The report settles the slot as soon as it is sent.
                    reservation.settle();
                    self.handle
                        .report_success(SuccessReport {
                            id: candidate.id,
                            position: candidate.position,
                            leased_on,
                            user: message.to_string(),
                            assistant: completion.text.clone(),
                            preserve_context,
                        })
                        .await?;

                    return Ok(RoutedCompletion {
                        text: completion.text,
                        provider: candidate.name,
                        tokens_used: completion.tokens_used,
                    });
                }

                Err(error) => {
                    let action = ActionForError::for_error(&error);
                    warn!(
                        provider = %candidate.name,
                        status = ?error.status(),
                        action = ?action,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "[{}] Provider failed: {}",
                        candidate.name,
                        error
                    );

                    reservation.settle();
                    self.handle.report_failure(FailureReport {
                        id: candidate.id,
                        leased_on,
                        error: error.to_string(),
                        mark_unavailable: action == ActionForError::MarkUnavailable,
                    });
                }
            }
        }

        if attempts == 0 {
            return Err(HearthError::AllProvidersExhausted);
        }
        Err(HearthError::AllProvidersFailed { attempts })
    }

    /// Status of every configured provider, after the lazy daily rollover.
    pub async fn provider_status(&self) -> Result<Vec<ProviderStatus>, HearthError> {
        self.handle.status().await
    }

    pub async fn reset_conversation(&self) -> Result<(), HearthError> {
        self.handle.reset_conversation().await
    }

    /// Appends a provider to the end of the rotation.
    pub async fn add_provider(&self, spec: ProviderSpec) -> Result<ProviderId, HearthError> {
        self.handle.add_provider(spec).await
    }

    pub async fn context(&self) -> Result<Vec<ChatMessage>, HearthError> {
        self.handle.context().await
    }

    pub async fn rotation_index(&self) -> Result<usize, HearthError> {
        self.handle.rotation_index().await
    }

    pub async fn manifest(&self) -> Result<Vec<ProviderManifestEntry>, HearthError> {
        self.handle.manifest().await
    }

    /// Writes the current rotation to a credential-free JSON manifest.
    pub async fn save_manifest(&self, path: impl AsRef<Path>) -> Result<(), HearthError> {
        let entries = self.handle.manifest().await?;
        save_manifest(path, &entries)
    }
}
