use super::{
    clock::Clock,
    context::ConversationContext,
    registry::{ProviderId, ProviderRegistry, ProviderSpec, ProviderStatus},
};
use crate::error::HearthError;
use crate::providers::{ChatAdapter, ProviderManifestEntry};
use chrono::NaiveDate;
use hearth_schema::ChatMessage;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One provider to try, in rotation order.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: ProviderId,
    /// Index of the provider inside the available set the plan was cut from.
    pub position: usize,
    pub name: String,
    pub adapter: Arc<dyn ChatAdapter>,
}

/// Snapshot leased to a single send: candidates plus the context to forward.
#[derive(Debug, Clone)]
pub struct SendPlan {
    pub candidates: Vec<Candidate>,
    pub context: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct SuccessReport {
    pub id: ProviderId,
    pub position: usize,
    /// Day the quota slot was reserved on.
    pub leased_on: NaiveDate,
    pub user: String,
    pub assistant: String,
    pub preserve_context: bool,
}

#[derive(Debug)]
pub struct FailureReport {
    pub id: ProviderId,
    pub leased_on: NaiveDate,
    pub error: String,
    pub mark_unavailable: bool,
}

/// Messages handled by the router actor.
#[derive(Debug)]
pub enum RouterMessage {
    /// Lease a send plan. The flag says whether the context should be included.
    Plan(bool, RpcReplyPort<Result<SendPlan, HearthError>>),

    /// Reserve one quota slot on a candidate right before calling it. Replies with the
    /// reservation date, or `None` when the provider can no longer take the send.
    Reserve(ProviderId, RpcReplyPort<Option<NaiveDate>>),

    /// Give back a reserved slot whose send was abandoned before reporting.
    Release(ProviderId),

    /// A candidate answered; settle its slot, record the turn and move the rotation index.
    ReportSuccess(SuccessReport, RpcReplyPort<()>),

    /// A candidate failed; release its slot, record the error and, for rate limits, take it
    /// out of rotation.
    ReportFailure(FailureReport),

    AddProvider(ProviderSpec, RpcReplyPort<ProviderId>),
    Status(RpcReplyPort<Vec<ProviderStatus>>),
    Context(RpcReplyPort<Vec<ChatMessage>>),
    ResetConversation(RpcReplyPort<()>),
    RotationIndex(RpcReplyPort<usize>),
    Manifest(RpcReplyPort<Vec<ProviderManifestEntry>>),
}

/// Handle for interacting with the router actor.
#[derive(Clone)]
pub(crate) struct RouterActorHandle {
    actor: ActorRef<RouterMessage>,
}

impl RouterActorHandle {
    pub(crate) async fn plan(&self, preserve_context: bool) -> Result<SendPlan, HearthError> {
        ractor::call!(self.actor, RouterMessage::Plan, preserve_context)
            .map_err(|e| HearthError::RactorError(format!("Plan RPC failed: {e}")))?
    }

    pub(crate) async fn reserve(&self, id: ProviderId) -> Result<Option<NaiveDate>, HearthError> {
        ractor::call!(self.actor, RouterMessage::Reserve, id)
            .map_err(|e| HearthError::RactorError(format!("Reserve RPC failed: {e}")))
    }

    pub(crate) fn release(&self, id: ProviderId) {
        if let Err(e) = ractor::cast!(self.actor, RouterMessage::Release(id)) {
            warn!(provider_id = id, error = %e, "Release cast failed; quota slot stays reserved");
        }
    }

    pub(crate) async fn report_success(&self, report: SuccessReport) -> Result<(), HearthError> {
        ractor::call!(self.actor, RouterMessage::ReportSuccess, report)
            .map_err(|e| HearthError::RactorError(format!("ReportSuccess RPC failed: {e}")))
    }

    pub(crate) fn report_failure(&self, report: FailureReport) {
        let id = report.id;
        if let Err(e) = ractor::cast!(self.actor, RouterMessage::ReportFailure(report)) {
            warn!(provider_id = id, error = %e, "ReportFailure cast failed; failure not recorded");
        }
    }

    pub(crate) async fn add_provider(&self, spec: ProviderSpec) -> Result<ProviderId, HearthError> {
        ractor::call!(self.actor, RouterMessage::AddProvider, spec)
            .map_err(|e| HearthError::RactorError(format!("AddProvider RPC failed: {e}")))
    }

    pub(crate) async fn status(&self) -> Result<Vec<ProviderStatus>, HearthError> {
        ractor::call!(self.actor, RouterMessage::Status)
            .map_err(|e| HearthError::RactorError(format!("Status RPC failed: {e}")))
    }

    pub(crate) async fn context(&self) -> Result<Vec<ChatMessage>, HearthError> {
        ractor::call!(self.actor, RouterMessage::Context)
            .map_err(|e| HearthError::RactorError(format!("Context RPC failed: {e}")))
    }

    pub(crate) async fn reset_conversation(&self) -> Result<(), HearthError> {
        ractor::call!(self.actor, RouterMessage::ResetConversation)
            .map_err(|e| HearthError::RactorError(format!("ResetConversation RPC failed: {e}")))
    }

    pub(crate) async fn rotation_index(&self) -> Result<usize, HearthError> {
        ractor::call!(self.actor, RouterMessage::RotationIndex)
            .map_err(|e| HearthError::RactorError(format!("RotationIndex RPC failed: {e}")))
    }

    pub(crate) async fn manifest(&self) -> Result<Vec<ProviderManifestEntry>, HearthError> {
        ractor::call!(self.actor, RouterMessage::Manifest)
            .map_err(|e| HearthError::RactorError(format!("Manifest RPC failed: {e}")))
    }
}

pub(crate) struct RouterArgs {
    pub specs: Vec<ProviderSpec>,
    pub max_context_entries: usize,
    pub clock: Arc<dyn Clock>,
}

struct RouterState {
    registry: ProviderRegistry,
    context: ConversationContext,
    rotation_index: usize,
    clock: Arc<dyn Clock>,
}

struct RouterActor;

#[ractor::async_trait]
impl Actor for RouterActor {
    type Msg = RouterMessage;
    type State = RouterState;
    type Arguments = RouterArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let RouterArgs {
            specs,
            max_context_entries,
            clock,
        } = args;

        let today = clock.today();
        let mut registry = ProviderRegistry::new();
        for spec in specs {
            info!(
                provider = %spec.name,
                kind = %spec.kind,
                model = %spec.model,
                daily_limit = spec.daily_limit,
                "Added AI provider"
            );
            registry.add(spec, today);
        }

        info!(
            providers = registry.len(),
            max_context_entries,
            %today,
            "FailoverRouter started"
        );

        Ok(RouterState {
            registry,
            context: ConversationContext::new(max_context_entries),
            rotation_index: 0,
            clock,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            RouterMessage::Plan(preserve_context, rp) => {
                let _ = rp.send(Self::plan(state, preserve_context));
            }

            RouterMessage::Reserve(id, rp) => {
                let today = state.clock.today();
                let reserved = state
                    .registry
                    .get_mut(id)
                    .is_some_and(|provider| provider.try_reserve(today));
                let _ = rp.send(reserved.then_some(today));
            }

            RouterMessage::Release(id) => {
                if let Some(provider) = state.registry.get_mut(id) {
                    provider.release();
                    debug!(provider = %provider.name(), "Abandoned send released its slot");
                }
            }

            RouterMessage::ReportSuccess(report, rp) => {
                Self::handle_report_success(state, report);
                let _ = rp.send(());
            }

            RouterMessage::ReportFailure(report) => {
                Self::handle_report_failure(state, report);
            }

            RouterMessage::AddProvider(spec, rp) => {
                info!(provider = %spec.name, kind = %spec.kind, "Added AI provider");
                let id = state.registry.add(spec, state.clock.today());
                let _ = rp.send(id);
            }

            RouterMessage::Status(rp) => {
                let today = state.clock.today();
                let _ = rp.send(state.registry.statuses(today));
            }

            RouterMessage::Context(rp) => {
                let _ = rp.send(state.context.snapshot());
            }

            RouterMessage::ResetConversation(rp) => {
                state.context.clear();
                info!("Conversation context reset");
                let _ = rp.send(());
            }

            RouterMessage::RotationIndex(rp) => {
                let _ = rp.send(state.rotation_index);
            }

            RouterMessage::Manifest(rp) => {
                let _ = rp.send(state.registry.manifest());
            }
        }
        Ok(())
    }
}

impl RouterActor {
    fn plan(state: &mut RouterState, preserve_context: bool) -> Result<SendPlan, HearthError> {
        if state.registry.is_empty() {
            return Err(HearthError::NoProvidersConfigured);
        }

        let available = state.registry.available_ids(state.clock.today());
        if available.is_empty() {
            warn!(
                providers = state.registry.len(),
                "All AI providers have reached their daily limits"
            );
            return Err(HearthError::AllProvidersExhausted);
        }

        let start = state.rotation_index % available.len();
        let candidates: Vec<Candidate> = (0..available.len())
            .map(|offset| (start + offset) % available.len())
            .filter_map(|position| {
                let id = available[position];
                state.registry.get(id).map(|provider| Candidate {
                    id,
                    position,
                    name: provider.name().to_string(),
                    adapter: provider.adapter(),
                })
            })
            .collect();

        debug!(
            available = available.len(),
            start,
            first = %candidates.first().map_or("-", |c| c.name.as_str()),
            "Send plan leased"
        );

        let context = if preserve_context {
            state.context.snapshot()
        } else {
            Vec::new()
        };

        Ok(SendPlan {
            candidates,
            context,
        })
    }

    fn handle_report_success(state: &mut RouterState, report: SuccessReport) {
        let SuccessReport {
            id,
            position,
            leased_on,
            user,
            assistant,
            preserve_context,
        } = report;

        let today = state.clock.today();
        let Some(provider) = state.registry.get_mut(id) else {
            return;
        };
        // Roll over first so a send leased before midnight lands in today's counter.
        provider.reset_daily_counter(today);
        provider.release();
        provider.record_success();
        if leased_on < today {
            debug!(provider = %provider.name(), %leased_on, "Send settled after rollover");
        }

        if preserve_context {
            state.context.push_turn(user, assistant);
        }
        state.rotation_index = position;

        debug!(
            provider = %provider.name(),
            rotation_index = position,
            context_len = state.context.len(),
            "Send recorded"
        );
    }

    fn handle_report_failure(state: &mut RouterState, report: FailureReport) {
        let FailureReport {
            id,
            leased_on,
            error,
            mark_unavailable,
        } = report;

        let today = state.clock.today();
        let Some(provider) = state.registry.get_mut(id) else {
            return;
        };
        provider.reset_daily_counter(today);
        provider.release();

        // A rate limit seen yesterday says nothing about today's quota.
        let mark_unavailable = mark_unavailable && leased_on >= provider.last_reset();
        provider.record_failure(error, mark_unavailable);

        if mark_unavailable {
            info!(
                provider = %provider.name(),
                "Provider rate limited; unavailable until the next calendar day"
            );
        }
    }
}

pub(crate) async fn spawn(args: RouterArgs) -> Result<RouterActorHandle, HearthError> {
    let (actor, _jh) = Actor::spawn(None, RouterActor, args)
        .await
        .map_err(|e| HearthError::RactorError(format!("failed to spawn router actor: {e}")))?;

    Ok(RouterActorHandle { actor })
}
