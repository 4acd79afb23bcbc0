use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::providers::{ChatAdapter, ProviderKind, ProviderManifestEntry};

pub type ProviderId = usize;

/// Everything needed to put a provider into rotation.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: Url,
    pub model: String,
    pub daily_limit: u32,
    pub adapter: Arc<dyn ChatAdapter>,
}

/// Read-only view of one provider, as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    pub available: bool,
    pub messages_used: u32,
    pub daily_limit: u32,
    pub last_error: Option<String>,
}

/// Runtime provider = static spec + daily quota state.
#[derive(Debug)]
pub struct Provider {
    spec: ProviderSpec,
    messages_used_today: u32,
    /// Quota slots reserved by sends still waiting on the vendor. Survives rollover.
    in_flight: u32,
    last_reset: NaiveDate,
    available: bool,
    last_error: Option<String>,
}

impl Provider {
    pub fn new(spec: ProviderSpec, today: NaiveDate) -> Self {
        Self {
            spec,
            messages_used_today: 0,
            in_flight: 0,
            last_reset: today,
            available: true,
            last_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn adapter(&self) -> Arc<dyn ChatAdapter> {
        self.spec.adapter.clone()
    }

    /// Lazy daily rollover. Returns true when a reset happened.
    ///
    /// Only a date strictly after the stored reset date triggers it, so the counter resets at
    /// most once per calendar day no matter how often it is read.
    pub fn reset_daily_counter(&mut self, today: NaiveDate) -> bool {
        if today <= self.last_reset {
            return false;
        }
        self.messages_used_today = 0;
        self.last_reset = today;
        self.available = true;
        true
    }

    /// Reserved slots count against the quota, so concurrent sends cannot overshoot it.
    pub fn can_send(&mut self, today: NaiveDate) -> bool {
        self.reset_daily_counter(today);
        self.available
            && self.messages_used_today.saturating_add(self.in_flight) < self.spec.daily_limit
    }

    /// Reserves one quota slot for an attempt about to start.
    pub fn try_reserve(&mut self, today: NaiveDate) -> bool {
        if !self.can_send(today) {
            return false;
        }
        self.in_flight += 1;
        true
    }

    /// Returns a slot taken by `try_reserve`.
    pub fn release(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    pub fn last_reset(&self) -> NaiveDate {
        self.last_reset
    }

    pub fn record_success(&mut self) {
        self.messages_used_today = self.messages_used_today.saturating_add(1);
    }

    /// Stores the error; a rate-limited provider also leaves rotation until the next rollover.
    pub fn record_failure(&mut self, error: String, mark_unavailable: bool) {
        self.last_error = Some(error);
        if mark_unavailable {
            self.available = false;
        }
    }

    pub fn status(&self) -> ProviderStatus {
        ProviderStatus {
            name: self.spec.name.clone(),
            kind: self.spec.kind,
            model: self.spec.model.clone(),
            available: self.available,
            messages_used: self.messages_used_today,
            daily_limit: self.spec.daily_limit,
            last_error: self.last_error.clone(),
        }
    }

    pub fn manifest_entry(&self) -> ProviderManifestEntry {
        ProviderManifestEntry {
            name: self.spec.name.clone(),
            kind: Some(self.spec.kind),
            base_url: self.spec.base_url.clone(),
            model: self.spec.model.clone(),
            daily_limit: self.spec.daily_limit,
        }
    }
}

/// Providers in rotation order (no IO, no locks).
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spec: ProviderSpec, today: NaiveDate) -> ProviderId {
        self.providers.push(Provider::new(spec, today));
        self.providers.len() - 1
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.get(id)
    }

    pub fn get_mut(&mut self, id: ProviderId) -> Option<&mut Provider> {
        self.providers.get_mut(id)
    }

    /// Ids of providers that may send right now, in configuration order.
    pub fn available_ids(&mut self, today: NaiveDate) -> Vec<ProviderId> {
        self.providers
            .iter_mut()
            .enumerate()
            .filter_map(|(id, provider)| provider.can_send(today).then_some(id))
            .collect()
    }

    pub fn statuses(&mut self, today: NaiveDate) -> Vec<ProviderStatus> {
        self.providers
            .iter_mut()
            .map(|provider| {
                provider.reset_daily_counter(today);
                provider.status()
            })
            .collect()
    }

    pub fn manifest(&self) -> Vec<ProviderManifestEntry> {
        self.providers.iter().map(Provider::manifest_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::providers::Completion;
    use async_trait::async_trait;
    use hearth_schema::ChatMessage;

    #[derive(Debug)]
    struct NeverCalled;

    #[async_trait]
    impl ChatAdapter for NeverCalled {
        async fn send_message(
            &self,
            _message: &str,
            _context: &[ChatMessage],
        ) -> Result<Completion, ProviderError> {
            unreachable!("registry tests never send")
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    fn spec(name: &str, daily_limit: u32) -> ProviderSpec {
        ProviderSpec {
            name: name.to_string(),
            kind: ProviderKind::OpenAi,
            base_url: ProviderKind::OpenAi.default_base_url(),
            model: "gpt-4".to_string(),
            daily_limit,
            adapter: Arc::new(NeverCalled),
        }
    }

    #[test]
    fn quota_reached_blocks_sending_on_same_day() {
        let mut provider = Provider::new(spec("a", 2), day(1));
        provider.record_success();
        assert!(provider.can_send(day(1)));
        provider.record_success();
        assert!(!provider.can_send(day(1)));
    }

    #[test]
    fn counter_resets_once_on_first_access_of_a_new_day() {
        let mut provider = Provider::new(spec("a", 5), day(1));
        provider.messages_used_today = 5;

        assert!(provider.reset_daily_counter(day(2)));
        assert_eq!(provider.messages_used_today, 0);

        provider.record_success();
        assert!(!provider.reset_daily_counter(day(2)));
        assert_eq!(provider.messages_used_today, 1);
        assert_eq!(provider.last_reset, day(2));
    }

    #[test]
    fn reset_is_lazy() {
        let mut provider = Provider::new(spec("a", 5), day(1));
        provider.messages_used_today = 3;

        // Nothing touches the provider, so the stale counter stays put.
        assert_eq!(provider.status().messages_used, 3);
        assert_eq!(provider.last_reset, day(1));

        assert!(provider.can_send(day(4)));
        assert_eq!(provider.status().messages_used, 0);
    }

    #[test]
    fn clock_going_backwards_does_not_reset() {
        let mut provider = Provider::new(spec("a", 5), day(3));
        provider.record_success();
        assert!(!provider.reset_daily_counter(day(2)));
        assert_eq!(provider.messages_used_today, 1);
    }

    #[test]
    fn rate_limit_holds_until_rollover() {
        let mut provider = Provider::new(spec("a", 5), day(1));
        provider.record_failure("429".to_string(), true);
        assert!(!provider.can_send(day(1)));
        assert!(provider.can_send(day(2)));
        assert_eq!(provider.status().last_error.as_deref(), Some("429"));
    }

    #[test]
    fn plain_failure_keeps_provider_available() {
        let mut provider = Provider::new(spec("a", 5), day(1));
        provider.record_failure("500".to_string(), false);
        assert!(provider.can_send(day(1)));
    }

    #[test]
    fn available_ids_skip_exhausted_and_unavailable() {
        let mut registry = ProviderRegistry::new();
        let a = registry.add(spec("a", 1), day(1));
        let b = registry.add(spec("b", 1), day(1));
        let c = registry.add(spec("c", 1), day(1));

        registry.get_mut(a).expect("a").record_success();
        registry
            .get_mut(b)
            .expect("b")
            .record_failure("rate_limit".to_string(), true);

        assert_eq!(registry.available_ids(day(1)), vec![c]);
        assert_eq!(registry.available_ids(day(2)), vec![a, b, c]);
    }

    #[test]
    fn statuses_apply_rollover_and_keep_order() {
        let mut registry = ProviderRegistry::new();
        registry.add(spec("first", 3), day(1));
        registry.add(spec("second", 3), day(1));
        registry.get_mut(1).expect("second").record_success();

        let names: Vec<String> = registry
            .statuses(day(1))
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);

        let after = registry.statuses(day(2));
        assert_eq!(after[1].messages_used, 0);
    }

    #[test]
    fn reservations_count_against_quota() {
        let mut provider = Provider::new(spec("a", 2), day(1));
        assert!(provider.try_reserve(day(1)));
        assert!(provider.try_reserve(day(1)));
        assert!(!provider.try_reserve(day(1)));
        assert!(!provider.can_send(day(1)));

        // A failed attempt gives its slot back.
        provider.release();
        assert!(provider.can_send(day(1)));

        // A successful one turns its slot into a counted message.
        provider.release();
        provider.record_success();
        assert_eq!(provider.in_flight(), 0);
        assert_eq!(provider.status().messages_used, 1);
        assert!(provider.try_reserve(day(1)));
        assert!(!provider.try_reserve(day(1)));
    }

    #[test]
    fn rollover_keeps_outstanding_reservations() {
        let mut provider = Provider::new(spec("a", 1), day(1));
        assert!(provider.try_reserve(day(1)));

        assert!(provider.reset_daily_counter(day(2)));
        assert_eq!(provider.in_flight(), 1);
        assert!(!provider.can_send(day(2)));
    }

    #[test]
    fn manifest_entries_carry_no_credentials() {
        let mut registry = ProviderRegistry::new();
        registry.add(spec("OpenAI", 1000), day(1));

        let raw = serde_json::to_string(&registry.manifest()).expect("serialize manifest");
        assert!(raw.contains("\"name\":\"OpenAI\""));
        assert!(!raw.contains("api_key"));
    }
}
