use crate::api::BackendClient;
use crate::errors::{ApiError, ApiResult};
use crate::gate::{AuthGate, GateState};
use crate::models::{Email, EmailId, Summary};
use crate::navigation::{Navigator, Route};
use crate::status::OpState;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const EMPTY_QUERY: &str = "Please enter a search query";
pub const SEARCH_FAILED: &str = "Failed to search emails";
pub const SUMMARIZE_FAILED: &str = "Failed to summarize email";
pub const LOGOUT_FAILED: &str = "Failed to logout";
pub const NOT_SIGNED_IN: &str = "Not signed in";

/// Issued by [`SearchState::begin_search`]; hand it back with the response.
#[derive(Debug)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Issued by [`SearchState::begin_summarize`] for the single request allowed
/// in flight.
#[derive(Debug)]
pub struct SummarizeTicket {
    email_id: EmailId,
}

impl SummarizeTicket {
    pub fn email_id(&self) -> &EmailId {
        &self.email_id
    }
}

/// State of the search view, free of any I/O.
///
/// Search and summarize are tracked independently. Searches may overlap but
/// only the most recently issued one may replace the result list. At most
/// one summarize request is in flight. Each answer is stored under the id it
/// was requested for, so a late answer never touches another email's entry,
/// and is only displayed while that id is selected.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    search: OpState,
    search_generation: u64,
    last_query: Option<String>,
    results: Option<Vec<Email>>,

    selected: Option<EmailId>,
    in_flight: Option<EmailId>,
    summaries: HashMap<EmailId, Result<Summary, String>>,

    logout: OpState,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_search(&mut self, query: &str) -> ApiResult<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::Validation(EMPTY_QUERY.to_string()));
        }

        self.search_generation += 1;
        self.search = OpState::Pending;
        self.last_query = Some(query.to_string());
        debug!("Search #{} for '{}'", self.search_generation, query);

        Ok(SearchTicket {
            generation: self.search_generation,
            query: query.to_string(),
        })
    }

    /// Returns false when a newer search has been issued since `ticket`.
    pub fn finish_search(&mut self, ticket: SearchTicket, result: ApiResult<Vec<Email>>) -> bool {
        if ticket.generation != self.search_generation {
            warn!(
                "Discarding response to superseded search '{}' (#{}, latest #{})",
                ticket.query, ticket.generation, self.search_generation
            );
            return false;
        }

        match result {
            Ok(emails) => {
                info!("Search '{}' found {} emails", ticket.query, emails.len());
                self.results = Some(emails);
                self.search = OpState::Succeeded;
            }
            Err(e) => {
                self.search = OpState::Failed(e.user_message(SEARCH_FAILED));
            }
        }
        true
    }

    pub fn select(&mut self, email_id: EmailId) {
        debug!("Selected email {}", email_id);
        self.selected = Some(email_id);
    }

    /// None while another summary is still being fetched.
    pub fn begin_summarize(&mut self, email_id: EmailId) -> Option<SummarizeTicket> {
        if let Some(pending) = &self.in_flight {
            debug!(
                "Ignoring summarize for {}: summary for {} still pending",
                email_id, pending
            );
            return None;
        }

        self.in_flight = Some(email_id.clone());
        Some(SummarizeTicket { email_id })
    }

    pub fn finish_summarize(&mut self, ticket: SummarizeTicket, result: ApiResult<Summary>) {
        self.in_flight = None;

        if self.selected.as_ref() != Some(&ticket.email_id) {
            warn!(
                "Summary for {} arrived after selection changed; not displayed",
                ticket.email_id
            );
        }

        let outcome = result.map_err(|e| e.user_message(SUMMARIZE_FAILED));
        self.summaries.insert(ticket.email_id, outcome);
    }

    pub fn search_state(&self) -> &OpState {
        &self.search
    }

    /// Summarize status of the current selection.
    pub fn summarize_state(&self) -> OpState {
        let selected = match &self.selected {
            Some(id) => id,
            None => return OpState::Idle,
        };
        if self.in_flight.as_ref() == Some(selected) {
            return OpState::Pending;
        }
        match self.summaries.get(selected) {
            Some(Ok(_)) => OpState::Succeeded,
            Some(Err(msg)) => OpState::Failed(msg.clone()),
            None => OpState::Idle,
        }
    }

    pub fn logout_state(&self) -> &OpState {
        &self.logout
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// None until the first successful search.
    pub fn results(&self) -> Option<&[Email]> {
        self.results.as_deref()
    }

    /// The latest search succeeded with zero hits.
    pub fn no_matches(&self) -> bool {
        matches!(self.search, OpState::Succeeded)
            && self.results.as_ref().map(Vec::is_empty).unwrap_or(false)
    }

    pub fn selected(&self) -> Option<&EmailId> {
        self.selected.as_ref()
    }

    pub fn summary_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The stored summary, if it belongs to the current selection.
    pub fn displayed_summary(&self) -> Option<&Summary> {
        let selected = self.selected.as_ref()?;
        self.summaries.get(selected)?.as_ref().ok()
    }

    pub fn displayed_summary_error(&self) -> Option<&str> {
        let selected = self.selected.as_ref()?;
        self.summaries.get(selected)?.as_ref().err().map(String::as_str)
    }
}

/// Home view: newsletter search, per-email summaries and logout.
pub struct SearchView {
    client: BackendClient,
    navigator: Arc<dyn Navigator>,
    gate: AuthGate,
    state: Mutex<SearchState>,
}

impl SearchView {
    pub fn new(client: BackendClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            gate: AuthGate::protected(),
            state: Mutex::new(SearchState::new()),
        }
    }

    pub async fn mount(&mut self) -> GateState {
        self.gate
            .check(&self.client, self.navigator.as_ref())
            .await
            .clone()
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the view state, withheld until the gate has confirmed
    /// the session.
    pub fn visible_state(&self) -> Option<SearchState> {
        if self.gate.can_render_protected() {
            Some(self.lock().clone())
        } else {
            None
        }
    }

    /// Protected requests are refused until the gate has confirmed the
    /// session.
    fn ensure_signed_in(&self) -> ApiResult<()> {
        if self.gate.can_render_protected() {
            Ok(())
        } else {
            warn!("Refusing request: gate is {:?}", self.gate.state());
            Err(ApiError::Validation(NOT_SIGNED_IN.to_string()))
        }
    }

    /// Blank queries are rejected without contacting the backend.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Email>> {
        self.ensure_signed_in()?;
        let ticket = self.lock().begin_search(query)?;
        let result = self.client.search_emails(ticket.query()).await;
        self.lock().finish_search(ticket, result.clone());
        result
    }

    pub fn select(&self, email_id: EmailId) {
        self.lock().select(email_id);
    }

    /// Requests a summary for `email_id` unless one is already in flight,
    /// in which case nothing is sent and `Ok(None)` is returned.
    pub async fn summarize(&self, email_id: EmailId) -> ApiResult<Option<Summary>> {
        self.ensure_signed_in()?;
        let ticket = match self.lock().begin_summarize(email_id) {
            Some(ticket) => ticket,
            None => return Ok(None),
        };

        let result = self.client.summarize_email(ticket.email_id()).await;
        self.lock().finish_summarize(ticket, result.clone());
        result.map(Some)
    }

    /// Selects an email and asks for its summary.
    pub async fn open(&self, email_id: EmailId) -> ApiResult<Option<Summary>> {
        self.select(email_id.clone());
        self.summarize(email_id).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.ensure_signed_in()?;
        self.lock().logout = OpState::Pending;

        match self.client.logout().await {
            Ok(()) => {
                self.lock().logout = OpState::Succeeded;
                self.navigator.navigate(Route::Login);
                Ok(())
            }
            Err(e) => {
                self.lock().logout = OpState::Failed(LOGOUT_FAILED.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: u64, subject: &str) -> Email {
        Email {
            id: EmailId::from(id),
            sender: "news@acme.com".to_string(),
            subject: subject.to_string(),
            preview: None,
            received_at: None,
        }
    }

    fn summary(id: u64, text: &str) -> Summary {
        Summary {
            email_id: EmailId::from(id),
            text: text.to_string(),
        }
    }

    #[test]
    fn blank_query_leaves_state_untouched() {
        let mut state = SearchState::new();
        for query in ["", "   ", "\t\n"] {
            assert!(matches!(state.begin_search(query), Err(ApiError::Validation(_))));
        }
        assert_eq!(state.search_state(), &OpState::Idle);
        assert!(state.results().is_none());
    }

    #[test]
    fn results_are_replaced_wholesale() {
        let mut state = SearchState::new();

        let ticket = state.begin_search("acme").unwrap();
        state.finish_search(ticket, Ok(vec![email(1, "Acme News"), email(2, "Acme Deals")]));
        assert_eq!(state.results().unwrap().len(), 2);

        let ticket = state.begin_search("weekly").unwrap();
        state.finish_search(ticket, Ok(vec![email(3, "Weekly")]));
        assert_eq!(state.results().unwrap(), &[email(3, "Weekly")]);
        assert!(!state.no_matches());
    }

    #[test]
    fn empty_results_are_not_an_error() {
        let mut state = SearchState::new();
        let ticket = state.begin_search("nothing").unwrap();
        state.finish_search(ticket, Ok(vec![]));
        assert!(state.no_matches());
        assert_eq!(state.search_state().error(), None);
    }

    #[test]
    fn superseded_search_is_discarded() {
        let mut state = SearchState::new();
        let first = state.begin_search("first").unwrap();
        let second = state.begin_search("second").unwrap();

        assert!(state.finish_search(second, Ok(vec![email(2, "Second")])));
        assert!(!state.finish_search(first, Ok(vec![email(1, "First")])));
        assert_eq!(state.results().unwrap(), &[email(2, "Second")]);
    }

    #[test]
    fn failed_search_keeps_previous_results() {
        let mut state = SearchState::new();
        let ticket = state.begin_search("acme").unwrap();
        state.finish_search(ticket, Ok(vec![email(1, "Acme News")]));

        let ticket = state.begin_search("acme").unwrap();
        state.finish_search(ticket, Err(ApiError::Network("down".into())));
        assert_eq!(state.search_state().error(), Some(SEARCH_FAILED));
        assert_eq!(state.results().unwrap().len(), 1);
    }

    #[test]
    fn second_summarize_while_pending_is_dropped() {
        let mut state = SearchState::new();
        let ticket = state.begin_summarize(EmailId::from(1)).unwrap();
        assert!(state.begin_summarize(EmailId::from(2)).is_none());
        assert!(state.summary_pending());

        state.finish_summarize(ticket, Ok(summary(1, "done")));
        assert!(!state.summary_pending());
        assert!(state.begin_summarize(EmailId::from(2)).is_some());
    }

    #[test]
    fn stale_summary_is_not_displayed() {
        let mut state = SearchState::new();
        state.select(EmailId::from(1));
        let ticket = state.begin_summarize(EmailId::from(1)).unwrap();

        state.select(EmailId::from(2));
        state.finish_summarize(ticket, Ok(summary(1, "A's summary")));

        assert!(state.displayed_summary().is_none());

        // Going back to A shows what arrived for it
        state.select(EmailId::from(1));
        assert_eq!(state.displayed_summary().unwrap().text, "A's summary");
    }

    #[test]
    fn late_answer_leaves_current_selection_alone() {
        let mut state = SearchState::new();
        state.select(EmailId::from(2));
        let ticket = state.begin_summarize(EmailId::from(2)).unwrap();
        state.finish_summarize(ticket, Ok(summary(2, "B's summary")));

        state.select(EmailId::from(1));
        let late = state.begin_summarize(EmailId::from(1)).unwrap();
        state.select(EmailId::from(2));
        state.finish_summarize(late, Ok(summary(1, "A's summary")));

        assert_eq!(state.displayed_summary().unwrap().text, "B's summary");
        assert_eq!(state.summarize_state(), OpState::Succeeded);
    }

    #[test]
    fn late_failure_does_not_mark_selection_failed() {
        let mut state = SearchState::new();
        state.select(EmailId::from(2));
        let ticket = state.begin_summarize(EmailId::from(2)).unwrap();
        state.finish_summarize(ticket, Ok(summary(2, "B's summary")));

        state.select(EmailId::from(1));
        let late = state.begin_summarize(EmailId::from(1)).unwrap();
        assert_eq!(state.summarize_state(), OpState::Pending);
        state.select(EmailId::from(2));
        // B is not the one being fetched
        assert_eq!(state.summarize_state(), OpState::Succeeded);
        state.finish_summarize(late, Err(ApiError::Network("down".into())));

        assert_eq!(state.summarize_state(), OpState::Succeeded);
        assert_eq!(state.displayed_summary_error(), None);

        state.select(EmailId::from(1));
        assert_eq!(state.summarize_state().error(), Some(SUMMARIZE_FAILED));
    }

    #[test]
    fn retry_replaces_stored_error() {
        let mut state = SearchState::new();
        state.select(EmailId::from(1));
        let ticket = state.begin_summarize(EmailId::from(1)).unwrap();
        state.finish_summarize(ticket, Err(ApiError::Network("down".into())));

        let ticket = state.begin_summarize(EmailId::from(1)).unwrap();
        state.finish_summarize(ticket, Ok(summary(1, "done")));
        assert_eq!(state.displayed_summary_error(), None);
        assert_eq!(state.displayed_summary().unwrap().text, "done");
    }

    #[test]
    fn summary_error_is_keyed_by_email() {
        let mut state = SearchState::new();
        state.select(EmailId::from(1));
        let ticket = state.begin_summarize(EmailId::from(1)).unwrap();
        state.finish_summarize(ticket, Err(ApiError::Network("down".into())));

        assert_eq!(state.displayed_summary_error(), Some(SUMMARIZE_FAILED));
        state.select(EmailId::from(2));
        assert_eq!(state.displayed_summary_error(), None);
    }
}
