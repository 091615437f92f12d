//! Turn lifecycle for the store assistant chat.
//!
//! A turn moves `idle -> sending -> (success | aborted | failed)`. The user
//! message is appended as soon as the turn starts; the outcome then either
//! appends the reply, appends a visible error placeholder, or (on abort)
//! leaves the transcript as it is. At most one turn is in flight.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures_util::future::AbortHandle;
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::models::{Message, Product, Role, Settings};
use crate::services::catalog::{CatalogSource, ProductCache, CATALOG_MAX_PAGES};
use crate::services::completion::{CompletionBackend, MISSING_API_KEY};
use crate::services::context::{self, CATALOG_UNAVAILABLE};
use crate::services::relevance;
use crate::services::storage::KeyValueStore;

pub const KEY_SETTINGS: &str = "store_chat_settings_v1";
pub const KEY_MESSAGES: &str = "store_chat_messages_v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty input, or another turn was already in flight.
    Ignored,
    Completed,
    Aborted,
    Failed,
}

struct InFlight {
    turn: u64,
    handle: AbortHandle,
}

#[derive(Default)]
struct ChatState {
    messages: Vec<Message>,
    last_user_text: Option<String>,
    error: Option<String>,
    in_flight: Option<InFlight>,
    next_turn: u64,
    settings: Settings,
}

impl ChatState {
    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(turn = in_flight.turn, "cancelling in-flight request");
            in_flight.handle.abort();
        }
    }

    fn is_current(&self, turn: u64) -> bool {
        self.in_flight.as_ref().map(|f| f.turn) == Some(turn)
    }
}

pub fn error_message(err: &ChatError) -> String {
    format!(
        "I apologize, but I encountered an error: {}. Please check your settings and try again.",
        err.to_string().trim_end_matches('.')
    )
}

pub struct ConversationManager {
    catalog: Rc<dyn CatalogSource>,
    completion: Rc<dyn CompletionBackend>,
    store: Rc<dyn KeyValueStore>,
    cache: RefCell<ProductCache>,
    state: RefCell<ChatState>,
    listener: RefCell<Option<Rc<dyn Fn()>>>,
    clock: Rc<dyn Fn() -> DateTime<Utc>>,
}

impl ConversationManager {
    /// Builds a manager and restores settings and transcript from `store`.
    pub fn load(
        catalog: Rc<dyn CatalogSource>,
        completion: Rc<dyn CompletionBackend>,
        store: Rc<dyn KeyValueStore>,
    ) -> Self {
        let settings: Settings = store.get(KEY_SETTINGS).unwrap_or_default();
        let messages: Vec<Message> = store.get_vec(KEY_MESSAGES);
        catalog.configure(&settings);
        completion.configure(&settings);

        let last_user_text = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone());
        info!(messages = messages.len(), "conversation restored");

        Self {
            catalog,
            completion,
            store,
            cache: RefCell::new(ProductCache::new()),
            state: RefCell::new(ChatState {
                messages,
                last_user_text,
                settings,
                ..Default::default()
            }),
            listener: RefCell::new(None),
            clock: Rc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for catalog cache expiry.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    /// Called after every state change.
    pub fn set_listener(&self, listener: impl Fn() + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(listener));
    }

    fn notify(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    fn persist_messages(&self, messages: &[Message]) {
        if messages.is_empty() {
            self.store.remove(KEY_MESSAGES);
        } else {
            self.store.set(KEY_MESSAGES, messages);
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().messages.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    pub fn settings(&self) -> Settings {
        self.state.borrow().settings.clone()
    }

    pub fn can_retry(&self) -> bool {
        let state = self.state.borrow();
        state.in_flight.is_none() && state.last_user_text.is_some()
    }

    pub fn update_settings(&self, settings: Settings) {
        self.store.set(KEY_SETTINGS, &settings);
        self.catalog.configure(&settings);
        self.completion.configure(&settings);
        self.cache.borrow_mut().invalidate();
        self.state.borrow_mut().settings = settings;
        info!("settings updated");
        self.notify();
    }

    /// Cached catalog, refreshed when older than the cache TTL.
    async fn catalog_products(&self) -> Result<Vec<Product>, ChatError> {
        let now = (self.clock)();
        if !self.cache.borrow().is_stale(now) {
            return Ok(self.cache.borrow().products().to_vec());
        }
        let products = self.catalog.fetch_catalog(CATALOG_MAX_PAGES).await?;
        self.cache.borrow_mut().replace(products.clone(), now);
        Ok(products)
    }

    pub async fn submit(&self, text: &str) -> TurnOutcome {
        let question = text.trim().to_string();

        let (turn, registration, history, configured) = {
            let mut state = self.state.borrow_mut();
            if question.is_empty() || state.in_flight.is_some() {
                return TurnOutcome::Ignored;
            }

            let (handle, registration) = AbortHandle::new_pair();
            let turn = state.next_turn;
            state.next_turn += 1;
            state.in_flight = Some(InFlight { turn, handle });

            let history = state.messages.clone();
            state.messages.push(Message::user(question.clone()));
            state.last_user_text = Some(question.clone());
            state.error = None;
            self.persist_messages(&state.messages);
            let configured = state.settings.is_completion_configured();
            (turn, registration, history, configured)
        };
        debug!(turn, "turn started");
        self.notify();

        if !configured {
            let err = ChatError::Configuration(MISSING_API_KEY.to_string());
            return self.finish_turn(turn, Err(err), Vec::new());
        }

        let (block, products) = match self.catalog_products().await {
            Ok(catalog) => {
                let matched = relevance::relevant_products(&question, &catalog);
                debug!(turn, matched = matched.len(), "catalog context assembled");
                (context::render_context_block(&matched), matched)
            }
            Err(err) => {
                warn!(turn, error = %err, "catalog unavailable, continuing without products");
                (CATALOG_UNAVAILABLE.to_string(), Vec::new())
            }
        };
        let user_turn = context::build_user_turn(&block, &question);
        let window = context::build_window(&history, &user_turn);

        let result = self.completion.complete(&window, registration).await;
        self.finish_turn(turn, result, products)
    }

    fn finish_turn(
        &self,
        turn: u64,
        result: Result<String, ChatError>,
        products: Vec<Product>,
    ) -> TurnOutcome {
        let outcome = {
            let mut state = self.state.borrow_mut();
            if !state.is_current(turn) {
                // stopped or cleared while the request was pending
                debug!(turn, "dropping result of superseded turn");
                return TurnOutcome::Aborted;
            }
            state.in_flight = None;

            let outcome = match result {
                Ok(reply) => {
                    state.messages.push(Message::assistant(reply, products));
                    state.error = None;
                    TurnOutcome::Completed
                }
                Err(ChatError::Cancelled) => TurnOutcome::Aborted,
                Err(err) => {
                    state.messages.push(Message::error(error_message(&err)));
                    state.error = Some(err.to_string());
                    TurnOutcome::Failed
                }
            };
            if outcome != TurnOutcome::Aborted {
                self.persist_messages(&state.messages);
            }
            outcome
        };
        info!(turn, ?outcome, "turn finished");
        self.notify();
        outcome
    }

    /// Cancels the in-flight request, if any. The pending turn resolves as
    /// aborted without touching the transcript.
    pub fn stop(&self) {
        let stopped = {
            let mut state = self.state.borrow_mut();
            let active = state.in_flight.is_some();
            state.cancel_in_flight();
            active
        };
        if stopped {
            self.notify();
        }
    }

    /// Drops a trailing assistant message and re-submits the last user text.
    pub async fn retry_last_turn(&self) -> TurnOutcome {
        let text = {
            let mut state = self.state.borrow_mut();
            if state.in_flight.is_some() {
                return TurnOutcome::Ignored;
            }
            let Some(text) = state.last_user_text.clone() else {
                return TurnOutcome::Ignored;
            };
            if state.messages.last().map(|m| m.role) == Some(Role::Assistant) {
                state.messages.pop();
                self.persist_messages(&state.messages);
            }
            text
        };
        debug!("retrying last turn");
        self.submit(&text).await
    }

    pub fn clear(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.cancel_in_flight();
            state.messages.clear();
            state.last_user_text = None;
            state.error = None;
            self.persist_messages(&state.messages);
        }
        info!("conversation cleared");
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;
    use crate::services::catalog::ProductQuery;
    use crate::services::context::{NO_MATCHES, SYSTEM_INSTRUCTION};
    use crate::services::storage::MemoryStore;
    use async_trait::async_trait;
    use futures_util::future::{pending, AbortRegistration, Abortable};
    use std::cell::Cell;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeCatalog {
        products: Vec<Product>,
        fail: bool,
        fetches: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl CatalogSource for FakeCatalog {
        fn configure(&self, _settings: &Settings) {}

        async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ChatError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail {
                return Err(ChatError::Network("connection refused".into()));
            }
            Ok(if query.page == 1 {
                self.products.clone()
            } else {
                Vec::new()
            })
        }
    }

    enum Reply {
        Text(&'static str),
        Fail(ChatError),
        Hang,
    }

    #[derive(Default)]
    struct FakeCompletion {
        replies: RefCell<VecDeque<Reply>>,
        requests: RefCell<Vec<Vec<ChatMessage>>>,
    }

    impl FakeCompletion {
        fn with(replies: Vec<Reply>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl CompletionBackend for FakeCompletion {
        fn configure(&self, _settings: &Settings) {}

        async fn complete(
            &self,
            messages: &[ChatMessage],
            abort: AbortRegistration,
        ) -> Result<String, ChatError> {
            self.requests.borrow_mut().push(messages.to_vec());
            let reply = self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Reply::Text("ok"));
            match reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Fail(err) => Err(err),
                Reply::Hang => Abortable::new(pending::<Result<String, ChatError>>(), abort)
                    .await
                    .map_err(|_| ChatError::Cancelled)?,
            }
        }
    }

    fn mouse_catalog() -> Vec<Product> {
        vec![
            Product {
                id: 1,
                name: "Wireless Mouse".into(),
                description: "Ergonomic and quiet".into(),
                price: "29.99".into(),
                stock_status: "instock".into(),
                ..Default::default()
            },
            Product {
                id: 2,
                name: "USB Cable".into(),
                description: "Fits neatly beside a mouse pad".into(),
                price: "4.99".into(),
                stock_status: "instock".into(),
                ..Default::default()
            },
        ]
    }

    struct Harness {
        manager: Rc<ConversationManager>,
        catalog: Rc<FakeCatalog>,
        completion: Rc<FakeCompletion>,
        store: Rc<MemoryStore>,
    }

    fn configured() -> Settings {
        Settings {
            api_key: "sk-test".into(),
            ..Default::default()
        }
    }

    fn harness(catalog: FakeCatalog, completion: FakeCompletion) -> Harness {
        harness_with(configured(), catalog, completion)
    }

    fn harness_with(settings: Settings, catalog: FakeCatalog, completion: FakeCompletion) -> Harness {
        let catalog = Rc::new(catalog);
        let completion = Rc::new(completion);
        let store = Rc::new(MemoryStore::new());
        store.set_raw(KEY_SETTINGS, &serde_json::to_string(&settings).unwrap());
        let manager = Rc::new(ConversationManager::load(
            catalog.clone(),
            completion.clone(),
            store.clone(),
        ));
        Harness {
            manager,
            catalog,
            completion,
            store,
        }
    }

    #[tokio::test]
    async fn successful_turn_appends_reply_with_products() {
        let h = harness(
            FakeCatalog {
                products: mouse_catalog(),
                ..Default::default()
            },
            FakeCompletion::with(vec![Reply::Text("The Wireless Mouse is $29.99.")]),
        );

        let outcome = h.manager.submit("  wireless mouse ").await;
        assert_eq!(outcome, TurnOutcome::Completed);

        let messages = h.manager.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "wireless mouse");
        assert_eq!(messages[1].role, Role::Assistant);
        let attached = messages[1].products.as_ref().unwrap();
        assert_eq!(attached[0].name, "Wireless Mouse");
        assert!(h.manager.error().is_none());
        assert!(!h.manager.is_sending());

        let requests = h.completion.requests.borrow();
        let window = &requests[0];
        assert_eq!(window[0].role, Role::System);
        assert_eq!(window[0].content, SYSTEM_INSTRUCTION);
        let user_turn = &window.last().unwrap().content;
        assert!(user_turn.contains("Wireless Mouse: Ergonomic and quiet (Price: $29.99, Stock: instock)"));
        assert!(user_turn.ends_with("Question: wireless mouse"));
        assert!(messages.iter().all(|m| m.content != SYSTEM_INSTRUCTION));
    }

    #[tokio::test]
    async fn following_turn_sends_prior_exchange() {
        let h = harness(FakeCatalog::default(), FakeCompletion::default());
        h.manager.submit("first question").await;
        h.manager.submit("second question").await;

        let requests = h.completion.requests.borrow();
        let window = &requests[1];
        let roles: Vec<Role> = window.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(window[1].content, "first question");
        assert!(window[3].content.contains(NO_MATCHES));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let h = harness(FakeCatalog::default(), FakeCompletion::default());
        assert_eq!(h.manager.submit("   \n").await, TurnOutcome::Ignored);
        assert!(h.manager.messages().is_empty());
        assert!(h.completion.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn upstream_error_becomes_visible_message() {
        let h = harness(
            FakeCatalog::default(),
            FakeCompletion::with(vec![Reply::Fail(ChatError::Upstream {
                status: 401,
                message: "invalid api key".into(),
            })]),
        );

        let outcome = h.manager.submit("hello").await;
        assert_eq!(outcome, TurnOutcome::Failed);

        let messages = h.manager.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].is_error);
        assert!(messages[1]
            .content
            .starts_with("I apologize, but I encountered an error: invalid api key"));
        assert_eq!(h.manager.error().as_deref(), Some("invalid api key"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_network_call() {
        let h = harness_with(
            Settings::default(),
            FakeCatalog {
                products: mouse_catalog(),
                ..Default::default()
            },
            FakeCompletion::default(),
        );

        assert_eq!(h.manager.submit("wireless mouse").await, TurnOutcome::Failed);
        assert_eq!(h.catalog.fetches.get(), 0);
        assert!(h.completion.requests.borrow().is_empty());
        assert!(!h.manager.is_sending());

        let messages = h.manager.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_error);
        assert_eq!(
            messages[1].content,
            "I apologize, but I encountered an error: OpenAI API key is not set. \
             Please check your settings and try again."
        );
        assert_eq!(h.manager.error().as_deref(), Some(MISSING_API_KEY));
        assert!(h.manager.can_retry());
    }

    #[tokio::test]
    async fn adding_api_key_lets_retry_succeed() {
        let h = harness_with(
            Settings::default(),
            FakeCatalog::default(),
            FakeCompletion::with(vec![Reply::Text("Hello there")]),
        );
        h.manager.submit("hello").await;

        h.manager.update_settings(configured());
        assert_eq!(h.manager.retry_last_turn().await, TurnOutcome::Completed);
        assert_eq!(h.catalog.fetches.get(), 1);
        assert_eq!(h.manager.messages().last().unwrap().content, "Hello there");
    }

    #[tokio::test]
    async fn catalog_failure_degrades_gracefully() {
        let h = harness(
            FakeCatalog {
                fail: true,
                ..Default::default()
            },
            FakeCompletion::with(vec![Reply::Text("Sorry, I can't see the catalog.")]),
        );

        assert_eq!(h.manager.submit("any mice?").await, TurnOutcome::Completed);
        let requests = h.completion.requests.borrow();
        assert!(requests[0].last().unwrap().content.contains(CATALOG_UNAVAILABLE));
        assert!(h.manager.error().is_none());
    }

    #[tokio::test]
    async fn catalog_is_cached_between_turns() {
        let h = harness(
            FakeCatalog {
                products: mouse_catalog(),
                ..Default::default()
            },
            FakeCompletion::default(),
        );
        h.manager.submit("mouse").await;
        h.manager.submit("cable").await;
        assert_eq!(h.catalog.fetches.get(), 1);

        h.manager.update_settings(configured());
        h.manager.submit("mouse again").await;
        assert_eq!(h.catalog.fetches.get(), 2);
    }

    #[tokio::test]
    async fn catalog_is_refetched_once_cache_expires() {
        let t0 = Utc::now();
        let now = Rc::new(Cell::new(t0));
        let clock = now.clone();

        let catalog = Rc::new(FakeCatalog {
            products: mouse_catalog(),
            ..Default::default()
        });
        let store = Rc::new(MemoryStore::new());
        store.set_raw(KEY_SETTINGS, &serde_json::to_string(&configured()).unwrap());
        let manager = ConversationManager::load(
            catalog.clone(),
            Rc::new(FakeCompletion::default()),
            store,
        )
        .with_clock(move || clock.get());

        manager.submit("mouse").await;
        assert_eq!(catalog.fetches.get(), 1);

        now.set(t0 + chrono::Duration::minutes(4));
        manager.submit("cable").await;
        assert_eq!(catalog.fetches.get(), 1);

        now.set(t0 + chrono::Duration::minutes(5));
        manager.submit("mouse again").await;
        assert_eq!(catalog.fetches.get(), 2);

        // the refresh restarts the TTL
        now.set(t0 + chrono::Duration::minutes(9));
        manager.submit("one more").await;
        assert_eq!(catalog.fetches.get(), 2);
    }

    #[tokio::test]
    async fn stop_mid_request_is_silent() {
        let h = harness(FakeCatalog::default(), FakeCompletion::with(vec![Reply::Hang]));
        let manager = h.manager.clone();

        let (outcome, _) = futures_util::join!(h.manager.submit("hello"), async move {
            assert!(manager.is_sending());
            manager.stop();
        });

        assert_eq!(outcome, TurnOutcome::Aborted);
        let messages = h.manager.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(h.manager.error().is_none());
        assert!(!h.manager.is_sending());
    }

    #[tokio::test]
    async fn submit_while_sending_is_a_no_op() {
        let h = harness(FakeCatalog::default(), FakeCompletion::with(vec![Reply::Hang]));
        let manager = h.manager.clone();

        let (first, second) = futures_util::join!(h.manager.submit("hello"), async move {
            let before = manager.messages().len();
            let outcome = manager.submit("second").await;
            assert_eq!(manager.messages().len(), before);
            manager.stop();
            outcome
        });

        assert_eq!(second, TurnOutcome::Ignored);
        assert_eq!(first, TurnOutcome::Aborted);
        assert_eq!(h.manager.messages().len(), 1);
    }

    #[tokio::test]
    async fn turn_after_stop_is_unaffected_by_stale_result() {
        let h = harness(
            FakeCatalog::default(),
            FakeCompletion::with(vec![Reply::Hang, Reply::Text("second reply")]),
        );
        let manager = h.manager.clone();

        let (first, second) = futures_util::join!(h.manager.submit("first"), async move {
            manager.stop();
            manager.submit("second").await
        });

        assert_eq!(first, TurnOutcome::Aborted);
        assert_eq!(second, TurnOutcome::Completed);
        let contents: Vec<String> = h.manager.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["first", "second", "second reply"]);
        assert!(h.manager.error().is_none());
    }

    #[tokio::test]
    async fn clear_during_request_empties_everything() {
        let h = harness(FakeCatalog::default(), FakeCompletion::with(vec![Reply::Hang]));
        let manager = h.manager.clone();

        let (outcome, _) = futures_util::join!(h.manager.submit("hello"), async move {
            manager.clear();
        });

        assert_eq!(outcome, TurnOutcome::Aborted);
        assert!(h.manager.messages().is_empty());
        assert!(h.manager.error().is_none());
        assert!(!h.manager.can_retry());
        assert!(h.store.get_raw(KEY_MESSAGES).is_none());
    }

    #[tokio::test]
    async fn clear_resets_error_state() {
        let h = harness(
            FakeCatalog::default(),
            FakeCompletion::with(vec![Reply::Fail(ChatError::Network("offline".into()))]),
        );
        h.manager.submit("hello").await;
        assert!(h.manager.error().is_some());

        h.manager.clear();
        assert!(h.manager.messages().is_empty());
        assert!(h.manager.error().is_none());
    }

    #[tokio::test]
    async fn retry_without_history_is_a_no_op() {
        let h = harness(FakeCatalog::default(), FakeCompletion::default());
        assert_eq!(h.manager.retry_last_turn().await, TurnOutcome::Ignored);
        assert!(h.manager.messages().is_empty());
        assert!(h.completion.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn retry_replaces_error_placeholder() {
        let h = harness(
            FakeCatalog::default(),
            FakeCompletion::with(vec![
                Reply::Fail(ChatError::Network("offline".into())),
                Reply::Text("back online"),
            ]),
        );
        h.manager.submit("hello").await;
        assert_eq!(h.manager.retry_last_turn().await, TurnOutcome::Completed);

        // the original user message stays, retry appends the question again
        let messages = h.manager.messages();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "hello", "back online"]);
        assert!(messages.iter().all(|m| !m.is_error));
        assert!(h.manager.error().is_none());

        let requests = h.completion.requests.borrow();
        assert!(requests[1].last().unwrap().content.ends_with("Question: hello"));
    }

    #[tokio::test]
    async fn transcript_survives_reload() {
        let h = harness(FakeCatalog::default(), FakeCompletion::default());
        h.manager.update_settings(Settings {
            api_key: "sk-live".into(),
            ..Default::default()
        });
        h.manager.submit("remember me").await;

        let reloaded = ConversationManager::load(
            Rc::new(FakeCatalog::default()),
            Rc::new(FakeCompletion::default()),
            h.store.clone(),
        );
        let original = h.manager.messages();
        let restored = reloaded.messages();
        assert_eq!(restored, original);
        assert_eq!(restored[0].created_at, original[0].created_at);
        assert_eq!(reloaded.settings().api_key, "sk-live");
        assert!(reloaded.can_retry());
    }

    #[tokio::test]
    async fn listener_fires_on_transitions() {
        let h = harness(FakeCatalog::default(), FakeCompletion::default());
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        h.manager.set_listener(move || counter.set(counter.get() + 1));

        h.manager.submit("hi").await;
        // turn started + turn finished
        assert_eq!(calls.get(), 2);
        h.manager.clear();
        assert_eq!(calls.get(), 3);
    }
}
