//! Per-frame coordination: mouth edges, selections and the background work
//! they kick off.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::gesture::GestureState;
use crate::notify::{deliver_within, ClearPolicy, Notifier};
use crate::selection::Selection;
use crate::session::{OutgoingMessage, SessionView, SharedSession};
use crate::suggest::{fetch_words, SuggestionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub clear: ClearPolicy,
    pub suggestion_timeout: Duration,
    pub email_timeout: Duration,
}

impl Policy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            clear: config.email.clear_policy,
            suggestion_timeout: config.llm.timeout(),
            email_timeout: config.email.timeout(),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub selected: Option<Selection>,
    pub notified: bool,
}

#[derive(Clone)]
pub struct Assistant {
    session: SharedSession,
    suggester: Arc<dyn SuggestionService>,
    notifier: Arc<dyn Notifier>,
    policy: Policy,
    runtime: Handle,
    tasks: TaskTracker,
}

impl Assistant {
    pub fn new(
        session: SharedSession,
        suggester: Arc<dyn SuggestionService>,
        notifier: Arc<dyn Notifier>,
        policy: Policy,
        runtime: Handle,
    ) -> Self {
        Self {
            session,
            suggester,
            notifier,
            policy,
            runtime,
            tasks: TaskTracker::new(),
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionView {
        self.session.lock().view()
    }

    pub fn mouth_open(&self) -> bool {
        self.session.lock().mouth_open()
    }

    /// Process one classified frame. Never blocks on the network: email and
    /// suggestion requests run on the runtime.
    pub fn observe(&self, gesture: &GestureState) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        let mut sent = None;
        let mut refresh = false;

        {
            let mut session = self.session.lock();

            if session.update_mouth(gesture) {
                match session.begin_send(self.policy.clear) {
                    Some(message) => {
                        info!(context = %message.context, "mouth opened, sending message");
                        refresh = self.policy.clear == ClearPolicy::Always;
                        sent = Some(message);
                        outcome.notified = true;
                    }
                    None => info!("mouth opened while a message is still sending, ignored"),
                }
            }

            if let Some(selection) = session.select(gesture) {
                outcome.selected = Some(selection);
                refresh = true;
            }
        }

        if let Some(message) = sent {
            self.spawn_delivery(message);
        }
        if refresh {
            self.refresh();
        }
        outcome
    }

    /// Ask for a new word list for the current context. Results from older
    /// requests that finish late are discarded.
    pub fn refresh(&self) {
        let request = self.session.lock().begin_refresh();
        let session = self.session.clone();
        let suggester = self.suggester.clone();
        let timeout = self.policy.suggestion_timeout;

        self.tasks.spawn_on(
            async move {
                match fetch_words(suggester.as_ref(), &request.context, timeout).await {
                    Ok(words) => {
                        debug!(generation = request.generation, words = ?words.as_slice(), "new suggestions");
                        session.lock().apply_suggestions(request.generation, words);
                    }
                    Err(e) => warn!("error fetching words: {e}"),
                }
            },
            &self.runtime,
        );
    }

    fn spawn_delivery(&self, message: OutgoingMessage) {
        let notifier = self.notifier.clone();
        let timeout = self.policy.email_timeout;
        let clear = self.policy.clear;
        let this = self.clone();

        self.tasks.spawn_on(
            async move {
                match deliver_within(notifier.as_ref(), &message.context, timeout).await {
                    Ok(()) => {
                        let cleared =
                            clear == ClearPolicy::OnSuccess && this.session.lock().confirm_sent(message.id);
                        if cleared {
                            this.refresh();
                        }
                    }
                    Err(e) => {
                        error!("error sending email: {e}");
                        this.session.lock().abandon_send(message.id);
                    }
                }
            },
            &self.runtime,
        );
    }

    /// Wait for every in-flight suggestion and email task.
    pub async fn settle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}
