//! All mutable state shared between the frame loop, the word rotator and the
//! background suggestion/notification tasks.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::gesture::GestureState;
use crate::notify::ClearPolicy;
use crate::selection::{DebounceMode, Selection, Selector};
use crate::words::{DisplayedTriple, WordList, WordRotator};

pub type SharedSession = Arc<Mutex<Session>>;

/// The sentence under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context(String);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Words are joined with a leading space, so a non-empty context always
    /// starts with one.
    pub fn append(&mut self, word: &str) {
        self.0.push(' ');
        self.0.push_str(word);
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Remove the first `len` bytes. The context only grows at the back, so
    /// a length captured earlier still marks the same words.
    pub fn drain_front(&mut self, len: usize) -> bool {
        if len > self.0.len() || !self.0.is_char_boundary(len) {
            return false;
        }
        self.0.drain(..len);
        true
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A suggestion refresh to run outside the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub generation: u64,
    pub context: String,
}

/// A message handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub id: u64,
    pub context: String,
}

/// The front of the context that is currently being emailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSend {
    id: u64,
    len: usize,
}

/// Read-only copy for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub context: String,
    pub triple: DisplayedTriple,
    pub word_count: usize,
}

#[derive(Debug)]
pub struct Session {
    context: Context,
    words: WordList,
    rotator: WordRotator,
    triple: DisplayedTriple,
    selector: Selector,
    mouth_open: bool,
    generation: u64,
    next_send_id: u64,
    pending_send: Option<PendingSend>,
}

impl Session {
    /// The first window is shown immediately; the rotator only handles the
    /// ticks after it.
    pub fn new(words: WordList, debounce: DebounceMode) -> Self {
        let mut session = Self {
            context: Context::new(),
            words,
            rotator: WordRotator::new(),
            triple: DisplayedTriple::default(),
            selector: Selector::new(debounce),
            mouth_open: false,
            generation: 0,
            next_send_id: 0,
            pending_send: None,
        };
        session.rotate();
        session
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn triple(&self) -> &DisplayedTriple {
        &self.triple
    }

    pub fn mouth_open(&self) -> bool {
        self.mouth_open
    }

    pub fn last_selected_word(&self) -> Option<&str> {
        self.selector.last_selected_word()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            context: self.context.to_string(),
            triple: self.triple.clone(),
            word_count: self.words.len(),
        }
    }

    pub fn rotate(&mut self) -> &DisplayedTriple {
        self.triple = self.rotator.tick(&self.words);
        debug!(cursor = self.rotator.cursor(), triple = %self.triple, "rotated words");
        &self.triple
    }

    /// Track the mouth and report a closed-to-open edge. Frames without a
    /// face leave the state alone.
    pub fn update_mouth(&mut self, gesture: &GestureState) -> bool {
        if !gesture.face_present {
            return false;
        }
        let opened = gesture.mouth_open && !self.mouth_open;
        self.mouth_open = gesture.mouth_open;
        opened
    }

    /// Run the selector against the current triple and append any new word.
    pub fn select(&mut self, gesture: &GestureState) -> Option<Selection> {
        let selection = self.selector.step(gesture, &self.triple)?;
        self.context.append(&selection.word);
        info!(word = %selection.word, context = %self.context, "updated context");
        Some(selection)
    }

    pub fn clear_context(&mut self) {
        self.context.clear();
        self.pending_send = None;
    }

    pub fn send_pending(&self) -> bool {
        self.pending_send.is_some()
    }

    /// Capture the context for emailing.
    ///
    /// With [`ClearPolicy::Always`] the context is cleared right away. With
    /// [`ClearPolicy::OnSuccess`] the captured span stays in place until
    /// [`Session::confirm_sent`], and no second message is started while one
    /// is in flight.
    pub fn begin_send(&mut self, policy: ClearPolicy) -> Option<OutgoingMessage> {
        if policy == ClearPolicy::OnSuccess && self.pending_send.is_some() {
            return None;
        }

        self.next_send_id += 1;
        let message = OutgoingMessage {
            id: self.next_send_id,
            context: self.context.to_string(),
        };

        match policy {
            ClearPolicy::Always => self.clear_context(),
            ClearPolicy::OnSuccess => {
                self.pending_send = Some(PendingSend {
                    id: message.id,
                    len: message.context.len(),
                });
            }
        }
        Some(message)
    }

    /// The message `id` was accepted: drop exactly the span it captured.
    pub fn confirm_sent(&mut self, id: u64) -> bool {
        match self.pending_send {
            Some(pending) if pending.id == id => {
                self.pending_send = None;
                self.context.drain_front(pending.len)
            }
            _ => false,
        }
    }

    /// The message `id` failed: keep the context and allow a new attempt.
    pub fn abandon_send(&mut self, id: u64) {
        if self.pending_send.is_some_and(|p| p.id == id) {
            self.pending_send = None;
        }
    }

    /// Start a suggestion refresh. Any request started earlier becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshRequest {
        self.generation += 1;
        RefreshRequest {
            generation: self.generation,
            context: self.context.to_string(),
        }
    }

    /// Install a refreshed list unless a newer request has been started since.
    pub fn apply_suggestions(&mut self, generation: u64, words: WordList) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "dropping stale suggestions");
            return false;
        }
        self.words = words;
        self.rotator.reset();
        true
    }
}
