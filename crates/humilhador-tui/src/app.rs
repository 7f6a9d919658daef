use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use humilhador_core::{
    normalize_username, CardAction, CardCapability, CompletedCard, RevealState, Revealer,
    RoastCard, RoastError, RoastResult,
};

use crate::api::RoastApiClient;

/// Notifications disappear on their own after this long.
pub const NOTICE_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: Instant,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Form state
    pub username_input: String,
    pub input_cursor: usize, // cursor position in username_input, in chars
    pub loading: bool,
    pub roast_task: Option<JoinHandle<anyhow::Result<RoastResult>>>,
    pub pending_username: String,

    // Result card
    pub card: Option<RoastCard>,
    pub revealer: Revealer,
    pub reveal_rx: Option<watch::Receiver<RevealState>>,

    // Card action (PDF export or share, chosen by config)
    pub action: Arc<dyn CardAction>,
    pub action_task: Option<JoinHandle<Result<String, RoastError>>>,

    pub notice: Option<Notice>,

    // Animation state
    pub animation_frame: u8,

    pub api: RoastApiClient,
}

impl App {
    pub fn new(api: RoastApiClient, action: Arc<dyn CardAction>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            username_input: String::new(),
            input_cursor: 0,
            loading: false,
            roast_task: None,
            pending_username: String::new(),
            card: None,
            revealer: Revealer::default(),
            reveal_rx: None,
            action,
            action_task: None,
            notice: None,
            animation_frame: 0,
            api,
        }
    }

    pub fn capability(&self) -> CardCapability {
        self.action.capability()
    }

    /// Send the typed username to the endpoint. Any reveal in flight is cancelled first.
    pub fn submit(&mut self) {
        if self.roast_task.is_some() {
            return;
        }

        let username = normalize_username(&self.username_input);
        self.username_input = username.clone();
        self.input_cursor = self.username_input.chars().count();

        self.revealer.cancel();
        self.reveal_rx = None;
        self.card = None;
        self.notice = None;
        self.loading = true;
        self.pending_username = username.clone();

        let api = self.api.clone();
        self.roast_task = Some(tokio::spawn(async move { api.roast(&username).await }));
    }

    /// Show a fresh roast and start typing it out.
    pub fn show_roast(&mut self, result: RoastResult) {
        self.card = Some(RoastCard::new(&self.pending_username, &result));
        self.reveal_rx = Some(self.revealer.start(&result.text));
    }

    /// Latest reveal progress. Marks it seen so the event loop can wait for the next one.
    pub fn reveal_snapshot(&mut self) -> Option<RevealState> {
        self.reveal_rx
            .as_mut()
            .map(|rx| rx.borrow_and_update().clone())
    }

    /// The card, but only once the reveal has finished.
    pub fn completed_card(&self) -> Option<CompletedCard> {
        let card = self.card.clone()?;
        let rx = self.reveal_rx.as_ref()?;
        let state = rx.borrow();
        CompletedCard::new(card, &state)
    }

    /// Run the card action. Returns false (and does nothing) while typing is still going.
    pub fn trigger_action(&mut self) -> bool {
        if self.action_task.is_some() {
            return false;
        }
        let Some(card) = self.completed_card() else {
            return false;
        };

        let action = Arc::clone(&self.action);
        self.action_task = Some(tokio::spawn(async move { action.perform(&card).await }));
        true
    }

    /// Collect finished background work.
    pub async fn poll_tasks(&mut self) {
        if self.roast_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.roast_task.take() {
                self.loading = false;
                match task.await {
                    Ok(Ok(result)) => self.show_roast(result),
                    Ok(Err(e)) => self.show_notice(NoticeKind::Error, e.to_string()),
                    Err(e) => {
                        tracing::error!("Roast task failed: {}", e);
                        self.show_notice(NoticeKind::Error, "Erro ao gerar roast".to_string());
                    }
                }
            }
        }

        if self.action_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.action_task.take() {
                match task.await {
                    Ok(Ok(message)) => self.show_notice(NoticeKind::Success, message),
                    Ok(Err(e)) => self.show_notice(NoticeKind::Error, e.public_message()),
                    Err(e) => {
                        tracing::error!("Card action task failed: {}", e);
                        self.show_notice(NoticeKind::Error, "Algo deu errado".to_string());
                    }
                }
            }
        }
    }

    pub fn show_notice(&mut self, kind: NoticeKind, message: String) {
        self.notice = Some(Notice {
            kind,
            message,
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Tick animation frame and expire old notifications (called by Tick event)
    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 4;

        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.shown_at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }
}
