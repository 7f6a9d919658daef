//! Typewriter reveal of a finished roast.
//!
//! [`RevealState`] is the pure state machine: `Idle → Running → Complete`, with
//! `Cancelled` reachable from any non-terminal state. [`Revealer`] drives one
//! state at a time on a tokio timer and guarantees that a cancelled run can never
//! publish into a newer one.

use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Running,
    Complete,
    Cancelled,
}

/// Delay before the next character, picked by the character just shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealPacing {
    pub period: Duration,
    pub comma: Duration,
    pub whitespace: Duration,
    pub other: Duration,
}

impl Default for RevealPacing {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(500),
            comma: Duration::from_millis(200),
            whitespace: Duration::from_millis(100),
            other: Duration::from_millis(50),
        }
    }
}

impl RevealPacing {
    pub fn delay_after(&self, c: char) -> Duration {
        match c {
            '.' => self.period,
            ',' => self.comma,
            c if c.is_whitespace() => self.whitespace,
            _ => self.other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    chars: Vec<char>,
    displayed: String,
    cursor: usize,
    phase: RevealPhase,
}

impl RevealState {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            displayed: String::with_capacity(text.len()),
            cursor: 0,
            phase: RevealPhase::Idle,
        }
    }

    /// Idle → Running. Also restarts a finished or cancelled state from scratch.
    pub fn begin(&mut self) {
        self.displayed.clear();
        self.cursor = 0;
        self.phase = RevealPhase::Running;
    }

    /// Show the next character and return how long to wait before the next tick.
    /// Returns `None` once the whole text is shown, flipping the state to `Complete`.
    pub fn advance(&mut self, pacing: &RevealPacing) -> Option<Duration> {
        if self.phase != RevealPhase::Running {
            return None;
        }

        match self.chars.get(self.cursor) {
            Some(&c) => {
                self.displayed.push(c);
                self.cursor += 1;
                Some(pacing.delay_after(c))
            }
            // Reached one delay after the last character, so the full text is
            // briefly shown while still Running.
            None => {
                self.phase = RevealPhase::Complete;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.phase, RevealPhase::Idle | RevealPhase::Running) {
            self.phase = RevealPhase::Cancelled;
        }
    }

    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RevealPhase::Complete
    }

    pub fn is_typing(&self) -> bool {
        self.phase == RevealPhase::Running
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Owns at most one in-flight reveal, through the token that cancels it.
#[derive(Default)]
pub struct Revealer {
    pacing: RevealPacing,
    current: Option<CancellationToken>,
}

impl Revealer {
    /// Cancel whatever is running and start revealing `text`. Progress is
    /// published on the returned receiver, which belongs to this run only.
    pub fn start(&mut self, text: &str) -> watch::Receiver<RevealState> {
        self.cancel();

        let mut state = RevealState::new(text);
        state.begin();

        let (tx, rx) = watch::channel(state.clone());
        let token = CancellationToken::new();
        tokio::spawn(run_reveal(state, tx, token.clone(), self.pacing));

        self.current = Some(token);
        rx
    }

    /// Revoke the pending tick of the current run, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
            tracing::debug!("Reveal cancelled");
        }
    }
}

impl Drop for Revealer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_reveal(
    mut state: RevealState,
    tx: watch::Sender<RevealState>,
    token: CancellationToken,
    pacing: RevealPacing,
) {
    loop {
        if token.is_cancelled() {
            state.cancel();
            tx.send_replace(state);
            return;
        }

        let delay = state.advance(&pacing);
        tx.send_replace(state.clone());

        let Some(delay) = delay else {
            return;
        };

        tokio::select! {
            _ = token.cancelled() => {
                state.cancel();
                tx.send_replace(state);
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROAST: &str = "Olá, dev. Só 3 repos?";

    fn run_to_end(text: &str) -> (RevealState, Vec<String>) {
        let pacing = RevealPacing::default();
        let mut state = RevealState::new(text);
        state.begin();

        let mut snapshots = Vec::new();
        while state.advance(&pacing).is_some() {
            snapshots.push(state.displayed().to_string());
            assert!(text.starts_with(state.displayed()));
            assert_eq!(state.displayed().chars().count(), state.cursor());
            assert!(!state.is_complete());
        }
        (state, snapshots)
    }

    async fn wait_until_settled(rx: &mut watch::Receiver<RevealState>) -> RevealState {
        loop {
            {
                let state = rx.borrow_and_update();
                if !state.is_typing() {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    #[test]
    fn test_delay_by_character() {
        let pacing = RevealPacing::default();
        assert_eq!(pacing.delay_after('.'), Duration::from_millis(500));
        assert_eq!(pacing.delay_after(','), Duration::from_millis(200));
        assert_eq!(pacing.delay_after(' '), Duration::from_millis(100));
        assert_eq!(pacing.delay_after('\n'), Duration::from_millis(100));
        assert_eq!(pacing.delay_after('a'), Duration::from_millis(50));
        assert_eq!(pacing.delay_after('😎'), Duration::from_millis(50));
    }

    #[test]
    fn test_runs_to_completion() {
        let (state, snapshots) = run_to_end(ROAST);

        assert!(state.is_complete());
        assert_eq!(state.displayed(), ROAST);
        assert_eq!(state.cursor(), ROAST.chars().count());
        assert_eq!(snapshots.len(), ROAST.chars().count());
        // Strictly growing prefixes
        for pair in snapshots.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
            assert!(pair[1].len() > pair[0].len());
        }
    }

    #[test]
    fn test_last_character_waits_one_tick_before_complete() {
        let (_, snapshots) = run_to_end(ROAST);
        let (last, earlier) = snapshots.split_last().unwrap();

        for shown in earlier {
            assert!(shown.len() < ROAST.len() && ROAST.starts_with(shown.as_str()));
        }

        // The full text stays Running for one more delay, caret still up.
        assert_eq!(last, ROAST);
        let pacing = RevealPacing::default();
        let mut state = RevealState::new("ok.");
        state.begin();
        assert!(state.advance(&pacing).is_some());
        assert!(state.advance(&pacing).is_some());
        assert_eq!(state.advance(&pacing), Some(pacing.period));
        assert_eq!(state.displayed(), "ok.");
        assert!(state.is_typing());
        assert_eq!(state.advance(&pacing), None);
        assert!(state.is_complete());
    }

    #[test]
    fn test_empty_text_completes_immediately() {
        let (state, snapshots) = run_to_end("");
        assert!(state.is_complete());
        assert!(snapshots.is_empty());
        assert_eq!(state.displayed(), "");
    }

    #[test]
    fn test_idle_state_does_not_advance() {
        let mut state = RevealState::new("abc");
        assert_eq!(state.phase(), RevealPhase::Idle);
        assert_eq!(state.advance(&RevealPacing::default()), None);
        assert_eq!(state.displayed(), "");
    }

    #[test]
    fn test_cancel_then_restart_reproduces_text() {
        let pacing = RevealPacing::default();
        let mut state = RevealState::new(ROAST);
        state.begin();
        for _ in 0..5 {
            state.advance(&pacing);
        }
        state.cancel();
        assert_eq!(state.phase(), RevealPhase::Cancelled);
        assert_eq!(state.advance(&pacing), None);
        assert_eq!(state.displayed().chars().count(), 5);

        state.begin();
        assert_eq!(state.displayed(), "");
        while state.advance(&pacing).is_some() {}
        assert_eq!(state.displayed(), run_to_end(ROAST).0.displayed());
    }

    #[test]
    fn test_cancel_leaves_complete_alone() {
        let (mut state, _) = run_to_end("ok");
        state.cancel();
        assert!(state.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revealer_runs_to_completion() {
        let mut revealer = Revealer::default();
        let mut rx = revealer.start(ROAST);

        let state = wait_until_settled(&mut rx).await;
        assert!(state.is_complete());
        assert_eq!(state.displayed(), ROAST);
        assert_eq!(state.text(), ROAST);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revealer_paces_by_punctuation() {
        let mut revealer = Revealer::default();
        let started = tokio::time::Instant::now();
        let mut rx = revealer.start("a. b");

        let state = wait_until_settled(&mut rx).await;
        assert!(state.is_complete());
        // a=50, .=500, space=100, b=50
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(700), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(800), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_run() {
        let mut revealer = Revealer::default();
        let mut old_rx = revealer.start("primeiro roast, bem longo.");
        tokio::time::sleep(Duration::from_millis(120)).await;

        let mut new_rx = revealer.start("segundo");

        let old = wait_until_settled(&mut old_rx).await;
        assert_eq!(old.phase(), RevealPhase::Cancelled);
        assert!(old.displayed().len() < "primeiro roast, bem longo.".len());

        // Every state the new run publishes belongs to the new text
        loop {
            {
                let state = new_rx.borrow_and_update();
                assert!("segundo".starts_with(state.displayed()));
                if state.is_complete() {
                    break;
                }
            }
            new_rx.changed().await.unwrap();
        }
        assert_eq!(new_rx.borrow().displayed(), "segundo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_after_cancel_is_identical() {
        let mut revealer = Revealer::default();
        let mut rx = revealer.start(ROAST);
        tokio::time::sleep(Duration::from_millis(200)).await;
        revealer.cancel();
        assert_eq!(wait_until_settled(&mut rx).await.phase(), RevealPhase::Cancelled);

        let mut rx = revealer.start(ROAST);
        let state = wait_until_settled(&mut rx).await;
        assert!(state.is_complete());
        assert_eq!(state.displayed(), ROAST);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_revokes_pending_tick() {
        let mut rx = {
            let mut revealer = Revealer::default();
            revealer.start(ROAST)
        };
        let state = wait_until_settled(&mut rx).await;
        assert_eq!(state.phase(), RevealPhase::Cancelled);
        assert!(state.displayed().chars().count() < ROAST.chars().count());
    }
}
