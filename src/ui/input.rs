/// Key-state snapshot.
///
/// Tracks which keys are currently held so the actor drawer can read them
/// without touching the terminal. The host refreshes it once per frame with
/// `drain_events()`; tests and embedding hosts inject keys with `press` /
/// `release`.
///
/// Uses crossterm's Release events when the terminal reports them and falls
/// back to timeout-based release detection otherwise.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Debug, Default)]
pub struct KeyState {
    /// Timestamp of last Press/Repeat event for each key.
    /// `None` marks a key injected with `press`, held until `release`.
    last_active: HashMap<KeyCode, Option<Instant>>,

    /// Raw key events collected during the last drain.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events.
    pub honor_release: bool,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Key state for a terminal that does (or does not) report Release
    /// events. Without them keys expire after `HOLD_TIMEOUT`.
    pub fn with_release_events(honor_release: bool) -> Self {
        KeyState { honor_release, ..KeyState::new() }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before `DisplaySurface::update`.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| match t {
            Some(t) => now.duration_since(*t) < HOLD_TIMEOUT,
            None => true,
        });
    }

    /// Hold `code` until `release` is called.
    pub fn press(&mut self, code: KeyCode) {
        self.last_active.insert(code, None);
    }

    pub fn release(&mut self, code: KeyCode) {
        self.last_active.remove(&code);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        match self.last_active.get(&code) {
            Some(Some(t)) => t.elapsed() < HOLD_TIMEOUT,
            Some(None) => true,
            None => false,
        }
    }

    /// `q`, `Esc` or Ctrl+C seen during the last drain.
    pub fn quit_requested(&self) -> bool {
        self.raw_events.iter().any(|k| {
            if k.kind == KeyEventKind::Release {
                return false;
            }
            let ctrl_c = k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'));
            ctrl_c || matches!(k.code, KeyCode::Char('q') | KeyCode::Esc)
        })
    }

    // ── Internal ──

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Not trusted; timeout expiry handles it.
            }
            _ => {
                self.last_active.insert(key.code, Some(Instant::now()));
            }
        }
    }
}
