//! Typewriter reveal: progressive disclosure of a completed response.
//!
//! The full response text is already known when the reveal starts; the
//! engine grows a visible prefix by a fixed chunk on a fixed tick,
//! re-balancing fences and re-rendering through the [`Renderer`] every tick
//! so partially revealed Markdown always displays as valid structure.
//!
//! Only one reveal is active per typewriter. Starting a new one cancels any
//! prior uncompleted reveal (last writer wins on the timer); a cancelled
//! reveal never invokes its completion callback.

use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{Renderer, close_open_fences};

/// Characters revealed per tick.
pub const DEFAULT_CHUNK: usize = 5;

/// Interval between ticks.
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

/// The host-side message node a reveal writes into.
///
/// `near_bottom` / `scroll_to_bottom` implement sticky-bottom autoscroll:
/// the engine asks before each tick and only scrolls afterwards if the
/// viewport was already near its end, so a reader who scrolled up stays
/// where they are. `finalize` runs once after completion for hosts that
/// defer expensive work (e.g. a full syntax-highlight pass) to the end.
pub trait RevealTarget<O> {
    fn set_content(&mut self, content: O);
    fn near_bottom(&self) -> bool;
    fn scroll_to_bottom(&mut self);
    fn finalize(&mut self);
}

/// Fixed-cadence reveal engine over a [`Renderer`].
pub struct Typewriter<R: Renderer> {
    renderer: R,
    chunk: usize,
    tick: Duration,
    active: Mutex<CancellationToken>,
}

impl<R: Renderer> Typewriter<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            chunk: DEFAULT_CHUNK,
            tick: DEFAULT_TICK,
            active: Mutex::new(CancellationToken::new()),
        }
    }

    /// Override chunk size and tick interval.
    pub fn with_cadence(mut self, chunk: usize, tick: Duration) -> Self {
        self.chunk = chunk.max(1);
        self.tick = tick;
        self
    }

    /// Access the renderer (for rendering without animation).
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Cancel any in-progress reveal and install a fresh token for the next.
    fn supersede(&self) -> CancellationToken {
        let mut active = self.active.lock().expect("typewriter token lock poisoned");
        let fresh = CancellationToken::new();
        let previous = std::mem::replace(&mut *active, fresh.clone());
        previous.cancel();
        fresh
    }

    /// Reveal `full_text` into `target`.
    ///
    /// Returns true if the reveal ran to completion, false if it was
    /// superseded by a newer reveal. `on_done` is invoked exactly once, on
    /// completion only, before the target's `finalize` pass.
    pub async fn reveal<T, F>(
        &self,
        target: &mut T,
        full_text: &str,
        is_markdown: bool,
        on_done: F,
    ) -> bool
    where
        T: RevealTarget<R::Output>,
        F: FnOnce(),
    {
        let token = self.supersede();
        let total = full_text.chars().count();
        let mut shown = 0usize;

        loop {
            if token.is_cancelled() {
                return false;
            }

            shown = (shown + self.chunk).min(total);
            let prefix = char_prefix(full_text, shown);
            let content = if is_markdown {
                self.renderer.render(&close_open_fences(prefix), true)
            } else {
                self.renderer.render(prefix, false)
            };

            let stick = target.near_bottom();
            target.set_content(content);
            if stick {
                target.scroll_to_bottom();
            }

            if shown >= total {
                break;
            }

            tokio::select! {
                _ = token.cancelled() => return false,
                _ = tokio::time::sleep(self.tick) => {}
            }
        }

        on_done();
        target.finalize();
        true
    }
}

/// The prefix of `text` holding at most `chars` characters, on a char
/// boundary.
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
