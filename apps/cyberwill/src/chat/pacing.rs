//! Typing-effect pacing for the streaming assistant reply.
//!
//! Network delivery is bursty; the reader sees text revealed at a steady rate
//! instead. The pace adapts to the backlog: far behind means fast ticks, close
//! to the tail means slow ticks. The revealed text is always a prefix of the
//! text received so far.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Backlog (in characters) above which the fast tick is used.
pub const BACKLOG_THRESHOLD: usize = 10;
pub const FAST_TICK: Duration = Duration::from_millis(2);
pub const SLOW_TICK: Duration = Duration::from_millis(8);

/// Markdown punctuation revealed as a whole run, so a fence or a table
/// separator is never drawn half-way.
const MARKUP_CHARS: &[char] = &['`', '*', '_', '~', '|', '#'];

/// Characters that keep a run going once it started with `|`, so a table
/// rule such as `|---|`, `|:--|` or `| --- | :-: |` lands in one step.
const TABLE_RULE_CHARS: &[char] = &['-', ':', ' '];

/// Snapshot of the reply being streamed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyView {
    pub content: String,
    /// True while the backend is still sending.
    pub loading: bool,
}

impl ReplyView {
    /// Empty reply that is still arriving.
    pub fn streaming() -> Self {
        Self {
            content: String::new(),
            loading: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pacer {
    target: String,
    /// Byte length of the revealed prefix; always on a char boundary.
    shown: usize,
}

impl Pacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> &str {
        &self.target[..self.shown]
    }

    /// Characters received but not yet revealed.
    pub fn backlog(&self) -> usize {
        self.target[self.shown..].chars().count()
    }

    pub fn is_caught_up(&self) -> bool {
        self.shown == self.target.len()
    }

    /// Replaces the target. If the new target no longer extends what is shown
    /// (a new reply started), the shown text is cut back to the common prefix.
    pub fn set_target(&mut self, target: &str) {
        if !target.starts_with(self.displayed()) {
            self.shown = common_prefix_len(self.displayed(), target);
        }
        self.target.clear();
        self.target.push_str(target);
    }

    /// Delay before the next reveal step, or `None` when caught up.
    pub fn next_delay(&self) -> Option<Duration> {
        if self.is_caught_up() {
            None
        } else if self.backlog() > BACKLOG_THRESHOLD {
            Some(FAST_TICK)
        } else {
            Some(SLOW_TICK)
        }
    }

    /// Reveals one step (one character, or one run of markup punctuation) and
    /// returns the newly revealed text.
    pub fn advance(&mut self) -> &str {
        let rest = &self.target[self.shown..];
        let mut chars = rest.char_indices();
        let Some((_, first)) = chars.next() else {
            return "";
        };
        let mut end = first.len_utf8();
        if MARKUP_CHARS.contains(&first) {
            for (i, c) in chars {
                let continues =
                    MARKUP_CHARS.contains(&c) || (first == '|' && TABLE_RULE_CHARS.contains(&c));
                if !continues {
                    break;
                }
                end = i + c.len_utf8();
            }
        }
        let start = self.shown;
        self.shown += end;
        &self.target[start..self.shown]
    }

    /// Reveals everything at once.
    pub fn finish(&mut self) {
        self.shown = self.target.len();
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map(|((i, c), _)| i + c.len_utf8())
        .unwrap_or(0)
}

/// Drives a `Pacer` from a stream of `ReplyView` snapshots, calling `on_frame`
/// with the full displayed text after every change.
///
/// Returns the final text once a snapshot with `loading == false` arrives (or
/// the sender goes away); at that point the whole target is shown at once.
pub async fn run_typewriter<F>(mut views: watch::Receiver<ReplyView>, mut on_frame: F) -> String
where
    F: FnMut(&str),
{
    let mut pacer = Pacer::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let view = views.borrow_and_update().clone();
        let before = pacer.displayed().len();
        pacer.set_target(&view.content);
        if pacer.displayed().len() != before {
            on_frame(pacer.displayed());
        }

        if !view.loading {
            pacer.finish();
            on_frame(pacer.displayed());
            return pacer.displayed().to_string();
        }

        let Some(delay) = pacer.next_delay() else {
            deadline = None;
            if views.changed().await.is_err() {
                pacer.finish();
                on_frame(pacer.displayed());
                return pacer.displayed().to_string();
            }
            continue;
        };

        // Keep the pending tick across target updates so a chatty upstream
        // cannot starve the reveal.
        let at = *deadline.get_or_insert_with(|| Instant::now() + delay);
        tokio::select! {
            _ = tokio::time::sleep_until(at) => {
                deadline = None;
                pacer.advance();
                on_frame(pacer.displayed());
            }
            changed = views.changed() => {
                if changed.is_err() {
                    pacer.finish();
                    on_frame(pacer.displayed());
                    return pacer.displayed().to_string();
                }
            }
        }
    }
}
