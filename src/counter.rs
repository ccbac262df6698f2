//! Animated statistics counters.
//!
//! A stat such as `"1,200+"` counts up from zero when it scrolls into view:
//! `steps` frames spaced `duration / steps` apart, frame `k` showing
//! `min(round(target / steps * k), target)` with thousands separators. The
//! last frame always shows the exact target. A counter animates once; later
//! triggers are ignored.
//!
//! ```text
//! "1,200+"  →  prefix ""  target 1200  suffix "+"
//! frames:   "20+"  "40+"  …  "1,180+"  "1,200+"
//! ```

use crate::config::CounterConfig;
use std::time::Duration;
use tokio::time::{Instant, interval_at};

/// Shortest time between frames; tokio intervals must be non-zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCounter {
    target: u64,
    prefix: String,
    suffix: String,
    steps: u32,
    interval: Duration,
    animated: bool,
}

impl StatCounter {
    /// Parse the stat's display text. `None` if it holds no digits or the
    /// number does not fit in a `u64`.
    pub fn parse(text: &str, config: &CounterConfig) -> Option<Self> {
        let first = text.find(|c: char| c.is_ascii_digit())?;
        let last = text.rfind(|c: char| c.is_ascii_digit())?;
        let digits: String = text[first..=last]
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let target = digits.parse().ok()?;
        let steps = config.steps.max(1);

        Some(Self {
            target,
            prefix: text[..first].to_string(),
            suffix: text[last + 1..].to_string(),
            steps,
            interval: (Duration::from_millis(config.duration_ms) / steps).max(MIN_INTERVAL),
            animated: false,
        })
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Time between frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Text shown at frame `step` (1-based). Steps past the end show the target.
    pub fn frame(&self, step: u32) -> String {
        let value = if step >= self.steps {
            self.target
        } else {
            let increment = self.target as f64 / f64::from(self.steps);
            ((increment * f64::from(step)).round() as u64).min(self.target)
        };
        format!("{}{}{}", self.prefix, format_grouped(value), self.suffix)
    }

    /// Every frame, in order.
    pub fn frames(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.steps).map(|step| self.frame(step))
    }

    /// Mark the counter as animated. Returns `false` if it already was.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.animated, true)
    }

    /// Play the animation, calling `on_frame` with each frame's text on a
    /// fixed interval. Returns `false` without doing anything if the counter
    /// has already been animated.
    pub async fn run(&mut self, mut on_frame: impl FnMut(&str)) -> bool {
        if !self.start() {
            return false;
        }
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        for step in 1..=self.steps {
            ticker.tick().await;
            on_frame(&self.frame(step));
        }
        true
    }
}

/// Format with `,` thousands separators, e.g. `1234567` → `"1,234,567"`.
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
