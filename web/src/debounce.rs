// Copyright 2022 Jeremy Wall
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    query: String,
    deadline: Instant,
}

/// Holds back a changing search query until input pauses for `window`.
///
/// The debouncer does not own a timer. Callers feed it the current time and
/// ask for [`SearchDebouncer::deadline`] to know when to poll next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDebouncer {
    window: Duration,
    pending: Option<Pending>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SearchDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a query change at `now`. Any window still open is replaced.
    pub fn input<S: Into<String>>(&mut self, query: S, now: Instant) {
        let query = query.into();
        let deadline = now + self.window;
        if self.pending.is_some() {
            debug!(?deadline, "restarting debounce window");
        }
        self.pending = Some(Pending { query, deadline });
    }

    /// Take the query once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let elapsed = matches!(&self.pending, Some(p) if now >= p.deadline);
        if elapsed {
            self.pending.take().map(|p| p.query)
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the open window, if any. Returns true if one was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_only_the_last_keystroke_fires() {
        let t0 = Instant::now();
        let mut debouncer = SearchDebouncer::new(ms(500));
        let mut fired = Vec::new();
        let keystrokes = vec![(0, "d"), (100, "da"), (200, "dal")];
        let mut keys = keystrokes.iter().peekable();
        // Step a simulated clock one millisecond at a time.
        for t in 0..=1000u64 {
            while let Some((at, q)) = keys.peek() {
                if *at == t {
                    debouncer.input(*q, t0 + ms(t));
                    keys.next();
                } else {
                    break;
                }
            }
            if let Some(q) = debouncer.poll(t0 + ms(t)) {
                fired.push((t, q));
            }
        }
        assert_eq!(fired, vec![(700, "dal".to_owned())]);
    }

    #[test]
    fn test_poll_before_deadline_is_a_no_op() {
        let t0 = Instant::now();
        let mut debouncer = SearchDebouncer::new(ms(500));
        debouncer.input("paneer", t0);
        assert_eq!(debouncer.deadline(), Some(t0 + ms(500)));
        assert_eq!(debouncer.poll(t0 + ms(499)), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + ms(500)), Some("paneer".to_owned()));
        assert_eq!(debouncer.poll(t0 + ms(2000)), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_cancel_has_no_side_effects() {
        let t0 = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        assert!(!debouncer.cancel());
        debouncer.input("rajma", t0);
        assert!(debouncer.cancel());
        assert_eq!(debouncer.poll(t0 + ms(10_000)), None);
        assert_eq!(debouncer, SearchDebouncer::new(DEFAULT_WINDOW));
    }

    #[test]
    fn test_empty_query_still_fires() {
        let t0 = Instant::now();
        let mut debouncer = SearchDebouncer::new(ms(50));
        debouncer.input("dal", t0);
        debouncer.input("", t0 + ms(10));
        assert_eq!(debouncer.poll(t0 + ms(59)), None);
        assert_eq!(debouncer.poll(t0 + ms(60)), Some(String::new()));
    }
}
