//! Keyed trailing-edge debouncer.
//!
//! The debouncer does not own a timer. The caller asks for the
//! [`next_deadline`](Debouncer::next_deadline), sleeps until it, and then
//! collects what is due with [`take_due`](Debouncer::take_due). This keeps
//! every pending write inside the engine's single task and lets tests drive
//! time with a paused tokio clock.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

/// Trailing-edge delay applied to temperature writes.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug)]
struct Pending<V> {
    value: V,
    deadline: Instant,
}

/// At most one pending value per key; a new call replaces the value and
/// restarts the countdown.
#[derive(Debug)]
pub struct Debouncer<K, V> {
    delay: Duration,
    pending: HashMap<K, Pending<V>>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `value` under `key`, due `delay` after `now`.
    ///
    /// Returns the value it replaced, if any.
    pub fn schedule(&mut self, key: K, value: V, now: Instant) -> Option<V> {
        let deadline = now + self.delay;
        self.pending
            .insert(key, Pending { value, deadline })
            .map(|previous| previous.value)
    }

    /// Drop the pending value for `key`.
    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|pending| pending.value)
    }

    /// Drop every pending value whose key matches.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|key, _| !predicate(key));
        before - self.pending.len()
    }

    /// Earliest deadline among pending values.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.deadline).min()
    }

    /// Remove and return every value due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let mut due: Vec<(K, Instant)> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(key, pending)| (key.clone(), pending.deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);

        due.into_iter()
            .filter_map(|(key, _)| {
                self.pending
                    .remove(&key)
                    .map(|pending| (key, pending.value))
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn should_keep_only_latest_value_per_key() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEFAULT_DELAY);

        assert_eq!(debouncer.schedule("target", 10, start), None);
        assert_eq!(debouncer.schedule("target", 12, start + ms(1000)), Some(10));
        assert_eq!(debouncer.schedule("target", 15, start + ms(2000)), Some(12));
        assert_eq!(debouncer.len(), 1);
    }

    #[test]
    fn should_restart_countdown_on_each_call() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEFAULT_DELAY);
        debouncer.schedule("target", 10, start);
        debouncer.schedule("target", 15, start + ms(2000));

        assert_eq!(debouncer.next_deadline(), Some(start + ms(7000)));
        assert!(debouncer.take_due(start + ms(5000)).is_empty());
        assert!(debouncer.take_due(start + ms(6999)).is_empty());
        assert_eq!(debouncer.take_due(start + ms(7000)), vec![("target", 15)]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn should_fire_keys_independently_in_deadline_order() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(100));
        debouncer.schedule("high", 24, start + ms(50));
        debouncer.schedule("low", 18, start);

        let due = debouncer.take_due(start + ms(200));
        assert_eq!(due, vec![("low", 18), ("high", 24)]);
    }

    #[test]
    fn should_report_no_deadline_when_idle() {
        let debouncer: Debouncer<&str, i32> = Debouncer::new(ms(100));
        assert_eq!(debouncer.next_deadline(), None);
    }

    #[test]
    fn should_cancel_pending_values() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(100));
        debouncer.schedule(("a", 1), 1, start);
        debouncer.schedule(("a", 2), 2, start);
        debouncer.schedule(("b", 1), 3, start);

        assert_eq!(debouncer.cancel(&("b", 1)), Some(3));
        assert_eq!(debouncer.cancel_where(|(owner, _)| *owner == "a"), 2);
        assert!(debouncer.is_empty());
    }
}
