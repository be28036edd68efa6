//! Deferred actions keyed by update clock.

use std::cmp::Ordering;
use std::collections::binary_heap::PeekMut;
use std::collections::BinaryHeap;

use crate::Clock;

#[derive(Debug)]
pub struct Scheduler<T> {
    inner: BinaryHeap<Schedule<T>>,
    pushed: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Scheduler<T> {
        Scheduler {
            inner: BinaryHeap::new(),
            pushed: 0,
        }
    }
    /// Run `action` at the first `pop` whose clock reaches `at`.
    pub fn push(&mut self, at: Clock, action: T) {
        let schedule = Schedule::new(action, at, self.pushed);
        self.pushed += 1;
        self.inner.push(schedule);
    }
    /// Take every action due at `count`, earliest first; same-clock actions
    /// keep their push order.
    pub fn pop(&mut self, count: Clock) -> Vec<T> {
        let mut res = vec![];
        while let Some(schedule) = self.inner.peek_mut() {
            if schedule.at > count {
                break;
            }
            res.push(PeekMut::pop(schedule).action);
        }
        res
    }
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[derive(Debug)]
struct Schedule<T> {
    action: T,
    at: Clock,
    seq: u64,
}

impl<T> Schedule<T> {
    fn new(action: T, at: Clock, seq: u64) -> Schedule<T> {
        Schedule { action, at, seq }
    }
    // BinaryHeap is a max-heap
    fn key(&self) -> (Clock, u64) {
        (Clock::max_value() - self.at, u64::max_value() - self.seq)
    }
}

impl<T> Ord for Schedule<T> {
    fn cmp(&self, other: &Schedule<T>) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl<T> PartialOrd for Schedule<T> {
    fn partial_cmp(&self, other: &Schedule<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Schedule<T> {
    fn eq(&self, other: &Schedule<T>) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Schedule<T> {}

#[cfg(test)]
mod schedule_test {
    use super::*;
    #[test]
    fn once() {
        let mut scheduler = Scheduler::<String>::new();
        scheduler.push(5, "@_@".to_string());
        (0..10).for_each(|i| {
            let v = scheduler.pop(i);
            if i != 5 {
                assert!(v.is_empty());
            } else {
                assert_eq!(v, vec!["@_@".to_string()]);
            }
        });
        assert!(scheduler.pop(Clock::max_value()).is_empty());
    }
    #[test]
    fn overdue_actions_fire_on_next_pop() {
        let mut scheduler = Scheduler::new();
        scheduler.push(3, 'a');
        assert_eq!(scheduler.pop(10), vec!['a']);
        assert!(scheduler.pop(11).is_empty());
    }
    #[test]
    fn earliest_first_then_push_order() {
        let mut scheduler = Scheduler::new();
        scheduler.push(8, "late");
        scheduler.push(4, "first");
        scheduler.push(4, "second");
        assert_eq!(scheduler.pop(5), vec!["first", "second"]);
        assert_eq!(scheduler.pop(8), vec!["late"]);
    }
    #[test]
    fn clear_drops_pending() {
        let mut scheduler = Scheduler::new();
        scheduler.push(1, ());
        scheduler.clear();
        assert!(scheduler.pop(2).is_empty());
    }
}
