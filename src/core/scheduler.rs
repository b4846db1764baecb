//! Delayed task scheduling.
//!
//! Controllers schedule their follow-up actions through the [`Scheduler`]
//! trait and keep the returned [`TaskHandle`]s so they can cancel them.
//! [`TimerQueue`] is the implementation the event loop drives: a min-heap of
//! due instants with lazy cancellation, read against an injected
//! [`TimeSource`].

use chrono::{DateTime, Local};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use super::controller::TurnOnRequest;
use crate::backend::LightCommand;
use crate::common::utils;
use crate::time_source::TimeSource;

/// Identifies one scheduled task. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a task does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    /// Move the light to the next anchor's exact target.
    Commit(LightCommand),
    /// Re-enter `turn_on` at the next anchor boundary.
    Recompute(TurnOnRequest),
    /// Second send of a `turn_on_specific` command.
    Resend(LightCommand),
}

impl TaskAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Commit(_) => "commit",
            Self::Recompute(_) => "recompute",
            Self::Resend(_) => "resend",
        }
    }
}

/// A task addressed to one light.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub light: String,
    pub action: TaskAction,
}

/// Timed callbacks with cancellation.
pub trait Scheduler {
    /// Run `task` once `delay` has elapsed.
    fn after(&mut self, delay: StdDuration, task: ScheduledTask) -> TaskHandle;

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TaskHandle) -> bool;

    /// Run `task` on the next dispatch.
    fn run_later(&mut self, task: ScheduledTask) -> TaskHandle {
        self.after(StdDuration::ZERO, task)
    }
}

/// Heap-backed [`Scheduler`].
///
/// Tasks due at the same instant fire in scheduling order.
pub struct TimerQueue {
    clock: Arc<dyn TimeSource>,
    heap: BinaryHeap<Reverse<(DateTime<Local>, u64)>>,
    tasks: HashMap<u64, ScheduledTask>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            clock,
            heap: BinaryHeap::new(),
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: DateTime<Local>) -> Option<(TaskHandle, ScheduledTask)> {
        while let Some(Reverse((due, id))) = self.heap.peek().copied() {
            if !self.tasks.contains_key(&id) {
                self.heap.pop();
                continue;
            }
            if due > now {
                return None;
            }
            self.heap.pop();
            return self.tasks.remove(&id).map(|task| (TaskHandle(id), task));
        }
        None
    }

    /// Instant of the earliest live task.
    pub fn next_due(&mut self) -> Option<DateTime<Local>> {
        while let Some(Reverse((due, id))) = self.heap.peek().copied() {
            if self.tasks.contains_key(&id) {
                return Some(due);
            }
            self.heap.pop();
        }
        None
    }

    /// Number of live (scheduled, not fired, not cancelled) tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(&handle.0)
    }

    /// Live tasks addressed to `light`.
    pub fn tasks_for<'a>(&'a self, light: &'a str) -> impl Iterator<Item = &'a ScheduledTask> + 'a {
        self.tasks.values().filter(move |task| task.light == light)
    }
}

impl Scheduler for TimerQueue {
    fn after(&mut self, delay: StdDuration, task: ScheduledTask) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due = utils::add_std(self.clock.now(), delay);
        self.heap.push(Reverse((due, id)));
        self.tasks.insert(id, task);
        TaskHandle(id)
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.tasks.remove(&handle.0).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::{SimulatedTimeSource, parse_datetime};

    fn clock() -> Arc<SimulatedTimeSource> {
        Arc::new(SimulatedTimeSource::fast_forward(
            parse_datetime("2024-06-15 12:00:00").unwrap(),
            parse_datetime("2024-06-16 12:00:00").unwrap(),
        ))
    }

    fn resend(light: &str) -> ScheduledTask {
        ScheduledTask {
            light: light.to_string(),
            action: TaskAction::Resend(LightCommand::new(light, 0.2)),
        }
    }

    #[test]
    fn test_tasks_fire_in_due_order() {
        let clock = clock();
        let mut queue = TimerQueue::new(clock.clone());
        let late = queue.after(StdDuration::from_secs(10), resend("light.a"));
        let early = queue.after(StdDuration::from_secs(1), resend("light.b"));

        assert!(queue.pop_due(clock.now()).is_none());
        clock.advance(StdDuration::from_secs(10));

        let (first, task) = queue.pop_due(clock.now()).unwrap();
        assert_eq!(first, early);
        assert_eq!(task.light, "light.b");
        assert_eq!(queue.pop_due(clock.now()).unwrap().0, late);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_same_instant_keeps_scheduling_order() {
        let clock = clock();
        let mut queue = TimerQueue::new(clock.clone());
        let a = queue.run_later(resend("light.a"));
        let b = queue.run_later(resend("light.b"));
        assert_eq!(queue.pop_due(clock.now()).unwrap().0, a);
        assert_eq!(queue.pop_due(clock.now()).unwrap().0, b);
    }

    #[test]
    fn test_cancel_is_lazy_and_idempotent() {
        let clock = clock();
        let mut queue = TimerQueue::new(clock.clone());
        let a = queue.after(StdDuration::from_secs(1), resend("light.a"));
        let b = queue.after(StdDuration::from_secs(2), resend("light.a"));

        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.next_due(),
            Some(clock.now() + chrono::Duration::seconds(2))
        );

        clock.advance(StdDuration::from_secs(5));
        assert_eq!(queue.pop_due(clock.now()).unwrap().0, b);
        // Cancelling a task that already fired is a no-op
        assert!(!queue.cancel(b));
    }
}
