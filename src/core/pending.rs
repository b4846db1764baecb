//! Bounded record of the tasks a light has in flight.

use std::collections::VecDeque;

use super::scheduler::TaskHandle;
use crate::common::constants::PENDING_QUEUE_CAPACITY;

/// Fixed-capacity FIFO of task handles.
///
/// Pushing onto a full queue forgets the oldest handle. The forgotten task
/// stays scheduled; it just can no longer be cancelled through this queue.
#[derive(Debug, Clone)]
pub struct PendingQueue {
    handles: VecDeque<TaskHandle>,
    capacity: usize,
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::with_capacity(PENDING_QUEUE_CAPACITY)
    }
}

impl PendingQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            handles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Track `handle`, returning the evicted oldest handle when full.
    pub fn push(&mut self, handle: TaskHandle) -> Option<TaskHandle> {
        let evicted = if self.handles.len() >= self.capacity {
            self.handles.pop_front()
        } else {
            None
        };
        self.handles.push_back(handle);
        evicted
    }

    /// Stop tracking a handle (after it fired). Returns whether it was tracked.
    pub fn remove(&mut self, handle: TaskHandle) -> bool {
        match self.handles.iter().position(|h| *h == handle) {
            Some(index) => {
                self.handles.remove(index);
                true
            }
            None => false,
        }
    }

    /// Take every handle, oldest first.
    pub fn drain(&mut self) -> Vec<TaskHandle> {
        self.handles.drain(..).collect()
    }

    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LightCommand;
    use crate::core::scheduler::{ScheduledTask, Scheduler, TaskAction, TimerQueue};
    use crate::time_source::RealTimeSource;
    use std::sync::Arc;

    fn handles(n: usize) -> Vec<TaskHandle> {
        let mut queue = TimerQueue::new(Arc::new(RealTimeSource));
        (0..n)
            .map(|_| {
                queue.run_later(ScheduledTask {
                    light: "light.a".into(),
                    action: TaskAction::Resend(LightCommand::new("light.a", 0.2)),
                })
            })
            .collect()
    }

    #[test]
    fn test_fourth_push_evicts_oldest() {
        let h = handles(4);
        let mut pending = PendingQueue::default();
        assert_eq!(pending.capacity(), 3);
        assert_eq!(pending.push(h[0]), None);
        assert_eq!(pending.push(h[1]), None);
        assert_eq!(pending.push(h[2]), None);
        assert_eq!(pending.push(h[3]), Some(h[0]));
        assert_eq!(pending.drain(), vec![h[1], h[2], h[3]]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_remove_fired_handle() {
        let h = handles(2);
        let mut pending = PendingQueue::default();
        pending.push(h[0]);
        pending.push(h[1]);
        assert!(pending.remove(h[0]));
        assert!(!pending.remove(h[0]));
        assert!(pending.contains(h[1]));
        assert_eq!(pending.len(), 1);
    }
}
