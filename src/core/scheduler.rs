//! Cooperative task scheduler on a simulated millisecond clock.
//!
//! Three primitives drive every combat mode:
//! - `every`: fixed-delay repeating tasks (strike ticks, skill ticks, countdowns)
//! - `after`: one-shot delayed tasks (cinematic steps, result presentation)
//! - `every_frame`: per-frame callbacks at [`FRAME_MS`] (physics)
//!
//! Tasks are plain tags. The owner pops one due task at a time and dispatches
//! it before popping the next, so a callback that cancels a handle guarantees
//! that handle never fires again, even if it was due in the same instant.

use crate::core::constants::FRAME_MS;

/// Handle to a scheduled task. Cancelling a stale handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    Once,
    Repeating(u64),
}

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    due_ms: u64,
    cadence: Cadence,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Current simulated time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a repeating task. First fire is one interval from now.
    pub fn every(&mut self, interval_ms: u64, task: T) -> TaskHandle {
        let interval_ms = interval_ms.max(1);
        self.push(interval_ms, Cadence::Repeating(interval_ms), task)
    }

    /// Schedule a one-shot task.
    pub fn after(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        self.push(delay_ms, Cadence::Once, task)
    }

    /// Schedule a task on every display frame.
    pub fn every_frame(&mut self, task: T) -> TaskHandle {
        self.every(FRAME_MS, task)
    }

    /// Cancel a task. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    /// Number of live tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Advance the clock without firing anything (used when nothing is due).
    pub fn advance_to(&mut self, until_ms: u64) {
        if until_ms > self.now_ms {
            self.now_ms = until_ms;
        }
    }

    fn push(&mut self, delay_ms: u64, cadence: Cadence, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            handle,
            due_ms: self.now_ms.saturating_add(delay_ms),
            cadence,
            task,
        });
        handle
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the earliest task due at or before `until_ms`.
    ///
    /// Moves the clock to the task's due time. Repeating tasks are rescheduled
    /// one interval later; one-shot tasks are removed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TaskHandle, T)> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle.0))
            .map(|(i, _)| i)?;

        let due_ms = self.tasks[index].due_ms;
        if due_ms > self.now_ms {
            self.now_ms = due_ms;
        }

        match self.tasks[index].cadence {
            Cadence::Repeating(interval) => {
                let scheduled = &mut self.tasks[index];
                let next_due = scheduled.due_ms.saturating_add(interval);
                if next_due == scheduled.due_ms {
                    // Pinned at the end of the clock; it can never fire again
                    let removed = self.tasks.remove(index);
                    return Some((removed.handle, removed.task));
                }
                scheduled.due_ms = next_due;
                Some((scheduled.handle, scheduled.task.clone()))
            }
            Cadence::Once => {
                let removed = self.tasks.remove(index);
                Some((removed.handle, removed.task))
            }
        }
    }
}
