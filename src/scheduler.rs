use std::fmt;

use crate::dom::NodeId;
use crate::error::{Error, Result};
use crate::page::Page;

/// Handle returned for every scheduled task; pass it to [`Page::clear_timer`] to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) i64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deferred work the page can queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Starts the fade-out transition of a flash message.
    FadeFlash(NodeId),
    /// Removes a flash message from the document.
    RemoveFlash(NodeId),
}

impl TimerTask {
    pub fn target(self) -> NodeId {
        match self {
            Self::FadeFlash(node) | Self::RemoveFlash(node) => node,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FadeFlash(_) => "fade_flash",
            Self::RemoveFlash(_) => "remove_flash",
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TimerId,
    due_at: i64,
    order: i64,
    task: TimerTask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub due_at: i64,
    pub order: i64,
    pub task: TimerTask,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    pub(crate) now_ms: i64,
    task_queue: Vec<ScheduledTask>,
    next_timer_id: i64,
    next_task_order: i64,
    step_limit: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            now_ms: 0,
            task_queue: Vec::new(),
            next_timer_id: 1,
            next_task_order: 0,
            step_limit: 10_000,
        }
    }
}

impl Scheduler {
    fn push(&mut self, delay_ms: i64, task: TimerTask) -> ScheduledTask {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let scheduled = ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms.max(0)),
            order,
            task,
        };
        self.task_queue.push(scheduled.clone());
        scheduled
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != id);
        self.task_queue.len() != before
    }

    fn cancel_where(&mut self, mut predicate: impl FnMut(&TimerTask) -> bool) -> Vec<TimerId> {
        let mut canceled = Vec::new();
        self.task_queue.retain(|task| {
            if predicate(&task.task) {
                canceled.push(task.id);
                false
            } else {
                true
            }
        });
        canceled
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn describe_next(&self, due_limit: Option<i64>) -> String {
        self.next_task_index(due_limit)
            .and_then(|idx| self.task_queue.get(idx))
            .map(|task| {
                format!(
                    "id={},due_at={},order={},task={}",
                    task.id,
                    task.due_at,
                    task.order,
                    task.task.label()
                )
            })
            .unwrap_or_else(|| "none".into())
    }
}

impl Page {
    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Runtime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.scheduler.step_limit = max_steps;
        Ok(())
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .scheduler
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                task: task.task,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn clear_timer(&mut self, timer_id: TimerId) -> bool {
        let existed = self.scheduler.cancel(timer_id);
        if existed {
            self.trace_timer_line(format!("[timer] clear id={timer_id}"));
        }
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.scheduler.task_queue.len();
        self.scheduler.task_queue.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let target = self.scheduler.now_ms.saturating_add(delta_ms);
        let from = self.scheduler.now_ms;
        let ran = self.run_timers_until(target)?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={} ran_due={ran}",
            self.scheduler.now_ms
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        let ran = self.run_timers_until(target_ms)?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={from} to={} ran_due={ran}",
            self.scheduler.now_ms
        ));
        Ok(())
    }

    /// Runs every queued task, moving the clock forward as needed.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms;
        let ran = self.run_timer_queue(None)?;
        self.trace_timer_line(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.scheduler.now_ms
        ));
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms))?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={ran}",
            self.scheduler.now_ms
        ));
        Ok(ran)
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.scheduler.next_task_index(None) else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };
        let task = self.scheduler.task_queue.remove(next_idx);
        if task.due_at > self.scheduler.now_ms {
            self.scheduler.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, task: TimerTask) -> TimerId {
        let scheduled = self.scheduler.push(delay_ms, task);
        let target = self.trace_node_label(task.target());
        self.trace_timer_line(format!(
            "[timer] schedule id={} task={} target={target} due_at={}",
            scheduled.id,
            task.label(),
            scheduled.due_at
        ));
        scheduled.id
    }

    /// Cancels every task aimed at `node` or anything inside it.
    pub(crate) fn cancel_timers_within(&mut self, node: NodeId) -> Vec<TimerId> {
        let dom = &self.dom;
        let canceled = self.scheduler.cancel_where(|task| {
            let target = task.target();
            target == node || dom.is_descendant_of(target, node)
        });
        for id in &canceled {
            self.trace_timer_line(format!("[timer] cancel id={id} reason=target_removed"));
        }
        canceled
    }

    // Walks the clock to each due task in turn so tasks see their own due time.
    fn run_timers_until(&mut self, target_ms: i64) -> Result<usize> {
        let ran = self.run_timer_queue(Some(target_ms))?;
        self.scheduler.now_ms = self.scheduler.now_ms.max(target_ms);
        Ok(ran)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.scheduler.next_task_index(due_limit) {
            steps += 1;
            if steps > self.scheduler.step_limit {
                return Err(self.timer_step_limit_error(steps, due_limit));
            }
            let task = self.scheduler.task_queue.remove(next_idx);
            if task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn timer_step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        Error::Runtime(format!(
            "timer queue exceeded max task steps: limit={}, steps={steps}, now_ms={}, due_limit={due_limit_desc}, pending_tasks={}, next_task={}",
            self.scheduler.step_limit,
            self.scheduler.now_ms,
            self.scheduler.task_queue.len(),
            self.scheduler.describe_next(due_limit)
        ))
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        let target = task.task.target();
        if !self.dom.is_connected(target) {
            self.trace_timer_line(format!(
                "[timer] skip id={} task={} reason=target_detached now_ms={}",
                task.id,
                task.task.label(),
                self.scheduler.now_ms
            ));
            return Ok(());
        }

        self.trace_timer_line(format!(
            "[timer] run id={} task={} due_at={} now_ms={}",
            task.id,
            task.task.label(),
            task.due_at,
            self.scheduler.now_ms
        ));
        crate::controls::flash::run_flash_task(self, task.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_task_orders_by_due_time_then_insertion() {
        let mut scheduler = Scheduler::default();
        let late = scheduler.push(300, TimerTask::RemoveFlash(NodeId(1)));
        let early = scheduler.push(100, TimerTask::FadeFlash(NodeId(2)));
        let tie = scheduler.push(100, TimerTask::FadeFlash(NodeId(3)));

        let idx = scheduler.next_task_index(None).expect("queue is not empty");
        assert_eq!(scheduler.task_queue[idx].id, early.id);
        scheduler.task_queue.remove(idx);
        let idx = scheduler.next_task_index(None).expect("queue is not empty");
        assert_eq!(scheduler.task_queue[idx].id, tie.id);
        assert!(scheduler.next_task_index(Some(99)).is_none());
        assert_eq!(late.due_at, 300);
    }

    #[test]
    fn negative_delay_is_treated_as_zero() {
        let mut scheduler = Scheduler {
            now_ms: 40,
            ..Scheduler::default()
        };
        let task = scheduler.push(-5, TimerTask::RemoveFlash(NodeId(1)));
        assert_eq!(task.due_at, 40);
    }

    #[test]
    fn cancel_where_returns_removed_ids() {
        let mut scheduler = Scheduler::default();
        let a = scheduler.push(10, TimerTask::FadeFlash(NodeId(7)));
        let b = scheduler.push(10, TimerTask::RemoveFlash(NodeId(7)));
        let c = scheduler.push(10, TimerTask::RemoveFlash(NodeId(8)));
        let canceled = scheduler.cancel_where(|task| task.target() == NodeId(7));
        assert_eq!(canceled, vec![a.id, b.id]);
        assert!(!scheduler.cancel(a.id));
        assert!(scheduler.cancel(c.id));
        assert_eq!(scheduler.describe_next(None), "none");
    }
}
