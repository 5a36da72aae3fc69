// Virtual-time timer queue. Nothing here sleeps; a driver (see runtime.rs, or a test)
// moves the clock forward and every task whose deadline has passed runs in order.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

pub type Job<S> = Box<dyn FnOnce(&mut S, &mut Scheduler<S>) + Send>;
pub type RepeatingJob<S> = Box<dyn FnMut(&mut S, &mut Scheduler<S>) + Send>;

// A repeating task never fires more often than this, a zero period would spin forever
const MIN_PERIOD: Duration = Duration::from_millis(1);

enum Task<S> {
    Once(Job<S>),
    Every {
        period: Duration,
        job: RepeatingJob<S>,
        cancel: CancellationToken,
    },
}

impl<S> Task<S> {
    fn is_cancelled(&self) -> bool {
        match self {
            Task::Once(_) => false,
            Task::Every { cancel, .. } => cancel.is_cancelled(),
        }
    }
}

/// Timer queue over some owned state `S`.
///
/// Ordering: an earlier deadline always fires first, equal deadlines fire in the
/// order they were scheduled. A task scheduled with zero delay runs on the next
/// advance, never synchronously.
pub struct Scheduler<S> {
    now: Duration,
    next_seq: u64,
    timers: BTreeMap<(Duration, u64), Task<S>>,
}

impl<S> Scheduler<S> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            timers: BTreeMap::new(),
        }
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_after<F>(&mut self, delay: Duration, job: F)
    where
        F: FnOnce(&mut S, &mut Scheduler<S>) + Send + 'static,
    {
        let due = self.now + delay;
        self.insert(due, Task::Once(Box::new(job)));
    }

    /// Fires every `period`, first at `now + period`. Cancel the returned token to stop it.
    pub fn schedule_repeating<F>(&mut self, period: Duration, job: F) -> CancellationToken
    where
        F: FnMut(&mut S, &mut Scheduler<S>) + Send + 'static,
    {
        self.schedule_repeating_with(period, CancellationToken::new(), job)
    }

    /// Same as `schedule_repeating` but stops when the given token (or a parent of it) is cancelled.
    pub fn schedule_repeating_with<F>(
        &mut self,
        period: Duration,
        cancel: CancellationToken,
        job: F,
    ) -> CancellationToken
    where
        F: FnMut(&mut S, &mut Scheduler<S>) + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let due = self.now + period;
        self.insert(
            due,
            Task::Every {
                period,
                job: Box::new(job),
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    /// Deadline of the earliest live task, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers
            .iter()
            .find(|(_, task)| !task.is_cancelled())
            .map(|((due, _), _)| *due)
    }

    /// Number of live tasks still queued.
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|task| !task.is_cancelled()).count()
    }

    pub fn advance(&mut self, state: &mut S, by: Duration) -> usize {
        let target = self.now + by;
        self.advance_to(state, target)
    }

    /// Runs every task due at or before `target`, including tasks those tasks schedule.
    /// Returns how many tasks fired. Moving backwards is a no-op.
    pub fn advance_to(&mut self, state: &mut S, target: Duration) -> usize {
        let mut fired = 0;

        while let Some(entry) = self.timers.first_entry() {
            if entry.key().0 > target {
                break;
            }

            let ((due, _), task) = entry.remove_entry();
            self.now = self.now.max(due);

            match task {
                Task::Once(job) => {
                    job(state, self);
                    fired += 1;
                }
                Task::Every { period, mut job, cancel } => {
                    if cancel.is_cancelled() {
                        trace!("Dropping cancelled repeating task at {:?}", due);
                        continue;
                    }
                    job(state, self);
                    fired += 1;

                    // the job may have cancelled itself
                    if !cancel.is_cancelled() {
                        self.insert(due + period, Task::Every { period, job, cancel });
                    }
                }
            }
        }

        self.now = self.now.max(target);
        fired
    }

    /// Runs whatever is already due without moving the clock.
    pub fn run_due(&mut self, state: &mut S) -> usize {
        let now = self.now;
        self.advance_to(state, now)
    }

    fn insert(&mut self, due: Duration, task: Task<S>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert((due, seq), task);
    }
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn earlier_deadline_fires_first() {
        let mut sched: Scheduler<Vec<&str>> = Scheduler::new();
        let mut out = Vec::new();

        sched.schedule_after(ms(200), |v, _| v.push("late"));
        sched.schedule_after(ms(100), |v, _| v.push("early"));

        assert_eq!(sched.advance(&mut out, ms(250)), 2);
        assert_eq!(out, vec!["early", "late"]);
    }

    #[test]
    fn equal_deadlines_keep_scheduling_order() {
        let mut sched: Scheduler<Vec<u32>> = Scheduler::new();
        let mut out = Vec::new();

        for i in 0..5 {
            sched.schedule_after(ms(50), move |v, _| v.push(i));
        }
        sched.advance(&mut out, ms(50));

        assert_eq!(out, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_delay_waits_for_next_advance() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        let mut hits = 0;

        sched.schedule_after(Duration::ZERO, |n, _| *n += 1);
        assert_eq!(hits, 0);

        assert_eq!(sched.run_due(&mut hits), 1);
        assert_eq!(hits, 1);
        assert_eq!(sched.now(), Duration::ZERO);
    }

    #[test]
    fn nested_tasks_run_within_same_advance() {
        let mut sched: Scheduler<Vec<Duration>> = Scheduler::new();
        let mut seen = Vec::new();

        sched.schedule_after(ms(100), |v, s| {
            v.push(s.now());
            s.schedule_after(ms(100), |v, s| v.push(s.now()));
        });

        sched.advance(&mut seen, ms(500));
        assert_eq!(seen, vec![ms(100), ms(200)]);
        assert_eq!(sched.now(), ms(500));
    }

    #[test]
    fn repeating_stops_after_cancel() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        let mut ticks = 0;

        let token = sched.schedule_repeating(ms(100), |n, _| *n += 1);
        sched.advance(&mut ticks, ms(350));
        assert_eq!(ticks, 3);

        token.cancel();
        assert_eq!(sched.next_due(), None);
        sched.advance(&mut ticks, ms(1000));
        assert_eq!(ticks, 3);
    }

    #[test]
    fn parent_token_cancels_repeating_child() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        let mut ticks = 0;
        let root = CancellationToken::new();

        sched.schedule_repeating_with(ms(10), root.child_token(), |n, _| *n += 1);
        sched.advance(&mut ticks, ms(30));
        root.cancel();
        sched.advance(&mut ticks, ms(30));

        assert_eq!(ticks, 3);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn cancel_does_not_touch_one_shots() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        let mut hits = 0;

        let token = sched.schedule_repeating(ms(100), |n, _| *n += 10);
        sched.schedule_after(ms(300), |n, _| *n += 1);
        token.cancel();

        sched.advance(&mut hits, ms(400));
        assert_eq!(hits, 1);
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        let mut ticks = 0;

        sched.schedule_repeating(Duration::ZERO, |n, _| *n += 1);
        sched.advance(&mut ticks, ms(5));
        assert_eq!(ticks, 5);
    }
}
