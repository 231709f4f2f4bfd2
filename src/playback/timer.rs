//! Single-occupancy timer slots
//!
//! A slot owns at most one spawned task. Scheduling aborts whatever the slot
//! held and issues a new ticket; a task that fires must [`claim`] its ticket
//! before acting, so a callback racing a cancel can never run stale.
//!
//! [`claim`]: TimerSlot::claim

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    task: Option<JoinHandle<()>>,
    ticket: u64,
}

impl TimerSlot {
    /// Run `callback(ticket)` once after `delay`, replacing any pending task
    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.schedule_at(Instant::now() + delay, callback);
    }

    /// Run `callback(ticket)` once at `deadline`, replacing any pending task
    pub fn schedule_at<F>(&mut self, deadline: Instant, callback: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let ticket = self.ticket;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback(ticket);
        }));
    }

    /// Call `tick(ticket)` every `period` until it breaks or the slot is
    /// cancelled. The first tick fires after one period.
    pub fn repeat<F>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
    {
        self.cancel();
        let ticket = self.ticket;
        self.task = Some(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick(ticket).is_break() {
                    break;
                }
            }
        }));
    }

    /// Abort the pending task and invalidate its ticket
    pub fn cancel(&mut self) {
        self.ticket = self.ticket.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether `ticket` still belongs to the live task
    pub fn is_current(&self, ticket: u64) -> bool {
        self.task.is_some() && self.ticket == ticket
    }

    /// Take ownership of the slot from inside the firing task.
    ///
    /// Returns false if the ticket is stale. On success the slot is empty,
    /// so rescheduling or cancelling does not abort the caller.
    pub fn claim(&mut self, ticket: u64) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.task = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::default();

        let counter = Arc::clone(&fired);
        slot.schedule(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(slot.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!slot.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_task() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut slot = TimerSlot::default();

        for label in ["first", "second"] {
            let log = Arc::clone(&fired);
            slot.schedule(Duration::from_millis(100), move |_| {
                log.lock().unwrap().push(label);
            });
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::default();

        let counter = Arc::clone(&fired);
        slot.schedule(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        slot.cancel();
        assert!(!slot.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_rejects_stale_ticket() {
        let shared = Arc::new(Mutex::new(TimerSlot::default()));
        let claimed = Arc::new(Mutex::new(Vec::new()));

        {
            let mut slot = shared.lock().unwrap();
            let (slot_ref, log) = (Arc::clone(&shared), Arc::clone(&claimed));
            slot.schedule(Duration::from_millis(50), move |ticket| {
                let ok = slot_ref.lock().unwrap().claim(ticket);
                log.lock().unwrap().push(ok);
            });
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*claimed.lock().unwrap(), vec![true]);

        let mut slot = shared.lock().unwrap();
        slot.schedule(Duration::from_secs(60), |_| {});
        let stale = 0;
        assert!(!slot.claim(stale));
        assert!(slot.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_until_break() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::default();

        let counter = Arc::clone(&ticks);
        slot.repeat(Duration::from_millis(16), move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(!slot.is_pending());
    }
}
