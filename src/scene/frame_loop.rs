use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Fixed-rate ticker owned by a view. Dropping the guard cancels the task, so
/// a torn-down view never leaves a loop behind and a remount starts a fresh one.
pub struct FrameLoop {
    handle: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl FrameLoop {
    pub fn start<F>(runtime: &Handle, interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let handle = runtime.spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
                on_tick();
            }
        });
        debug!(?interval, "frame loop started");
        Self { handle, ticks }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(ticks = self.ticks(), "frame loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::FrameLoop;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Handle;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn ticks_until_dropped() {
        let observed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&observed);
        let frame_loop = FrameLoop::start(&Handle::current(), Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(frame_loop.is_running());
        assert!(frame_loop.ticks() > 0);

        drop(frame_loop);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_drop = observed.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(observed.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn remount_runs_a_single_fresh_loop() {
        let observed = Arc::new(AtomicU64::new(0));

        let first_counter = Arc::clone(&observed);
        let first = FrameLoop::start(&Handle::current(), Duration::from_millis(5), move || {
            first_counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(first);

        let second_ticks = Arc::new(AtomicU64::new(0));
        let second_counter = Arc::clone(&second_ticks);
        let second = FrameLoop::start(&Handle::current(), Duration::from_millis(5), move || {
            second_counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let first_total = observed.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(observed.load(Ordering::SeqCst), first_total);
        assert!(second_ticks.load(Ordering::SeqCst) > 0);
        assert!(second.is_running());
    }
}
