//! A fixed-size worker pool executing immediate and delayed closures.
//!
//! Workers pull from a shared `crossbeam_channel` queue (plain FIFO, no
//! work-stealing); a dedicated timer thread owns a deadline-ordered min-heap
//! and moves delayed jobs onto the immediate queue once they come due.
//! `count()` is a single atomic counter bumped on every submission and
//! dropped when a job finishes, so it stays consistent without having to
//! reconcile three separate queues.

mod job;

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::Config;
use crate::error::{panic_message, Error};
use job::{BoxedJob, DelayedJob};

struct Inner {
    job_tx: Mutex<Option<crossbeam_channel::Sender<BoxedJob>>>,
    pending: AtomicUsize,
    delayed: Mutex<BinaryHeap<DelayedJob>>,
    delayed_cv: Condvar,
    seq: AtomicU64,
    stopped: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// A cheaply-cloneable handle to a worker pool. Cloning shares the same
/// queues and worker threads; the threads are joined when the last handle
/// (and every job it could still schedule) is dropped.
#[derive(Clone)]
pub struct Scheduler(Arc<Inner>);

impl Scheduler {
    /// Builds a pool with `threads_count` OS-thread workers. Zero threads is
    /// rejected synchronously: unrecoverable construction errors fail at
    /// construction, not lazily on first `schedule`.
    pub fn new(threads_count: usize) -> Result<Scheduler, Error> {
        if threads_count == 0 {
            return Err(Error::InvalidArgument(
                "threads_count must be at least 1".into(),
            ));
        }

        let (tx, rx) = crossbeam_channel::unbounded::<BoxedJob>();
        let inner = Arc::new(Inner {
            job_tx: Mutex::new(Some(tx)),
            pending: AtomicUsize::new(0),
            delayed: Mutex::new(BinaryHeap::new()),
            delayed_cv: Condvar::new(),
            seq: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
            workers: Mutex::new(Vec::with_capacity(threads_count)),
            timer: Mutex::new(None),
        });

        for idx in 0..threads_count {
            let rx = rx.clone();
            let inner = inner.clone();
            let handle = thread::Builder::new()
                .name(format!("porter-worker-{idx}"))
                .spawn(move || worker_loop(inner, rx))
                .expect("failed to spawn scheduler worker thread");
            inner.workers.lock().push(handle);
        }

        {
            let inner = inner.clone();
            let handle = thread::Builder::new()
                .name("porter-timer".into())
                .spawn(move || timer_loop(inner))
                .expect("failed to spawn scheduler timer thread");
            inner.timer.lock().replace(handle);
        }

        Ok(Scheduler(inner))
    }

    /// Builds a pool sized from `cfg.scheduler.pool_size`, and installs the
    /// crate's logging backend the same way the teacher's `ActorSystem::create`
    /// wires its logger as part of system construction rather than leaving it
    /// to every caller.
    pub fn from_config(cfg: &Config) -> Result<Scheduler, Error> {
        crate::logging::init_logging(&cfg.log);
        Scheduler::new(cfg.scheduler.pool_size.max(1))
    }

    /// Enqueues a nullary closure. No ordering guarantee across producers;
    /// FIFO for jobs submitted from a single thread.
    pub fn schedule<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let job = wrap(f);
        let guard = self.0.job_tx.lock();
        match guard.as_ref() {
            Some(tx) => {
                self.0.pending.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(job);
            }
            None => log::warn!("scheduler is stopped; dropping a scheduled job"),
        }
    }

    /// Enqueues a closure to become runnable no earlier than
    /// `now + delay_seconds`. Ties among due jobs break in submission order.
    pub fn schedule_delayed<F>(&self, delay_seconds: f64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let job = wrap(f);
        let delay = Duration::from_secs_f64(delay_seconds.max(0.0));
        let deadline = Instant::now() + delay;
        let seq = self.0.seq.fetch_add(1, Ordering::SeqCst);

        {
            let guard = self.0.job_tx.lock();
            if guard.is_none() {
                log::warn!("scheduler is stopped; dropping a delayed job");
                return;
            }
            self.0.pending.fetch_add(1, Ordering::SeqCst);
        }

        self.0.delayed.lock().push(DelayedJob { deadline, seq, job });
        self.0.delayed_cv.notify_all();
    }

    /// Outstanding work: jobs queued, running, or delayed and not yet due.
    pub fn count(&self) -> usize {
        self.0.pending.load(Ordering::SeqCst)
    }

    /// Initiates a drain: no further jobs are accepted, workers finish what
    /// they have queued and then exit. Idempotent.
    pub fn stop(&self) {
        if self.0.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.0.job_tx.lock().take();
        self.0.delayed_cv.notify_all();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.job_tx.lock().take();
        self.delayed_cv.notify_all();
        for handle in self.workers.lock().drain(..) {
            let _ = handle.join();
        }
        if let Some(handle) = self.timer.lock().take() {
            let _ = handle.join();
        }
    }
}

fn wrap<F>(f: F) -> BoxedJob
where
    F: FnOnce() + Send + 'static,
{
    Box::new(move || {
        if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
            log::error!("scheduled job panicked: {}", panic_message(payload));
        }
    })
}

fn worker_loop(inner: Arc<Inner>, rx: crossbeam_channel::Receiver<BoxedJob>) {
    for job in rx.iter() {
        job();
        inner.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

fn timer_loop(inner: Arc<Inner>) {
    loop {
        let mut heap = inner.delayed.lock();
        if inner.stopped.load(Ordering::SeqCst) {
            return;
        }
        match heap.peek() {
            None => {
                inner.delayed_cv.wait(&mut heap);
            }
            Some(top) => {
                let now = Instant::now();
                if top.deadline <= now {
                    let due = heap.pop().expect("heap non-empty");
                    drop(heap);
                    let guard = inner.job_tx.lock();
                    match guard.as_ref() {
                        Some(tx) => {
                            let _ = tx.send(due.job);
                        }
                        None => {
                            inner.pending.fetch_sub(1, Ordering::SeqCst);
                        }
                    }
                } else {
                    let wait = top.deadline - now;
                    inner.delayed_cv.wait_for(&mut heap, wait);
                }
            }
        }
    }
}
