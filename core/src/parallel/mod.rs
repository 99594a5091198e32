//! Parallel Loops

mod progress;

// Re-export
pub use progress::*;

use crossbeam_channel::{bounded, RecvTimeoutError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Default number of processed indices between progress reports.
pub const DEFAULT_PROGRESS_UPDATE_INTERVAL: u64 = 1000;

/// How a parallel loop decides when it is done.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParallelMode {
    /// Process exactly `num_samples` indices.
    Samples,

    /// Keep processing `grain_size` chunks until `duration` elapses.
    Time,
}

/// Parameters for `Parallel::for_each_params()`.
#[derive(Copy, Clone, Debug)]
pub struct ParallelForParams {
    /// Loop mode.
    pub mode: ParallelMode,

    /// Number of indices in `Samples` mode.
    pub num_samples: u64,

    /// Time budget in `Time` mode.
    pub duration: Duration,

    /// Number of indices a worker takes at once in `Time` mode.
    pub grain_size: u64,
}

impl ParallelForParams {
    /// Returns parameters for processing `[0, num_samples)`.
    ///
    /// * `num_samples` - Number of indices.
    pub fn samples(num_samples: u64) -> Self {
        Self {
            mode: ParallelMode::Samples,
            num_samples,
            duration: Duration::ZERO,
            grain_size: 1,
        }
    }

    /// Returns parameters for a time bounded loop.
    ///
    /// * `duration`   - Time budget.
    /// * `grain_size` - Indices taken per chunk.
    pub fn time(duration: Duration, grain_size: u64) -> Self {
        Self {
            mode: ParallelMode::Time,
            num_samples: 0,
            duration,
            grain_size,
        }
    }
}

/// A fixed size pool of scoped worker threads. Configure it and pass it to
/// whatever needs to run a parallel loop; there is no global state.
#[derive(Clone, Debug)]
pub struct Parallel {
    num_threads: usize,
    show_progress: bool,
    progress_update_interval: u64,
}

impl Default for Parallel {
    /// Returns a pool using every hardware thread with progress output
    /// disabled.
    fn default() -> Self {
        Self::new(0)
    }
}

impl Parallel {
    /// Create a new pool.
    ///
    /// * `num_threads` - Thread count; see `set_num_threads()`.
    pub fn new(num_threads: i32) -> Self {
        Self {
            num_threads: resolve_num_threads(num_threads),
            show_progress: false,
            progress_update_interval: DEFAULT_PROGRESS_UPDATE_INTERVAL,
        }
    }

    /// Set the number of threads used by subsequent loops. Values `<= 0` are
    /// added to the hardware concurrency, so `0` uses every core and `-1`
    /// leaves one free. At least one thread is always used.
    ///
    /// * `num_threads` - Thread count.
    pub fn set_num_threads(&mut self, num_threads: i32) {
        self.num_threads = resolve_num_threads(num_threads);
    }

    /// Returns the configured number of threads.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Enable or disable the progress bar.
    ///
    /// * `show` - Whether to draw progress.
    pub fn set_show_progress(&mut self, show: bool) {
        self.show_progress = show;
    }

    /// Set how many indices a worker processes between progress reports.
    ///
    /// * `interval` - Number of indices.
    pub fn set_progress_update_interval(&mut self, interval: u64) {
        self.progress_update_interval = interval.max(1);
    }

    /// Returns the number of threads a `Samples` loop over `num_samples`
    /// indices spawns.
    ///
    /// * `num_samples` - Number of indices.
    pub fn active_threads(&self, num_samples: u64) -> usize {
        (self.num_threads as u64).min(num_samples) as usize
    }

    /// Process `[0, num_samples)` in parallel and block until done.
    ///
    /// Thread `t` of `T` receives the contiguous block
    /// `[t * n / T, (t + 1) * n / T)` in increasing order. No more threads
    /// than indices are spawned, so every thread gets at least one index and
    /// `init` is true exactly on each thread's first call.
    ///
    /// A panic in `f` stops the remaining workers at their next index and is
    /// re-raised on the calling thread once every worker has been joined.
    ///
    /// * `num_samples` - Number of indices.
    /// * `f`           - Called with `(index, thread_id, init)`.
    pub fn for_each<F>(&self, num_samples: u64, f: F)
    where
        F: Fn(u64, usize, bool) + Sync,
    {
        self.for_each_params(&ParallelForParams::samples(num_samples), f);
    }

    /// Same as `for_each()` but also supports `Time` mode. Returns the number
    /// of indices processed.
    ///
    /// * `params` - Loop parameters.
    /// * `f`      - Called with `(index, thread_id, init)`.
    pub fn for_each_params<F>(&self, params: &ParallelForParams, f: F) -> u64
    where
        F: Fn(u64, usize, bool) + Sync,
    {
        let (_, processed) =
            self.for_each_with(params, |_| (), |_, index, thread_id, init| f(index, thread_id, init));
        processed
    }

    /// Parallel loop with per-thread state. `make_state` runs on the calling
    /// thread for thread ids `0, 1, ...` in order before any worker starts, so
    /// state seeded from a shared source is deterministic. The states are
    /// returned in thread order together with the processed index count.
    ///
    /// * `params`     - Loop parameters.
    /// * `make_state` - Creates the state for a thread id.
    /// * `f`          - Called with `(state, index, thread_id, init)`.
    pub fn for_each_with<S, I, F>(
        &self,
        params: &ParallelForParams,
        mut make_state: I,
        f: F,
    ) -> (Vec<S>, u64)
    where
        S: Send,
        I: FnMut(usize) -> S,
        F: Fn(&mut S, u64, usize, bool) + Sync,
    {
        let num_threads = match params.mode {
            ParallelMode::Samples => self.active_threads(params.num_samples),
            ParallelMode::Time => self.num_threads,
        };
        if num_threads == 0 {
            return (vec![], 0);
        }

        let states: Vec<S> = (0..num_threads).map(&mut make_state).collect();

        let total = match params.mode {
            ParallelMode::Samples => params.num_samples,
            ParallelMode::Time => params.duration.as_millis() as u64,
        };
        let progress = create_progress_bar(total, self.show_progress);

        let abort = AtomicBool::new(false);
        let first_panic: Mutex<Option<Box<dyn Any + Send>>> = Mutex::new(None);
        let next_chunk = AtomicU64::new(0);
        let grain_size = params.grain_size.max(1);
        let update_interval = self.progress_update_interval;
        let start = Instant::now();

        let results: Vec<Option<(S, u64)>> = thread::scope(|scope| {
            let (tx, rx) = bounded::<u64>(4 * num_threads);

            let handles: Vec<_> = states
                .into_iter()
                .enumerate()
                .map(|(thread_id, mut state)| {
                    let tx = tx.clone();
                    let f = &f;
                    let abort = &abort;
                    let first_panic = &first_panic;
                    let next_chunk = &next_chunk;

                    scope.spawn(move || {
                        let mut processed = 0_u64;
                        let mut pending = 0_u64;
                        let mut process = |state: &mut S, index: u64, init: bool| {
                            f(state, index, thread_id, init);
                            processed += 1;
                            pending += 1;
                            if pending >= update_interval {
                                let _ = tx.send(pending);
                                pending = 0;
                            }
                        };

                        let result = panic::catch_unwind(AssertUnwindSafe(|| match params.mode {
                            ParallelMode::Samples => {
                                let (begin, end) =
                                    block_range(thread_id, num_threads, params.num_samples);
                                for index in begin..end {
                                    if abort.load(Ordering::Relaxed) {
                                        break;
                                    }
                                    process(&mut state, index, index == begin);
                                }
                            }
                            ParallelMode::Time => {
                                let mut init = true;
                                'chunks: while start.elapsed() < params.duration {
                                    let begin = next_chunk.fetch_add(grain_size, Ordering::Relaxed);
                                    for index in begin..begin + grain_size {
                                        if abort.load(Ordering::Relaxed) {
                                            break 'chunks;
                                        }
                                        process(&mut state, index, init);
                                        init = false;
                                    }
                                }
                            }
                        }));
                        drop(process);
                        if pending > 0 {
                            let _ = tx.send(pending);
                        }

                        match result {
                            Ok(()) => Some((state, processed)),
                            Err(payload) => {
                                abort.store(true, Ordering::Relaxed);
                                let mut slot =
                                    first_panic.lock().unwrap_or_else(|e| e.into_inner());
                                if slot.is_none() {
                                    *slot = Some(payload);
                                }
                                None
                            }
                        }
                    })
                })
                .collect();

            // Only the workers hold senders now; the channel disconnects once
            // they all finish.
            drop(tx);

            loop {
                match rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(count) => {
                        if params.mode == ParallelMode::Samples {
                            progress.inc(count);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                if params.mode == ParallelMode::Time {
                    progress.set_position((start.elapsed().as_millis() as u64).min(total));
                }
            }

            handles
                .into_iter()
                .map(|handle| handle.join().ok().flatten())
                .collect()
        });

        if let Some(payload) = first_panic.into_inner().unwrap_or_else(|e| e.into_inner()) {
            progress.abandon();
            panic::resume_unwind(payload);
        }
        progress.finish();

        let mut processed = 0;
        let states = results
            .into_iter()
            .flatten()
            .map(|(state, count)| {
                processed += count;
                state
            })
            .collect();
        debug!(
            "Parallel loop processed {} indices on {} threads in {:.3}s",
            processed,
            num_threads,
            start.elapsed().as_secs_f64()
        );
        (states, processed)
    }
}

/// Returns the thread count for a requested value.
///
/// * `num_threads` - Requested count; values `<= 0` are relative to the
///                   hardware concurrency.
fn resolve_num_threads(num_threads: i32) -> usize {
    if num_threads > 0 {
        num_threads as usize
    } else {
        (num_cpus::get() as i64 + num_threads as i64).max(1) as usize
    }
}

/// Returns the static block `[t * n / T, (t + 1) * n / T)` for thread `t`.
///
/// * `thread_id`   - Thread index `t`.
/// * `num_threads` - Number of threads `T`.
/// * `num_samples` - Number of indices `n`.
fn block_range(thread_id: usize, num_threads: usize, num_samples: u64) -> (u64, u64) {
    let at = |t: usize| (t as u128 * num_samples as u128 / num_threads as u128) as u64;
    (at(thread_id), at(thread_id + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn set_num_threads_is_relative_to_hardware() {
        let mut parallel = Parallel::new(3);
        assert_eq!(parallel.num_threads(), 3);
        parallel.set_num_threads(0);
        assert_eq!(parallel.num_threads(), num_cpus::get());
        parallel.set_num_threads(-100_000);
        assert_eq!(parallel.num_threads(), 1);
    }

    #[test]
    fn every_index_is_processed_once() {
        for &(threads, n) in &[(1, 17_u64), (4, 1000), (7, 1001), (8, 3)] {
            let parallel = Parallel::new(threads);
            let seen = Mutex::new(vec![]);
            parallel.for_each(n, |index, _, _| seen.lock().unwrap().push(index));

            let mut seen = seen.into_inner().unwrap();
            seen.sort_unstable();
            assert_eq!(seen, (0..n).collect::<Vec<u64>>(), "threads {threads} n {n}");
        }
    }

    #[test]
    fn blocks_are_contiguous_and_ordered() {
        let (threads, n) = (4, 1003);
        let parallel = Parallel::new(threads);
        let (states, processed) = parallel.for_each_with(
            &ParallelForParams::samples(n),
            |_| vec![],
            |seen: &mut Vec<u64>, index, _, _| seen.push(index),
        );
        assert_eq!(processed, n);
        assert_eq!(states.len(), threads as usize);
        for (t, seen) in states.iter().enumerate() {
            let (begin, end) = block_range(t, threads as usize, n);
            assert_eq!(*seen, (begin..end).collect::<Vec<u64>>());
        }
    }

    #[test]
    fn init_is_true_only_on_first_call_per_thread() {
        for &(threads, n) in &[(4, 1000_u64), (8, 3), (3, 3)] {
            let parallel = Parallel::new(threads);
            let calls: Mutex<BTreeMap<usize, Vec<bool>>> = Mutex::new(BTreeMap::new());
            parallel.for_each(n, |_, thread_id, init| {
                calls.lock().unwrap().entry(thread_id).or_default().push(init);
            });

            let calls = calls.into_inner().unwrap();
            assert_eq!(calls.len(), parallel.active_threads(n));
            for flags in calls.values() {
                assert!(flags[0]);
                assert!(flags[1..].iter().all(|init| !init));
            }
        }
    }

    #[test]
    fn zero_samples_is_a_noop() {
        let parallel = Parallel::new(4);
        let calls = AtomicU64::new(0);
        parallel.for_each(0, |_, _, _| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn states_are_created_in_thread_order() {
        let parallel = Parallel::new(5);
        let mut created = vec![];
        let (states, _) = parallel.for_each_with(
            &ParallelForParams::samples(100),
            |thread_id| {
                created.push(thread_id);
                thread_id
            },
            |_, _, _, _| {},
        );
        assert_eq!(created, vec![0, 1, 2, 3, 4]);
        assert_eq!(states, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn worker_panic_is_rethrown_after_join() {
        let parallel = Parallel::new(4);
        let after = AtomicU64::new(0);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            parallel.for_each(10_000, |index, _, _| {
                if index == 10 {
                    panic!("sample failed");
                }
                after.fetch_add(1, Ordering::Relaxed);
            });
        }));

        let payload = result.err().unwrap();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"sample failed"));
        assert!(after.load(Ordering::Relaxed) < 10_000);
    }

    #[test]
    fn time_mode_processes_whole_chunks() {
        let parallel = Parallel::new(2);
        let params = ParallelForParams::time(Duration::from_millis(30), 16);
        let inits = AtomicU64::new(0);
        let processed = parallel.for_each_params(&params, |_, _, init| {
            if init {
                inits.fetch_add(1, Ordering::Relaxed);
            }
        });
        assert!(processed > 0);
        assert_eq!(processed % 16, 0);
        assert!(inits.load(Ordering::Relaxed) <= 2);
    }
}
