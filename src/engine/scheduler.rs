use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug_span;

use crate::EngineError;

/// Upper bound on the worker pool, whatever the configuration asks for.
pub const MAX_CONCURRENT: usize = 100;

/// Bounded worker pool running one frame phase at a time.
///
/// A phase returns only once every task spawned inside it has finished,
/// so the next phase always sees complete results.
pub struct Scheduler {
    pool: ThreadPool,
}

impl Scheduler {
    pub fn new(workers: usize) -> Result<Self, EngineError> {
        if workers == 0 {
            return Err(EngineError::NoWorkers);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.min(MAX_CONCURRENT))
            .thread_name(|i| format!("raycast-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f` on the pool and wait for it (and everything it spawned).
    pub fn phase<R, F>(&self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        let _span = debug_span!("phase", name).entered();
        self.pool.install(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn pool_size_is_bounded() {
        assert_eq!(Scheduler::new(3).unwrap().workers(), 3);
        assert_eq!(Scheduler::new(1000).unwrap().workers(), MAX_CONCURRENT);
        assert!(matches!(Scheduler::new(0), Err(EngineError::NoWorkers)));
    }

    #[test]
    fn phase_is_a_barrier() {
        let sched = Scheduler::new(4).unwrap();
        let done = AtomicUsize::new(0);
        let mut cells = vec![0u32; 1000];

        sched.phase("fill", || {
            cells.par_iter_mut().enumerate().for_each(|(i, c)| {
                *c = i as u32 * 2;
                done.fetch_add(1, Ordering::Relaxed);
            })
        });
        assert_eq!(done.load(Ordering::Relaxed), 1000);

        let sum: u64 = sched.phase("sum", || cells.par_iter().map(|&c| c as u64).sum());
        assert_eq!(sum, 999 * 1000);
    }
}
