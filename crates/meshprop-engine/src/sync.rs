//! Abortable lock-step barrier.
//!
//! `std::sync::Barrier` cannot be released early: if one party panics or
//! is never spawned, every other party waits forever. [`LockstepBarrier`]
//! adds an abort flag. Once set, every current and future
//! [`wait`](LockstepBarrier::wait) returns [`Aborted`].

use std::error::Error;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Returned by [`LockstepBarrier::wait`] after the barrier was aborted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aborted;

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "barrier aborted")
    }
}

impl Error for Aborted {}

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

/// A reusable barrier for a fixed number of parties.
#[derive(Debug)]
pub struct LockstepBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl LockstepBarrier {
    /// Create a barrier released once `parties` threads have arrived.
    pub fn new(parties: usize) -> Self {
        debug_assert!(parties > 0);
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Number of parties.
    pub fn parties(&self) -> usize {
        self.parties
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        // The state is three plain counters; a panicking holder cannot
        // leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until all parties have arrived, or the barrier is aborted.
    pub fn wait(&self) -> Result<(), Aborted> {
        let mut state = self.lock();
        if state.aborted {
            return Err(Aborted);
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(());
        }
        while state.generation == generation && !state.aborted {
            state = self
                .cvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.generation != generation {
            Ok(())
        } else {
            Err(Aborted)
        }
    }

    /// Release every waiter with [`Aborted`]. Idempotent.
    pub fn abort(&self) {
        self.lock().aborted = true;
        self.cvar.notify_all();
    }

    /// Whether [`abort`](Self::abort) has been called.
    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn single_party_never_blocks() {
        let b = LockstepBarrier::new(1);
        assert_eq!(b.parties(), 1);
        for _ in 0..3 {
            assert_eq!(b.wait(), Ok(()));
        }
    }

    #[test]
    fn phases_do_not_overlap() {
        let parties = 8;
        let rounds = 50;
        let barrier = LockstepBarrier::new(parties);
        let counter = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..parties {
                s.spawn(|| {
                    for round in 0..rounds {
                        counter.fetch_add(1, Ordering::SeqCst);
                        barrier.wait().unwrap();
                        // Everyone has incremented for this round.
                        assert_eq!(counter.load(Ordering::SeqCst), parties * (round + 1));
                        barrier.wait().unwrap();
                    }
                });
            }
        });
    }

    #[test]
    fn abort_releases_waiters() {
        let barrier = LockstepBarrier::new(3);
        thread::scope(|s| {
            let waiters: Vec<_> = (0..2).map(|_| s.spawn(|| barrier.wait())).collect();
            // The third party never arrives.
            while barrier.lock().arrived < 2 {
                thread::yield_now();
            }
            barrier.abort();
            for w in waiters {
                assert_eq!(w.join().unwrap(), Err(Aborted));
            }
        });
        assert!(barrier.is_aborted());
        assert_eq!(barrier.wait(), Err(Aborted));
    }

    #[test]
    fn completed_generation_survives_later_abort() {
        let barrier = LockstepBarrier::new(2);
        thread::scope(|s| {
            let a = s.spawn(|| barrier.wait());
            assert_eq!(barrier.wait(), Ok(()));
            assert_eq!(a.join().unwrap(), Ok(()));
        });
        barrier.abort();
        assert_eq!(barrier.wait(), Err(Aborted));
    }
}
