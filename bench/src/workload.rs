//! Seeded registry workloads.
//!
//! A [`Workload`] fills an emitter with a reproducible mix of persistent and
//! one-shot listeners spread over many events, then drives it with full emit
//! passes and register/deregister churn.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_emitter::{Emitter, Listener};

/// Shape of a generated workload.
pub struct WorkloadConfig {
    /// Number of distinct event names.
    pub events: usize,
    /// Registrations per event.
    pub listeners_per_event: usize,
    /// Probability that a registration is made with `once`. Clamped to
    /// `0.0..=1.0`; NaN counts as `0.0`.
    pub once_ratio: f64,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            events: 64,
            listeners_per_event: 8,
            once_ratio: 0.25,
            seed: 12345,
        }
    }
}

pub struct Workload {
    emitter: Emitter<u64>,
    names: Vec<String>,
    persistent: Vec<(String, Listener<u64>)>,
    once: Vec<(String, Listener<u64>)>,
    hits: Arc<AtomicU64>,
    rng: ChaCha8Rng,
}

impl Workload {
    pub fn build(config: &WorkloadConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let emitter = Emitter::new();
        let hits = Arc::new(AtomicU64::new(0));
        let once_ratio = if config.once_ratio.is_nan() {
            0.0
        } else {
            config.once_ratio.clamp(0.0, 1.0)
        };

        let names: Vec<String> = (0..config.events).map(|i| format!("event-{i}")).collect();
        let mut persistent = Vec::new();
        let mut once = Vec::new();

        for name in &names {
            for _ in 0..config.listeners_per_event {
                let counter = Arc::clone(&hits);
                let listener = Listener::new(move |_: &u64| {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
                if rng.gen_bool(once_ratio) {
                    emitter.once(name, listener.clone());
                    once.push((name.clone(), listener));
                } else {
                    emitter.on(name, listener.clone());
                    persistent.push((name.clone(), listener));
                }
            }
        }

        Self {
            emitter,
            names,
            persistent,
            once,
            hits,
            rng,
        }
    }

    pub fn emitter(&self) -> &Emitter<u64> {
        &self.emitter
    }

    /// Total listener invocations so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Registrations currently held across all events.
    pub fn listener_count(&self) -> usize {
        self.names
            .iter()
            .map(|name| self.emitter.listener_count(name))
            .sum()
    }

    pub fn event_count(&self) -> usize {
        self.names.len()
    }

    pub fn once_count(&self) -> usize {
        self.once.len()
    }

    /// Emits every event once, then re-arms the one-shot listeners the pass
    /// consumed. Returns the number of emits that found listeners.
    pub fn emit_all(&mut self) -> usize {
        let mut delivered = 0;
        for (i, name) in self.names.iter().enumerate() {
            if self.emitter.emit(name, i as u64).is_ok() {
                delivered += 1;
            }
        }
        for (name, listener) in &self.once {
            self.emitter.once(name, listener.clone());
        }
        delivered
    }

    /// Deregisters and re-registers `n` randomly chosen persistent listeners.
    /// Returns how many were moved.
    pub fn churn(&mut self, n: usize) -> usize {
        if self.persistent.is_empty() {
            return 0;
        }
        let mut moved = 0;
        for _ in 0..n {
            let index = self.rng.gen_range(0..self.persistent.len());
            let (name, listener) = &self.persistent[index];
            if self.emitter.off(name, listener).is_ok() {
                self.emitter.on(name, listener.clone());
                moved += 1;
            }
        }
        moved
    }
}
