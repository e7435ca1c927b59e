//! Heap footprint of a registry workload.
//!
//! [`profile`] builds a [`Workload`] and drives it through emit passes, and
//! splits the heap traffic into two phases:
//!
//! - **registration**: event keys, listener handles and registry vectors
//!   allocated while the workload is built, plus what is still live afterwards
//! - **dispatch**: allocations made by `emit` (the per-emit listener snapshot)
//!   and by re-arming one-shot listeners between passes
//!
//! Counting needs the dhat allocator, so numbers are only non-zero when built
//! with the `memory_profiling` feature and `dhat::Alloc` is the global
//! allocator (the `emitter` bench installs it):
//!
//! ```bash
//! cargo bench -p rusty_emitter_bench --features memory_profiling
//! ```
//!
//! The run also writes `dhat-heap.json`, viewable at
//! <https://nnethercote.github.io/dh_view/dh_view.html>.

use std::fmt;

use crate::workload::{Workload, WorkloadConfig};

/// Heap traffic of one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub bytes: u64,
    pub allocations: u64,
}

impl Usage {
    fn between(before: Sample, after: Sample) -> Self {
        Self {
            bytes: after.total_bytes.saturating_sub(before.total_bytes),
            allocations: after.total_blocks.saturating_sub(before.total_blocks),
        }
    }
}

/// Heap footprint of a workload, split by phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footprint {
    /// Distinct event keys registered.
    pub events: usize,
    /// Registrations held after the last pass.
    pub listeners: usize,
    /// Emits that found listeners, across all passes.
    pub emits: usize,
    /// Allocated while registering.
    pub registration: Usage,
    /// Bytes still live once registration finished.
    pub retained_bytes: u64,
    /// Allocated by emit passes and one-shot re-arming.
    pub dispatch: Usage,
}

impl Footprint {
    /// Registration bytes per registered listener.
    pub fn bytes_per_listener(&self) -> f64 {
        ratio(self.registration.bytes, self.listeners)
    }

    /// Live bytes per event key, including its listener list.
    pub fn retained_bytes_per_event(&self) -> f64 {
        ratio(self.retained_bytes, self.events)
    }

    /// Dispatch allocations per delivered emit.
    pub fn allocations_per_emit(&self) -> f64 {
        ratio(self.dispatch.allocations, self.emits)
    }
}

fn ratio(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events, {} listeners: register {} bytes ({:.1}/listener), \
             retained {:.1} bytes/event, {} emits: {:.2} allocs/emit",
            self.events,
            self.listeners,
            self.registration.bytes,
            self.bytes_per_listener(),
            self.retained_bytes_per_event(),
            self.emits,
            self.allocations_per_emit()
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Sample {
    total_bytes: u64,
    total_blocks: u64,
    curr_bytes: u64,
}

/// Keeps a dhat heap profiler alive while samples are taken.
#[cfg(feature = "memory_profiling")]
struct Session {
    _profiler: dhat::Profiler,
}

#[cfg(feature = "memory_profiling")]
impl Session {
    /// Only one session can be active at a time.
    fn start() -> Self {
        Self {
            _profiler: dhat::Profiler::new_heap(),
        }
    }

    fn sample(&self) -> Sample {
        let stats = dhat::HeapStats::get();
        Sample {
            total_bytes: stats.total_bytes,
            total_blocks: stats.total_blocks,
            curr_bytes: stats.curr_bytes as u64,
        }
    }
}

#[cfg(not(feature = "memory_profiling"))]
struct Session;

#[cfg(not(feature = "memory_profiling"))]
impl Session {
    fn start() -> Self {
        Self
    }

    fn sample(&self) -> Sample {
        Sample::default()
    }
}

/// Builds a workload from `config`, runs `passes` full emit passes over it and
/// reports the heap footprint of each phase.
pub fn profile(config: &WorkloadConfig, passes: usize) -> Footprint {
    let session = Session::start();

    let start = session.sample();
    let mut workload = Workload::build(config);
    let built = session.sample();

    let mut emits = 0;
    for _ in 0..passes {
        emits += workload.emit_all();
    }
    let end = session.sample();

    Footprint {
        events: workload.event_count(),
        listeners: workload.listener_count(),
        emits,
        registration: Usage::between(start, built),
        retained_bytes: built.curr_bytes.saturating_sub(start.curr_bytes),
        dispatch: Usage::between(built, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint() -> Footprint {
        Footprint {
            events: 4,
            listeners: 16,
            emits: 8,
            registration: Usage {
                bytes: 3200,
                allocations: 40,
            },
            retained_bytes: 2048,
            dispatch: Usage {
                bytes: 1024,
                allocations: 12,
            },
        }
    }

    #[test]
    fn ratios_divide_by_their_own_phase() {
        let footprint = footprint();

        assert!((footprint.bytes_per_listener() - 200.0).abs() < f64::EPSILON);
        assert!((footprint.retained_bytes_per_event() - 512.0).abs() < f64::EPSILON);
        assert!((footprint.allocations_per_emit() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_footprint_has_zero_ratios() {
        let footprint = Footprint::default();

        assert_eq!(footprint.bytes_per_listener(), 0.0);
        assert_eq!(footprint.retained_bytes_per_event(), 0.0);
        assert_eq!(footprint.allocations_per_emit(), 0.0);
    }

    #[test]
    fn display_reports_each_phase() {
        let display = footprint().to_string();

        assert!(display.contains("4 events, 16 listeners"));
        assert!(display.contains("register 3200 bytes (200.0/listener)"));
        assert!(display.contains("retained 512.0 bytes/event"));
        assert!(display.contains("8 emits: 1.50 allocs/emit"));
    }

    #[test]
    fn profile_counts_registrations_and_emits() {
        // Given a workload of 8 events with 4 registrations each
        let config = WorkloadConfig {
            events: 8,
            listeners_per_event: 4,
            once_ratio: 0.5,
            seed: 7,
        };

        // When profiled over three passes
        let footprint = profile(&config, 3);

        // Then every event was delivered on every pass and one-shots were re-armed
        assert_eq!(footprint.events, 8);
        assert_eq!(footprint.listeners, 32);
        assert_eq!(footprint.emits, 24);
    }
}
