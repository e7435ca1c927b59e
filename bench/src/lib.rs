//! Benchmark utilities for Rusty Emitter.
//!
//! This crate provides the benchmarking infrastructure for the event registry:
//!
//! - **Microbenchmarks**: emit fan-out, register/deregister, one-shot cycles
//! - **Workloads**: seeded mixes of persistent and one-shot listeners over many events
//! - **Memory tracking**: registration versus dispatch heap footprint via dhat
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_emitter_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_emitter_bench -- emit
//!
//! # Run with memory profiling (slower)
//! cargo bench -p rusty_emitter_bench --features memory_profiling
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.
//! Memory profiling results are written to `dhat-heap.json` for viewing with
//! DHAT's viewer.

pub mod memory;
pub mod workload;
