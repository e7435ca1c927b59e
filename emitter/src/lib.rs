//! In-process event registry.
//!
//! Callers register [`Listener`]s against string event names and later emit an
//! event, synchronously invoking every listener registered for it with one
//! payload value.
//!
//! - [`Emitter`]: the registry handle (`on`, `once`, `off`, `emit`)
//! - [`Listener`]: a shared callback, compared by identity
//! - [`Config`]: dispatch and one-shot policies
//! - [`Error`]: `EventNotRegistered` and `ListenerNotFound`
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: every
//! registration, deregistration and emit at `debug`, listener panics caught
//! under [`DispatchPolicy::Isolate`] at `error`. Nothing is printed unless the
//! host installs a logger.

mod config;
mod emitter;
mod error;
mod listener;
mod registry;

pub use config::{Config, DispatchPolicy, OncePolicy};
pub use emitter::Emitter;
pub use error::Error;
pub use listener::{Listener, ListenerId};
