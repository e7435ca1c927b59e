//! The event registry and its dispatch loop.
//!
//! [`Emitter`] owns a map from event name to the listeners registered for it
//! and exposes the four registry operations:
//!
//! - [`on()`](Emitter::on) appends a listener.
//! - [`once()`](Emitter::once) appends a one-shot listener.
//! - [`off()`](Emitter::off) removes a listener by identity.
//! - [`emit()`](Emitter::emit) invokes every listener of an event, in order.
//!
//! # Dispatch
//!
//! `emit` copies the entry sequence of the event while holding the lock,
//! releases the lock and then invokes the copy on the caller's thread.
//! Listeners may therefore call back into the emitter. Whatever they change
//! lands in the live map and shows up from the next `emit` onward; the pass in
//! progress always runs exactly the entries present when it started.
//!
//! One-shot entries are claimed (removed from the live map) right before they
//! are invoked. An entry whose claim fails has already fired, for example in a
//! nested `emit` of the same event, and is skipped.
//!
//! # Sharing
//!
//! `Emitter` is a handle: clones share one registry, and the handle is
//! `Send + Sync`. A single mutex guards the whole map; no lock is held while
//! listeners run.
//!
//! # Example
//!
//! ```rust
//! use rusty_emitter::{Emitter, Error, Listener};
//!
//! let emitter = Emitter::new();
//! let bar = Listener::new(|name: &&'static str| println!("hello {name}!"));
//!
//! emitter.on("foo", bar.clone());
//! emitter.emit("foo", "world")?;
//! emitter.off("foo", &bar)?;
//!
//! assert!(matches!(
//!     emitter.emit("foo", "world"),
//!     Err(Error::EventNotRegistered { .. })
//! ));
//! # Ok::<(), Error>(())
//! ```

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, error, trace};

use crate::{Config, DispatchPolicy, Error, Listener, OncePolicy, registry::Registry};

/// One registration of a listener on an event.
struct Entry<P> {
    /// Unique per registration; identifies one-shot entries when claimed.
    key: u64,
    listener: Listener<P>,
    once: bool,
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            listener: self.listener.clone(),
            once: self.once,
        }
    }
}

struct Inner<P> {
    registry: Registry<Entry<P>>,
    next_key: u64,
}

impl<P> Inner<P> {
    fn insert(&mut self, event: &str, listener: Listener<P>, once: bool) {
        let key = self.next_key;
        self.next_key += 1;
        self.registry.push(event, Entry {
            key,
            listener,
            once,
        });
    }
}

/// In-process registry of listeners keyed by event name.
///
/// See the [module documentation](self) for dispatch and sharing rules.
pub struct Emitter<P> {
    inner: Arc<Mutex<Inner<P>>>,
    config: Config,
}

impl<P> Emitter<P> {
    /// Creates an empty emitter with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty emitter with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                registry: Registry::with_capacity(config.capacity),
                next_key: 0,
            })),
            config,
        }
    }

    /// The configuration this emitter was created with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers `listener` for `event`, after any listeners already there.
    ///
    /// Registering the same listener twice creates two entries, and it is
    /// invoked twice per emit.
    pub fn on(&self, event: &str, listener: Listener<P>) {
        debug!("on '{}': listener {}", event, listener.id());
        self.lock().insert(event, listener, false);
    }

    /// Registers `listener` for `event` to be invoked on the next emit only.
    ///
    /// The entry removes itself as part of that emit. It cannot be removed
    /// with [`off()`](Self::off). While a one-shot registration of the same
    /// listener is pending on `event`, the [`OncePolicy`] decides whether
    /// another one is added.
    pub fn once(&self, event: &str, listener: Listener<P>) {
        let mut inner = self.lock();
        if self.config.once == OncePolicy::Collapse
            && inner
                .registry
                .any(event, |entry| entry.once && entry.listener == listener)
        {
            debug!(
                "once '{}': listener {} already pending, ignoring",
                event,
                listener.id()
            );
            return;
        }
        debug!("once '{}': listener {}", event, listener.id());
        inner.insert(event, listener, true);
    }

    /// Removes the first registration of `listener` for `event`.
    ///
    /// Listeners are matched by identity. The event is forgotten once its
    /// last listener is gone.
    ///
    /// # Errors
    ///
    /// [`Error::ListenerNotFound`] if `listener` is not registered for `event`
    /// through [`on()`](Self::on).
    pub fn off(&self, event: &str, listener: &Listener<P>) -> Result<(), Error> {
        let removed = self
            .lock()
            .registry
            .remove_first(event, |entry| !entry.once && entry.listener == *listener);

        match removed {
            Some(_) => {
                debug!("off '{}': listener {}", event, listener.id());
                Ok(())
            }
            None => Err(Error::ListenerNotFound {
                event: event.to_owned(),
            }),
        }
    }

    /// Invokes every listener registered for `event` with `payload`.
    ///
    /// Listeners run synchronously, in registration order, on the calling
    /// thread. A panicking listener is handled according to the configured
    /// [`DispatchPolicy`].
    ///
    /// # Errors
    ///
    /// [`Error::EventNotRegistered`] if `event` has no listeners; nothing is
    /// invoked in that case.
    pub fn emit(&self, event: &str, payload: P) -> Result<(), Error> {
        let Some(entries) = self.lock().registry.snapshot(event) else {
            debug!("emit '{}': no listeners", event);
            return Err(Error::EventNotRegistered {
                event: event.to_owned(),
            });
        };

        debug!("emit '{}': {} listener(s)", event, entries.len());
        for entry in &entries {
            if entry.once && !self.claim(event, entry.key) {
                trace!("emit '{}': one-shot {} already fired", event, entry.key);
                continue;
            }
            self.dispatch(event, &entry.listener, &payload);
        }
        Ok(())
    }

    /// Returns `true` if `event` has at least one listener.
    pub fn contains(&self, event: &str) -> bool {
        self.lock().registry.contains(event)
    }

    /// Number of registrations currently held for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().registry.len(event)
    }

    /// Names of all events with listeners, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().registry.names().map(str::to_owned).collect();
        names.sort_unstable();
        names
    }

    /// Returns `true` if no event has listeners.
    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    /// Removes the one-shot entry `key` from the live map.
    fn claim(&self, event: &str, key: u64) -> bool {
        self.lock()
            .registry
            .remove_first(event, |entry| entry.key == key)
            .is_some()
    }

    fn dispatch(&self, event: &str, listener: &Listener<P>, payload: &P) {
        match self.config.dispatch {
            DispatchPolicy::Propagate => listener.call(payload),
            DispatchPolicy::Isolate => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    listener.call(payload);
                }));
                if let Err(panic) = result {
                    error!(
                        "listener {} on event '{}' panicked: {}",
                        listener.id(),
                        event,
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
    }

    // Listeners never run under the lock, so poisoning can only come from a
    // panic inside the registry itself, which leaves the map intact.
    fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> Clone for Emitter<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config,
        }
    }
}

impl<P> Default for Emitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Emitter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("events", &self.event_names())
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
