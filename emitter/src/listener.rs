//! Listener handles and their identity.
//!
//! A [`Listener`] is a shared, type-erased callback taking a reference to the
//! emitted payload. Listeners are compared by identity only: clones of one
//! listener are equal, while two listeners built from identical closures are
//! not.
//!
//! # Example
//!
//! ```rust
//! use rusty_emitter::Listener;
//!
//! let bar = Listener::new(|name: &&'static str| println!("hello {name}!"));
//! let same = bar.clone();
//! let other = Listener::new(|name: &&'static str| println!("hello {name}!"));
//!
//! assert_eq!(bar, same);
//! assert_ne!(bar, other);
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

type Callback<P> = dyn Fn(&P) + Send + Sync + 'static;

/// Identity of a [`Listener`].
///
/// Derived from the address of the listener's shared allocation, so it stays
/// stable for as long as any clone of the listener is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(usize);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A callback registered against an event.
pub struct Listener<P> {
    callback: Arc<Callback<P>>,
}

impl<P> Listener<P> {
    /// Wrap a closure as a listener with a fresh identity.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(f),
        }
    }

    /// A listener that does nothing when invoked.
    ///
    /// It is stored and counted like any other listener.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Invoke the listener with a payload.
    #[inline]
    pub fn call(&self, payload: &P) {
        (self.callback)(payload)
    }

    /// The identity of this listener.
    #[inline]
    pub fn id(&self) -> ListenerId {
        ListenerId(Arc::as_ptr(&self.callback) as *const () as usize)
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<P> Eq for Listener<P> {}

impl<P> Hash for Listener<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<P> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id()).finish()
    }
}
