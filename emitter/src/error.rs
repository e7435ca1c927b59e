use thiserror::Error;

/// Errors returned by [`Emitter`](crate::Emitter) operations.
///
/// Both kinds are informational: the registry is left unchanged and the caller
/// decides whether the condition matters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `emit` was called for an event with no registered listeners.
    #[error("event not registered: {event}")]
    EventNotRegistered {
        /// The event that was emitted.
        event: String,
    },

    /// `off` was called with a listener that is not registered for the event.
    #[error("listener not found for event: {event}")]
    ListenerNotFound {
        /// The event the listener was looked up on.
        event: String,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use rusty_emitter::Error;
    ///
    /// let err = Error::EventNotRegistered { event: "foo".into() };
    /// assert_eq!(err.as_label(), "event_not_registered");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::EventNotRegistered { .. } => "event_not_registered",
            Error::ListenerNotFound { .. } => "listener_not_found",
        }
    }

    /// The event name the failed operation was called with.
    pub fn event(&self) -> &str {
        match self {
            Error::EventNotRegistered { event } | Error::ListenerNotFound { event } => event,
        }
    }
}
