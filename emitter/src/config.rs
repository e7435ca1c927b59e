/// How [`Emitter::emit`](crate::Emitter::emit) reacts to a panicking listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// The panic unwinds out of `emit`; listeners after it are not invoked.
    #[default]
    Propagate,
    /// The panic is caught and logged; the remaining listeners still run.
    Isolate,
}

/// How repeated [`Emitter::once`](crate::Emitter::once) calls with the same
/// listener on the same event are treated while the first is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OncePolicy {
    /// Later registrations are ignored; the listener fires once.
    #[default]
    Collapse,
    /// Every registration is kept; the listener fires once per registration.
    Stack,
}

/// Configuration for an [`Emitter`](crate::Emitter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Panic handling during dispatch.
    pub dispatch: DispatchPolicy,
    /// Duplicate one-shot handling.
    pub once: OncePolicy,
    /// Number of event names to pre-allocate room for.
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch: DispatchPolicy::Propagate,
            once: OncePolicy::Collapse,
            capacity: 16,
        }
    }
}
