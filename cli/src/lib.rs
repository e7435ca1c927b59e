//! Interactive shell for driving a [`rusty_emitter::Emitter`] by hand.

pub mod logger;
pub mod shell;
