//! Errors raised by the promise primitive itself.
//!
//! User rejections are arbitrary [`Value`](crate::Value)s and never pass
//! through this type. These variants are the only reasons the primitive
//! manufactures on its own, either as a rejection reason wrapped in
//! [`Value::Error`](crate::Value::Error) or returned synchronously from
//! [`Promise::race`](crate::Promise::race) and [`Promise::all`](crate::Promise::all).

use thiserror::Error;

/// Failure kinds produced by the primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A reaction returned the very promise it was meant to settle, or a
    /// promise was resolved with itself.
    #[error("then() cannot return same promise that it resolves")]
    ChainingCycle,

    /// A combinator was handed something other than an array.
    #[error("not an array")]
    NotASequence,
}

/// Result alias for operations that report [`Error`] synchronously.
pub type Result<T> = std::result::Result<T, Error>;
