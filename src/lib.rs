//! Deferred values with at-most-once settlement.
//!
//! This crate provides a promise primitive independent of any I/O mechanism.
//! A producer settles a [`Promise`] once; any number of consumers react to
//! that outcome, asynchronously and in registration order, through chains of
//! arbitrary depth and through the [`Promise::race`] and [`Promise::all`]
//! combinators.
//!
//! # Architecture
//!
//! - **Promise**: settlement cell, resolution procedure, chaining operator
//!   and combinators
//! - **Value**: the dynamic values promises carry, including foreign
//!   thenables exposed through [`HostObject`]
//! - **Schedule**: the deferred-callback primitive every reaction goes
//!   through
//! - **ManualScheduler**: a job queue stepped by the caller
//! - **Runtime**: a job queue pumped by a background driver thread
//! - **RuntimeBuilder**: fluent configuration for [`Runtime`]

mod builder;
mod error;
mod promise;
mod runtime;
mod value;

pub use builder::RuntimeBuilder;
pub use error::{Error, Result};
pub use promise::{Promise, Reject, Resolve, Settled};
pub use runtime::{Handle, Job, ManualScheduler, Runtime, Schedule};
pub use value::{Array, Completion, Function, HostObject, Object, Record, Value};
