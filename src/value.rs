//! Dynamic values carried by promises.
//!
//! A promise does not care what it settles with, so results and rejection
//! reasons are [`Value`]s: a small tagged union of primitives, shared arrays,
//! host objects, callables, promises and the primitive's own [`Error`]s.
//!
//! Primitives compare by value. Everything shared (arrays, objects, functions,
//! promises) compares by identity, the way a reference compares.
//!
//! # Example
//!
//! ```ignore
//! use promise::{Function, Record, Value};
//!
//! let thenable = Record::new().with(
//!     "then",
//!     Function::new(|args| {
//!         if let Some(Value::Function(resolve)) = args.first() {
//!             resolve.call(&[Value::from(1)])?;
//!         }
//!         Ok(Value::Undefined)
//!     }),
//! );
//! ```

use crate::error::Error;
use crate::promise::Promise;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of calling a [`Function`] or reading a property.
///
/// `Err` carries a thrown value. It is never a panic.
pub type Completion = Result<Value, Value>;

/// Any value a promise can be settled with.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(Array),
    Object(Object),
    Function(Function),
    Promise(Promise),
    Error(Error),
}

impl Value {
    /// Returns `true` for [`Value::Function`].
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns `true` for [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns the number held by a [`Value::Number`].
    ///
    /// # Returns
    /// `None` for every other variant; no conversion is attempted.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrows the text of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the array of a [`Value::Array`].
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Borrows the callable of a [`Value::Function`].
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Borrows the promise of a [`Value::Promise`].
    pub fn as_promise(&self) -> Option<&Promise> {
        match self {
            Value::Promise(promise) => Some(promise),
            _ => None,
        }
    }

    /// Returns the primitive's own error held by a [`Value::Error`].
    pub fn as_error(&self) -> Option<Error> {
        match self {
            Value::Error(error) => Some(*error),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Promise(a), Value::Promise(b)) => a.ptr_eq(b),
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Array::new(values))
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Object(Object::new(value))
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<Promise> for Value {
    fn from(value: Promise) -> Self {
        Value::Promise(value)
    }
}

impl From<Error> for Value {
    fn from(value: Error) -> Self {
        Value::Error(value)
    }
}

/// An immutable, shared sequence of slots.
///
/// A slot holding `None` is a hole: it has no element at all, which is not the
/// same as holding [`Value::Undefined`].
#[derive(Clone)]
pub struct Array(Arc<[Option<Value>]>);

impl Array {
    /// Builds a dense array.
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self::with_holes(values.into_iter().map(Some))
    }

    /// Builds an array whose `None` slots are holes.
    pub fn with_holes(slots: impl IntoIterator<Item = Option<Value>>) -> Self {
        Array(slots.into_iter().collect())
    }

    /// Number of slots, holes included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the array has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element at `index`, or `None` for holes and out-of-range indices.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Returns `true` if slot `index` exists and is a hole.
    pub fn is_hole(&self, index: usize) -> bool {
        matches!(self.0.get(index), Some(None))
    }

    /// Every slot in order, `None` marking holes.
    pub fn slots(&self) -> &[Option<Value>] {
        &self.0
    }

    /// Returns `true` if both handles share the same storage.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array::new(iter)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for slot in self.0.iter() {
            match slot {
                Some(value) => list.entry(value),
                None => list.entry(&format_args!("<hole>")),
            };
        }
        list.finish()
    }
}

/// Property access for objects supplied by the embedding code.
///
/// Reading a property may throw, which is how a hostile `then` getter is
/// modelled.
pub trait HostObject: Send + Sync + fmt::Debug {
    /// Reads property `key`. Missing properties read as [`Value::Undefined`].
    fn get(&self, key: &str) -> Completion;
}

/// A shared handle to a [`HostObject`].
#[derive(Clone)]
pub struct Object(Arc<dyn HostObject>);

impl Object {
    /// Wraps `host` in a shared handle.
    pub fn new(host: impl HostObject + 'static) -> Self {
        Object(Arc::new(host))
    }

    /// Reads property `key` from the host object.
    ///
    /// # Returns
    /// The property value, or `Err` with the value the read threw.
    pub fn get(&self, key: &str) -> Completion {
        self.0.get(key)
    }

    /// Returns `true` if both handles refer to the same host object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A plain object: a fixed map of property names to values.
#[derive(Debug, Default)]
pub struct Record {
    properties: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an object with no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets property `key` to `value`, replacing any earlier value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl HostObject for Record {
    fn get(&self, key: &str) -> Completion {
        Ok(self.properties.get(key).cloned().unwrap_or_default())
    }
}

type Callable = dyn Fn(&[Value]) -> Completion + Send + Sync;

/// A callable value.
#[derive(Clone)]
pub struct Function(Arc<Callable>);

impl Function {
    /// Wraps a closure receiving the full argument list.
    ///
    /// # Arguments
    /// * `function` - Called with the arguments; `Err` means it threw.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&[Value]) -> Completion + Send + Sync + 'static,
    {
        Function(Arc::new(function))
    }

    /// Wraps a closure that only looks at its first argument.
    ///
    /// A missing argument is passed as [`Value::Undefined`].
    pub fn unary<F>(function: F) -> Self
    where
        F: Fn(Value) -> Completion + Send + Sync + 'static,
    {
        Function::new(move |args| function(args.first().cloned().unwrap_or_default()))
    }

    /// Calls the function with `args`.
    ///
    /// # Returns
    /// The returned value, or `Err` with the thrown value.
    pub fn call(&self, args: &[Value]) -> Completion {
        (self.0)(args)
    }

    /// Returns `true` if both handles refer to the same closure.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}
