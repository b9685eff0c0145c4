//! Fluent builder for [`Runtime`] construction.

use crate::runtime::Runtime;

use std::io;

const DEFAULT_THREAD_NAME: &str = "promise-driver";

/// Builder for configuring a [`Runtime`].
///
/// # Example
/// ```ignore
/// let rt = RuntimeBuilder::new().thread_name("reactions").build()?;
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeBuilder {
    thread_name: String,
    stack_size: Option<usize>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Creates a builder with the default thread name and the platform's
    /// default stack size.
    pub fn new() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
        }
    }

    /// Sets the name of the driver thread.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the stack size of the driver thread, in bytes.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Spawns the driver thread and returns the running runtime.
    ///
    /// # Errors
    /// Fails if the operating system refuses to spawn the thread.
    pub fn build(self) -> io::Result<Runtime> {
        Runtime::start(self.thread_name, self.stack_size)
    }
}
