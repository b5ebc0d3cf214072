use std::path::PathBuf;

use crate::interpreter::module::Privileges;

/// Settings an interpreter is created with.
///
/// # Example
/// ```
/// use sable::{Config, interpreter::module::Privileges};
///
/// let config = Config::default().with_privileges(Privileges::FILE_IO)
///                               .with_echo_errors(false);
/// assert!(config.privileges.contains(Privileges::FILE_IO));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Capabilities granted to modules registered with the interpreter.
    pub privileges:  Privileges,
    /// Directory `import` paths are resolved against.
    pub import_root: PathBuf,
    /// Whether `submit_line` prints errors to standard error.
    pub echo_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { privileges:  Privileges::empty(),
               import_root: PathBuf::from("."),
               echo_errors: true, }
    }
}

impl Config {
    /// Grants `privileges` in addition to those already granted.
    #[must_use]
    pub fn with_privileges(mut self, privileges: Privileges) -> Self {
        self.privileges |= privileges;
        self
    }

    /// Sets the directory imports are resolved against.
    #[must_use]
    pub fn with_import_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.import_root = root.into();
        self
    }

    /// Enables or disables printing errors from `submit_line`.
    #[must_use]
    pub const fn with_echo_errors(mut self, echo: bool) -> Self {
        self.echo_errors = echo;
        self
    }
}
