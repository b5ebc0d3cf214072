use std::sync::Arc;

use bitflags::bitflags;

use crate::interpreter::{
    evaluator::core::{EvalResult, Interpreter},
    scope::Scope,
    value::{core::Value, function::Function},
};

bitflags! {
    /// Capabilities a module may require before it is installed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Privileges: u32 {
        /// Reading and writing files.
        const FILE_IO   = 1 << 0;
        /// Spawning threads.
        const THREADING = 1 << 1;
        /// Starting processes.
        const PROCESS   = 1 << 2;
    }
}

/// A named group of native functions installed together.
///
/// A module declares the privileges its functions need. The interpreter
/// installs it only when its configuration grants all of them.
///
/// # Example
/// ```
/// use sable::interpreter::{
///     module::{Module, Privileges},
///     value::core::Value,
/// };
///
/// let module = Module::new("files").requires(Privileges::FILE_IO)
///                                  .function("exists", |_, _| Ok(Value::from(false)));
///
/// assert!(module.is_allowed(Privileges::FILE_IO | Privileges::THREADING));
/// assert!(!module.is_allowed(Privileges::empty()));
/// ```
#[derive(Debug)]
pub struct Module {
    name:      String,
    required:  Privileges,
    functions: Vec<Function>,
}

impl Module {
    /// Creates an empty module that needs no privileges.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name:      name.to_string(),
               required:  Privileges::empty(),
               functions: Vec::new(), }
    }

    /// Adds `privileges` to the set the module requires.
    #[must_use]
    pub fn requires(mut self, privileges: Privileges) -> Self {
        self.required |= privileges;
        self
    }

    /// Adds a native function.
    #[must_use]
    pub fn function(mut self,
                    name: &str,
                    callback: impl Fn(&[Value], usize) -> EvalResult<Value> + Send + Sync + 'static)
                    -> Self {
        self.functions.push(Function::native(name, callback));
        self
    }

    /// Adds a native function that receives the interpreter and call scope.
    #[must_use]
    pub fn scoped_function(mut self,
                           name: &str,
                           callback: impl Fn(&mut Interpreter, &[Value], &Arc<Scope>, usize)
                               -> EvalResult<Value>
                               + Send
                               + Sync
                               + 'static)
                           -> Self {
        self.functions.push(Function::scoped(name, callback));
        self
    }

    /// Name of the module.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Privileges the module requires.
    #[must_use]
    pub const fn required(&self) -> Privileges {
        self.required
    }

    /// Names of the functions the module provides.
    #[must_use]
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    /// `true` if `granted` covers every privilege the module requires.
    #[must_use]
    pub const fn is_allowed(&self, granted: Privileges) -> bool {
        granted.contains(self.required)
    }

    pub(crate) fn into_functions(self) -> Vec<Function> {
        self.functions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modules_without_requirements_are_always_allowed() {
        let module = Module::new("math");
        assert!(module.is_allowed(Privileges::empty()));
        assert_eq!(module.required(), Privileges::empty());
    }

    #[test]
    fn every_required_privilege_must_be_granted() {
        let module = Module::new("spawn").requires(Privileges::THREADING | Privileges::PROCESS);
        assert!(!module.is_allowed(Privileges::THREADING));
        assert!(module.is_allowed(Privileges::all()));
    }

    #[test]
    fn function_names_are_listed_in_order() {
        let module = Module::new("m").function("a", |_, _| Ok(Value::Null))
                                     .function("b", |_, _| Ok(Value::Null));
        assert_eq!(module.function_names(), vec!["a", "b"]);
        assert_eq!(module.name(), "m");
    }
}
