use std::{fmt, sync::Arc};

use crate::interpreter::{
    scope::Scope,
    value::{core::Value, function::Function},
};

/// A class instance.
///
/// An instance is a class scope of its own whose variables were copied from
/// the class template when it was constructed. Copying clones each value, so
/// scalars are independent per instance while nested collection handles stay
/// shared with the template.
pub struct Class {
    /// Name of the class the instance was built from.
    pub name:  String,
    /// Member storage. Its parent is the scope the class was defined in.
    pub scope: Arc<Scope>,
}

impl Class {
    /// Builds a new instance from a class template scope.
    #[must_use]
    pub fn instantiate(name: &str, template: &Arc<Scope>) -> Arc<Self> {
        let scope = Scope::detached(template.parent().cloned(), name, true);
        for (member, value) in template.variables_snapshot() {
            scope.set_variable(&member, value);
        }
        for function in template.functions_snapshot() {
            scope.add_function(function);
        }
        Arc::new(Self { name: name.to_string(),
                        scope })
    }

    /// Reads a member variable, or a method as a function value.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Value> {
        self.scope
            .get_variable(name)
            .or_else(|| self.scope.get_function(name).map(Value::Function))
    }

    /// Writes a member variable, creating it if needed.
    pub fn set_member(&self, name: &str, value: Value) {
        self.scope.set_variable(name, value);
    }

    /// Finds a callable member: a method, or a member variable holding a
    /// function.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<Arc<Function>> {
        self.scope.get_function(name).or_else(|| match self.scope.get_variable(name) {
                                          Some(Value::Function(f)) => Some(f),
                                          _ => None,
                                      })
    }

    /// Member variables sorted by name.
    #[must_use]
    pub fn members(&self) -> Vec<(String, Value)> {
        let mut members = self.scope.variables_snapshot();
        members.sort_by(|(a, _), (b, _)| a.cmp(b));
        members
    }

    /// Number of member variables.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.scope.variable_count()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
         .field("name", &self.name)
         .field("scope", &self.scope.name())
         .finish()
    }
}
