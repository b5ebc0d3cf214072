use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::interpreter::value::{core::Value, function::Function};

static NEXT_SCOPE_ID: AtomicUsize = AtomicUsize::new(1);

/// A named environment of variables, functions and named sub-scopes.
///
/// Scopes form a tree through their parent link, which is the lexical lookup
/// chain. A child keeps its parent alive; a parent only holds the children it
/// names explicitly (class templates). Each map sits behind its own mutex and
/// every lock is held for a single map operation, so a host thread
/// re-entering the environment cannot race an insert.
///
/// Non-class scopes are closed when evaluation leaves them: their maps are
/// cleared, which severs any cycle running through a function defined there.
/// A scope a closure still needs survives the close and is torn down later
/// by its interpreter. Class scopes persist as instance and template storage.
pub struct Scope {
    name:        String,
    parent:      Option<Arc<Scope>>,
    class_scope: bool,
    variables:   Mutex<HashMap<String, Value>>,
    scopes:      Mutex<HashMap<String, Arc<Scope>>>,
    functions:   Mutex<HashMap<String, Arc<Function>>>,
}

impl Scope {
    /// Creates a root scope named `global`.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::new(Self::with_name("global".to_string(), None, false))
    }

    /// Creates a child of `self`.
    ///
    /// The child is not registered in the parent's scope map; it lives as
    /// long as something references it.
    #[must_use]
    pub fn child(self: &Arc<Self>, name: &str, class_scope: bool) -> Arc<Self> {
        Self::detached(Some(Arc::clone(self)), name, class_scope)
    }

    /// Creates a scope with an explicit parent (or none).
    #[must_use]
    pub fn detached(parent: Option<Arc<Self>>, name: &str, class_scope: bool) -> Arc<Self> {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        let scope = Self::with_name(format!("{name}#{id}"), parent, class_scope);
        trace!(scope = %scope.name, class_scope, "opened scope");
        Arc::new(scope)
    }

    fn with_name(name: String, parent: Option<Arc<Self>>, class_scope: bool) -> Self {
        Self { name,
               parent,
               class_scope,
               variables: Mutex::new(HashMap::new()),
               scopes: Mutex::new(HashMap::new()),
               functions: Mutex::new(HashMap::new()) }
    }

    /// Unique name of the scope.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enclosing scope.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns `true` for class templates and instances.
    #[must_use]
    pub const fn is_class_scope(&self) -> bool {
        self.class_scope
    }

    /// Reads a variable defined at this level.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.variables.lock().get(name).cloned()
    }

    /// Defines or overwrites a variable at this level.
    pub fn set_variable(&self, name: &str, value: Value) {
        self.variables.lock().insert(name.to_string(), value);
    }

    /// Returns `true` if this level defines `name`.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.lock().contains_key(name)
    }

    /// Number of variables at this level.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.lock().len()
    }

    /// Copies out the variables defined at this level.
    #[must_use]
    pub fn variables_snapshot(&self) -> Vec<(String, Value)> {
        self.variables
            .lock()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Registers a function at this level under its own name.
    pub fn add_function(&self, function: Arc<Function>) {
        self.functions.lock().insert(function.name.clone(), function);
    }

    /// Reads a function registered at this level.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<Arc<Function>> {
        self.functions.lock().get(name).cloned()
    }

    /// Copies out the functions registered at this level.
    #[must_use]
    pub fn functions_snapshot(&self) -> Vec<Arc<Function>> {
        self.functions.lock().values().cloned().collect()
    }

    /// Registers a named sub-scope.
    pub fn add_scope(&self, name: &str, scope: Arc<Self>) {
        self.scopes.lock().insert(name.to_string(), scope);
    }

    fn ancestors(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |scope| scope.parent.as_deref())
    }

    fn ancestors_owned(self: &Arc<Self>) -> impl Iterator<Item = Arc<Self>> {
        std::iter::successors(Some(Arc::clone(self)), |scope| scope.parent.clone())
    }

    /// Resolves a name along the parent chain.
    ///
    /// At each level variables are checked before functions, so a function
    /// name resolves to a function value when no variable shadows it.
    #[must_use]
    pub fn find_variable(&self, name: &str) -> Option<Value> {
        self.ancestors().find_map(|scope| {
                            scope.get_variable(name)
                                 .or_else(|| scope.get_function(name).map(Value::Function))
                        })
    }

    /// Finds the nearest scope that defines the variable `name`.
    #[must_use]
    pub fn find_variable_scope(self: &Arc<Self>, name: &str) -> Option<Arc<Self>> {
        self.ancestors_owned().find(|scope| scope.has_variable(name))
    }

    /// Resolves a name in call position.
    ///
    /// At each level registered functions are checked first, then variables
    /// holding a function. Variables holding anything else are skipped.
    #[must_use]
    pub fn find_function(&self, name: &str) -> Option<Arc<Function>> {
        self.ancestors().find_map(|scope| {
                            scope.get_function(name).or_else(|| match scope.get_variable(name) {
                                                        Some(Value::Function(f)) => Some(f),
                                                        _ => None,
                                                    })
                        })
    }

    /// Finds a named sub-scope along the parent chain.
    #[must_use]
    pub fn find_scope(&self, name: &str) -> Option<Arc<Self>> {
        self.ancestors().find_map(|scope| scope.scopes.lock().get(name).cloned())
    }

    /// The nearest enclosing class scope, including `self`.
    #[must_use]
    pub fn nearest_class_scope(self: &Arc<Self>) -> Option<Arc<Self>> {
        self.ancestors_owned().find(|scope| scope.class_scope)
    }

    /// Clears a scope whose evaluation has finished.
    ///
    /// The storage is kept when the scope is still reachable from outside:
    /// a function defined here escaped, or a child scope or a function
    /// environment elsewhere points at it. References from the scope's own
    /// functions and named sub-scopes back to itself do not count.
    ///
    /// # Returns
    /// `true` if the scope was kept alive.
    pub fn close(self: &Arc<Self>) -> bool {
        let escaped = self.functions.lock().values().any(|f| Arc::strong_count(f) > 1);
        if escaped || Arc::strong_count(self) > 1 + self.self_references() {
            debug!(scope = %self.name, "scope kept alive by an outside reference");
            return true;
        }
        self.teardown();
        false
    }

    /// Counts the links into `self` held by its own functions and named
    /// sub-scopes.
    fn self_references(self: &Arc<Self>) -> usize {
        let functions = self.functions
                            .lock()
                            .values()
                            .filter(|f| f.env.as_ref().is_some_and(|env| Arc::ptr_eq(env, self)))
                            .count();
        let scopes = self.scopes
                         .lock()
                         .values()
                         .filter(|s| s.parent.as_ref().is_some_and(|p| Arc::ptr_eq(p, self)))
                         .count();
        functions + scopes
    }

    /// Clears this scope and every named sub-scope, recursively.
    pub fn teardown(&self) {
        let scopes = std::mem::take(&mut *self.scopes.lock());
        for scope in scopes.values() {
            scope.teardown();
        }
        let functions = std::mem::take(&mut *self.functions.lock());
        let variables = std::mem::take(&mut *self.variables.lock());
        trace!(scope = %self.name,
               functions = functions.len(),
               variables = variables.len(),
               "closed scope");
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
         .field("name", &self.name)
         .field("class_scope", &self.class_scope)
         .field("parent", &self.parent.as_ref().map(|p| p.name()))
         .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::value::function::FunctionKind;

    #[test]
    fn lookup_walks_parent_chain() {
        let global = Scope::global();
        global.set_variable("a", Value::Int(1));
        let child = global.child("block", false);
        child.set_variable("b", Value::Int(2));

        assert_eq!(child.find_variable("a"), Some(Value::Int(1)));
        assert_eq!(child.find_variable("b"), Some(Value::Int(2)));
        assert_eq!(global.find_variable("b"), None);
        assert_eq!(child.find_variable_scope("a").map(|s| s.name().to_string()),
                   Some("global".to_string()));
    }

    #[test]
    fn inner_definitions_shadow_outer_ones() {
        let global = Scope::global();
        global.set_variable("x", Value::Int(1));
        let child = global.child("block", false);
        child.set_variable("x", Value::Int(2));

        assert_eq!(child.find_variable("x"), Some(Value::Int(2)));
        assert_eq!(global.get_variable("x"), Some(Value::Int(1)));
    }

    #[test]
    fn function_lookup_skips_non_function_variables() {
        let global = Scope::global();
        global.add_function(Arc::new(Function::native("f", |_, _| Ok(Value::Null))));
        let child = global.child("block", false);
        child.set_variable("f", Value::Int(3));

        assert!(child.find_function("f").is_some());
        assert_eq!(child.find_variable("f"), Some(Value::Int(3)));
    }

    #[test]
    fn close_clears_storage() {
        let global = Scope::global();
        let child = global.child("block", false);
        child.set_variable("x", Value::Int(1));
        child.close();

        assert_eq!(child.variable_count(), 0);
    }

    #[test]
    fn close_keeps_storage_for_escaped_functions() {
        let global = Scope::global();
        let child = global.child("call", false);
        let function = Arc::new(Function::native("inner", |_, _| Ok(Value::Null)));
        child.add_function(Arc::clone(&function));
        child.set_variable("captured", Value::Int(1));
        assert!(child.close());

        assert_eq!(child.get_variable("captured"), Some(Value::Int(1)));
        drop(function);
        assert!(!child.close());
        assert_eq!(child.variable_count(), 0);
    }

    #[test]
    fn close_keeps_scopes_a_live_child_points_at() {
        let global = Scope::global();
        let call = global.child("call", false);
        call.set_variable("x", Value::Int(3));
        let block = call.child("block", false);

        assert!(call.close());
        assert_eq!(block.find_variable("x"), Some(Value::Int(3)));

        drop(block);
        assert!(!call.close());
        assert_eq!(call.variable_count(), 0);
    }

    #[test]
    fn own_functions_do_not_keep_a_scope_alive() {
        let global = Scope::global();
        let call = global.child("call", false);
        call.add_function(Arc::new(Function::interpreted("local",
                                                         Vec::new(),
                                                         Vec::new(),
                                                         FunctionKind::Free,
                                                         Arc::clone(&call))));
        call.add_scope("Template", call.child("Template", true));
        call.set_variable("x", Value::Int(1));

        assert!(!call.close());
        assert_eq!(call.variable_count(), 0);
        assert_eq!(Arc::strong_count(&call), 1);
    }

    #[test]
    fn class_scopes_are_found_from_children() {
        let global = Scope::global();
        let class = global.child("Point", true);
        let call = class.child("call", false);

        assert_eq!(call.nearest_class_scope().map(|s| s.name().to_string()),
                   Some(class.name().to_string()));
        assert!(global.nearest_class_scope().is_none());
    }
}
