use std::sync::{Arc, Weak};

use tracing::debug;

use crate::{
    ast::{AssignOperator, Expression},
    config::Config,
    error::{Error, RuntimeError},
    interpreter::{
        evaluator::function::core::register_builtins,
        parser::statement::StatementParser,
        scope::Scope,
        value::core::Value,
    },
    util::stack::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Evaluation continues with the next statement.
    Normal(Value),
    /// A `return` was executed; enclosing statements are skipped up to the
    /// function call.
    Return(Value),
}

impl Flow {
    /// The value carried by either variant.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Normal(value) | Self::Return(value) => value,
        }
    }
}

/// Stores the runtime state of one interpreter.
///
/// ## Usage
///
/// An `Interpreter` is created once and fed source through the embedding API
/// ([`Interpreter::run_script`], [`Interpreter::submit_line`]). Variables,
/// functions and classes defined by earlier input stay visible to later
/// input until [`Interpreter::reset`] is called.
///
/// Evaluation is single threaded: one interpreter runs on one thread at a
/// time.
pub struct Interpreter {
    pub(crate) config:     Config,
    pub(crate) global:     Arc<Scope>,
    pub(crate) current:    Arc<Scope>,
    pub(crate) parser:     StatementParser,
    pub(crate) next_line:  usize,
    pub(crate) last_error: Option<Error>,
    /// Scopes that outlived their evaluation because a closure needs them.
    pub(crate) retained:   Vec<Weak<Scope>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.global.teardown();
        self.release_retained();
    }
}

impl Interpreter {
    /// Creates an interpreter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an interpreter with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let global = Scope::global();
        register_builtins(&global);
        debug!(privileges = ?config.privileges, "interpreter created");

        Self { config,
               current: Arc::clone(&global),
               global,
               parser: StatementParser::new(),
               next_line: 1,
               last_error: None,
               retained: Vec::new() }
    }

    /// The configuration the interpreter was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The global scope.
    #[must_use]
    pub const fn global(&self) -> &Arc<Scope> {
        &self.global
    }

    /// The scope statements are currently evaluated in.
    #[must_use]
    pub const fn current_scope(&self) -> &Arc<Scope> {
        &self.current
    }

    /// Runs `f` with `scope` as the current scope.
    ///
    /// The previous scope is restored afterwards, also when `f` fails, and
    /// `scope` is closed unless it is a class scope. A scope that survives
    /// the close is remembered so [`reset`](Self::reset) and dropping the
    /// interpreter can break its cycles.
    pub(crate) fn with_scope<T>(&mut self,
                                scope: Arc<Scope>,
                                f: impl FnOnce(&mut Self) -> EvalResult<T>)
                                -> EvalResult<T> {
        let previous = std::mem::replace(&mut self.current, Arc::clone(&scope));
        let result = f(self);
        self.current = previous;
        if !scope.is_class_scope() && scope.close() {
            self.retained.retain(|kept| kept.strong_count() > 0);
            self.retained.push(Arc::downgrade(&scope));
        }
        result
    }

    /// Tears down every scope kept alive for a closure.
    pub(crate) fn release_retained(&mut self) {
        let retained = std::mem::take(&mut self.retained);
        debug!(scopes = retained.len(), "releasing retained scopes");
        for scope in retained.iter().filter_map(Weak::upgrade) {
            scope.teardown();
        }
    }

    /// Executes one top-level statement and returns its value.
    pub fn execute(&mut self, statement: &Expression) -> EvalResult<Value> {
        debug!(line = statement.line(), "executing statement");
        self.consolidate(statement).map(Flow::into_value)
    }

    /// Evaluates an expression to a value.
    ///
    /// A `return` can only appear as a statement, so the flow of a
    /// sub-expression is always normal.
    pub fn eval(&mut self, expr: &Expression) -> EvalResult<Value> {
        self.consolidate(expr).map(Flow::into_value)
    }

    /// Evaluates an expression and resolves element handles to their values.
    pub(crate) fn eval_resolved(&mut self, expr: &Expression) -> EvalResult<Value> {
        let line = expr.line();
        self.eval(expr)?.resolved(line)
    }

    /// Evaluates an expression tree.
    ///
    /// This is the recursive heart of the interpreter. Every node kind is
    /// handled here or delegated to the module implementing it.
    pub fn consolidate(&mut self, expr: &Expression) -> EvalResult<Flow> {
        ensure_sufficient_stack(|| self.consolidate_node(expr))
    }

    fn consolidate_node(&mut self, expr: &Expression) -> EvalResult<Flow> {
        let value = match expr {
            Expression::Value { value, .. } => value.duplicate(),
            Expression::ResolveVar { name, .. } => {
                self.current.find_variable(name).unwrap_or(Value::Null)
            },
            Expression::ResolveFuncVar { name, .. } => {
                self.current.find_function(name).map_or(Value::Null, Value::Function)
            },
            Expression::DefineVar { name,
                                    initializer,
                                    line, } => {
                let value = match initializer {
                    Some(initializer) => self.eval_resolved(initializer)?.duplicate(),
                    None => Value::Null,
                };
                self.current.set_variable(name, value.clone());
                debug!(variable = %name, line, "defined variable");
                value
            },
            Expression::FunctionCall { callee,
                                       arguments,
                                       line,
                                       .. } => {
                if let Some(name) = expr.callee_name()
                   && let Some(op) = AssignOperator::from_symbol(name)
                {
                    self.eval_assignment(op, arguments, *line)?
                } else {
                    self.eval_call(callee, arguments, *line)?
                }
            },
            Expression::FunctionDef(def) => self.define_function(def),
            Expression::ClassDef(def) => self.define_class(def)?,
            Expression::Block { statements, .. } => {
                let scope = self.current.child("block", false);
                return self.with_scope(scope, |interp| interp.run_statements(statements));
            },
            Expression::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.eval_resolved(value)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            },
            Expression::Loop { init,
                               test,
                               iterate,
                               body,
                               .. } => {
                return self.eval_loop(init.as_deref(), test.as_deref(), iterate.as_deref(), body);
            },
            Expression::ForEach { variable,
                                  source,
                                  body,
                                  line, } => return self.eval_foreach(variable, source, body, *line),
            Expression::IfElse { branches, .. } => return self.eval_if_else(branches),
            Expression::Import { path, line } => self.eval_import(path, *line)?,
            Expression::List { elements, .. } => {
                let values = elements.iter()
                                     .map(|e| self.eval_resolved(e))
                                     .collect::<EvalResult<Vec<_>>>()?;
                Value::from(values)
            },
        };

        Ok(Flow::Normal(value))
    }

    /// Runs statements in order until one returns.
    ///
    /// # Returns
    /// `Flow::Return` if a statement returned, otherwise the value of the
    /// last statement.
    pub(crate) fn run_statements(&mut self, statements: &[Expression]) -> EvalResult<Flow> {
        let mut last = Value::Null;
        for statement in statements {
            match self.consolidate(statement)? {
                Flow::Normal(value) => last = value,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal(last))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Precedence;

    fn int(i: i64) -> Expression {
        Expression::Value { value: Value::Int(i),
                            line:  1, }
    }

    #[test]
    fn operators_resolve_through_the_global_scope() {
        let mut interp = Interpreter::new();
        let sum = Expression::call("+", vec![int(2), int(3)], Precedence::AddSub, 1);
        assert_eq!(interp.eval(&sum).unwrap(), Value::Int(5));
    }

    #[test]
    fn unknown_names_resolve_to_null() {
        let mut interp = Interpreter::new();
        let read = Expression::ResolveVar { name: "missing".to_string(),
                                            line: 1, };
        assert_eq!(interp.eval(&read).unwrap(), Value::Null);
    }

    #[test]
    fn blocks_restore_the_current_scope() {
        let mut interp = Interpreter::new();
        let define = Expression::DefineVar { name:        "inner".to_string(),
                                             initializer: Some(Box::new(int(1))),
                                             line:        1, };
        let block = Expression::Block { statements: vec![define],
                                        line:       1, };
        assert_eq!(interp.eval(&block).unwrap(), Value::Int(1));
        assert!(Arc::ptr_eq(interp.current_scope(), interp.global()));
        assert!(!interp.global().has_variable("inner"));
    }

    #[test]
    fn return_stops_a_statement_list() {
        let mut interp = Interpreter::new();
        let statements = vec![Expression::Return { value: Some(Box::new(int(7))),
                                                   line:  1, },
                              int(8)];
        assert_eq!(interp.run_statements(&statements).unwrap(), Flow::Return(Value::Int(7)));
    }
}
