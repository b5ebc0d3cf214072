use std::{fmt, sync::Arc};

use crate::{
    ast::{Expression, Precedence},
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        value::{class::Class, core::Value},
    },
};

/// A native callback: evaluated arguments and the call line.
pub type NativeFn = dyn Fn(&[Value], usize) -> EvalResult<Value> + Send + Sync;

/// A native callback that also receives the interpreter and its call scope.
pub type ScopedFn =
    dyn Fn(&mut Interpreter, &[Value], &Arc<Scope>, usize) -> EvalResult<Value> + Send + Sync;

/// A native callback that also receives the class instance it runs against.
pub type ClassFn = dyn Fn(&mut Interpreter, Option<&Arc<Class>>, &[Value], &Arc<Scope>, usize)
                      -> EvalResult<Value>
                   + Send
                   + Sync;

/// How a function relates to classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// An ordinary function.
    Free,
    /// The function a class name resolves to; calling it builds an instance.
    Constructor,
    /// A function defined inside a class body.
    Member,
}

/// The four execution strategies of a function.
pub enum FunctionBody {
    /// Script statements, run in a fresh call scope.
    Interpreted(Vec<Expression>),
    /// A host callback.
    Native(Box<NativeFn>),
    /// A host callback with access to the interpreter and call scope.
    Scoped(Box<ScopedFn>),
    /// A host callback with access to the receiving class instance.
    ClassAware(Box<ClassFn>),
}

/// A first-class, reference counted function.
pub struct Function {
    /// The name the function was defined or registered under.
    pub name:       String,
    /// Binding strength, derived from the name (`+` binds looser than `*`).
    pub precedence: Precedence,
    /// Relation to classes.
    pub kind:       FunctionKind,
    /// Parameter names of interpreted functions.
    pub params:     Vec<String>,
    /// What runs when the function is called.
    pub body:       FunctionBody,
    /// Scope the function was defined in. For constructors this is the class
    /// template.
    pub env:        Option<Arc<Scope>>,
}

impl Function {
    /// Creates a function whose body is script statements.
    #[must_use]
    pub fn interpreted(name: &str,
                       params: Vec<String>,
                       body: Vec<Expression>,
                       kind: FunctionKind,
                       env: Arc<Scope>)
                       -> Self {
        Self { name: name.to_string(),
               precedence: Precedence::of(name),
               kind,
               params,
               body: FunctionBody::Interpreted(body),
               env: Some(env) }
    }

    /// Creates a free function backed by a host callback.
    pub fn native(name: &str,
                  callback: impl Fn(&[Value], usize) -> EvalResult<Value> + Send + Sync + 'static)
                  -> Self {
        Self::with_body(name, FunctionBody::Native(Box::new(callback)))
    }

    /// Creates a free function backed by a scope-aware host callback.
    pub fn scoped(name: &str,
                  callback: impl Fn(&mut Interpreter, &[Value], &Arc<Scope>, usize) -> EvalResult<Value>
                      + Send
                      + Sync
                      + 'static)
                  -> Self {
        Self::with_body(name, FunctionBody::Scoped(Box::new(callback)))
    }

    /// Creates a function backed by a class-aware host callback.
    pub fn class_aware(name: &str,
                       kind: FunctionKind,
                       env: Option<Arc<Scope>>,
                       callback: impl Fn(&mut Interpreter,
                          Option<&Arc<Class>>,
                          &[Value],
                          &Arc<Scope>,
                          usize) -> EvalResult<Value>
                           + Send
                           + Sync
                           + 'static)
                       -> Self {
        Self { kind, env, ..Self::with_body(name, FunctionBody::ClassAware(Box::new(callback))) }
    }

    fn with_body(name: &str, body: FunctionBody) -> Self {
        Self { name: name.to_string(),
               precedence: Precedence::of(name),
               kind: FunctionKind::Free,
               params: Vec::new(),
               body,
               env: None }
    }

    /// The statements of an interpreted function.
    #[must_use]
    pub fn statements(&self) -> Option<&[Expression]> {
        match &self.body {
            FunctionBody::Interpreted(statements) => Some(statements),
            _ => None,
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            FunctionBody::Interpreted(statements) => format!("{} statement(s)", statements.len()),
            FunctionBody::Native(_) => "native".to_string(),
            FunctionBody::Scoped(_) => "scoped native".to_string(),
            FunctionBody::ClassAware(_) => "class-aware native".to_string(),
        };
        f.debug_struct("Function")
         .field("name", &self.name)
         .field("kind", &self.kind)
         .field("params", &self.params)
         .field("body", &body)
         .finish_non_exhaustive()
    }
}
