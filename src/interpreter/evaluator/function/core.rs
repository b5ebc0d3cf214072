use std::sync::Arc;

use tracing::debug;

use crate::{
    ast::Expression,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Flow, Interpreter},
            function::{builtin, convert, print},
        },
        scope::Scope,
        value::{
            class::Class,
            core::Value,
            function::{Function, FunctionBody, FunctionKind},
        },
    },
};

/// A builtin receiving only its evaluated arguments.
type NativeBuiltin = fn(&[Value], usize) -> EvalResult<Value>;

/// A builtin that needs the interpreter, e.g. to call back into script code.
type ScopedBuiltin = fn(&mut Interpreter, &[Value], &Arc<Scope>, usize) -> EvalResult<Value>;

/// The two shapes a builtin can take.
#[derive(Clone, Copy)]
enum Builtin {
    Native(NativeBuiltin),
    Scoped(ScopedBuiltin),
}

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `AtLeast(n)` means `n` or more arguments.
/// - `Any` accepts every argument count.
#[derive(Clone, Copy)]
enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
    AtLeast(usize),
    Any,
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - the implementation, wrapped in `Builtin::Native` or `Builtin::Scoped`.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table installed into every global scope),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  Builtin,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of all functions installed into a fresh global scope.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "+"             => { arity: Arity::Exact(2), func: Builtin::Native(builtin::add) },
    "-"             => { arity: Arity::OneOf(&[1, 2]), func: Builtin::Native(builtin::sub_or_negate) },
    "*"             => { arity: Arity::Exact(2), func: Builtin::Native(builtin::mul) },
    "/"             => { arity: Arity::Exact(2), func: Builtin::Native(builtin::div) },
    "%"             => { arity: Arity::Exact(2), func: Builtin::Native(builtin::rem) },
    "=="            => { arity: Arity::Exact(2), func: Builtin::Native(builtin::equal) },
    "!="            => { arity: Arity::Exact(2), func: Builtin::Native(builtin::not_equal) },
    "<"             => { arity: Arity::Exact(2), func: Builtin::Native(builtin::less) },
    ">"             => { arity: Arity::Exact(2), func: Builtin::Native(builtin::greater) },
    "<="            => { arity: Arity::Exact(2), func: Builtin::Native(builtin::less_equal) },
    ">="            => { arity: Arity::Exact(2), func: Builtin::Native(builtin::greater_equal) },
    "&&"            => { arity: Arity::Exact(2), func: Builtin::Native(builtin::and) },
    "||"            => { arity: Arity::Exact(2), func: Builtin::Native(builtin::or) },
    "!"             => { arity: Arity::Exact(1), func: Builtin::Native(builtin::not) },
    "applyfunction" => { arity: Arity::AtLeast(1), func: Builtin::Scoped(builtin::apply_function) },
    "listindex"     => { arity: Arity::Exact(2), func: Builtin::Native(builtin::list_index) },
    "len"           => { arity: Arity::Exact(1), func: Builtin::Native(builtin::len) },
    "typeof"        => { arity: Arity::Exact(1), func: Builtin::Native(builtin::type_of) },
    "assert"        => { arity: Arity::OneOf(&[1, 2]), func: Builtin::Native(builtin::assert) },
    "print"         => { arity: Arity::Any, func: Builtin::Native(print::print) },
    "int"           => { arity: Arity::Exact(1), func: Builtin::Native(convert::to_int) },
    "float"         => { arity: Arity::Exact(1), func: Builtin::Native(convert::to_float) },
    "string"        => { arity: Arity::Exact(1), func: Builtin::Native(convert::to_string) },
    "vec3"          => { arity: Arity::OneOf(&[1, 3]), func: Builtin::Native(convert::vec3) },
    "array"         => { arity: Arity::Any, func: Builtin::Native(convert::to_array) },
    "list"          => { arity: Arity::Any, func: Builtin::Native(convert::to_list) },
    "dictionary"    => { arity: Arity::OneOf(&[0, 1]), func: Builtin::Native(convert::to_dictionary) },
    "keys"          => { arity: Arity::Exact(1), func: Builtin::Native(convert::keys) },
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    ///
    /// Returns `true` if the count is permitted, `false` otherwise.
    fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::OneOf(counts) => counts.contains(&n),
            Self::AtLeast(m) => n >= m,
            Self::Any => true,
        }
    }

    fn enforce(self, name: &str, found: usize, line: usize) -> EvalResult<()> {
        if self.check(found) {
            Ok(())
        } else {
            Err(RuntimeError::ArgumentCountMismatch { name: name.to_string(),
                                                      found,
                                                      line })
        }
    }
}

impl BuiltinDef {
    fn to_function(&self) -> Function {
        let (name, arity) = (self.name, self.arity);
        match self.func {
            Builtin::Native(f) => Function::native(name, move |args, line| {
                                      arity.enforce(name, args.len(), line)?;
                                      f(args, line)
                                  }),
            Builtin::Scoped(f) => Function::scoped(name, move |interp, args, scope, line| {
                                      arity.enforce(name, args.len(), line)?;
                                      f(interp, args, scope, line)
                                  }),
        }
    }
}

/// Installs every builtin into `scope`.
pub(crate) fn register_builtins(scope: &Scope) {
    for def in BUILTIN_TABLE {
        scope.add_function(Arc::new(def.to_function()));
    }
    debug!(count = BUILTIN_TABLE.len(), "registered builtins");
}

impl Interpreter {
    /// Evaluates a function call.
    ///
    /// The callee and all arguments are evaluated left to right first. A
    /// callee resolving to null means no function of that name exists; the
    /// call is then made on the first argument if that is a function.
    ///
    /// # Parameters
    /// - `callee`: Expression producing the function.
    /// - `arguments`: Argument expressions.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The function result or an error if lookup or the call fails.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expression,
                            arguments: &[Expression],
                            line: usize)
                            -> EvalResult<Value> {
        let target = self.eval_resolved(callee)?;
        let mut args = arguments.iter()
                                .map(|a| self.eval_resolved(a))
                                .collect::<EvalResult<Vec<_>>>()?;

        match target {
            Value::Function(function) => self.invoke(&function, args, None, line),
            Value::Null => match args.first() {
                Some(Value::Function(function)) => {
                    let function = Arc::clone(function);
                    args.remove(0);
                    self.invoke(&function, args, None, line)
                },
                _ => {
                    let name = match callee {
                        Expression::ResolveFuncVar { name, .. } | Expression::ResolveVar { name, .. } => {
                            name.clone()
                        },
                        _ => "<anonymous>".to_string(),
                    };
                    Err(RuntimeError::UnknownFunction { name, line })
                },
            },
            other => Err(RuntimeError::NotCallable { found: other.value_type(),
                                                     line }),
        }
    }

    /// Calls `function` with already evaluated arguments.
    ///
    /// - Interpreted functions run in a fresh call scope whose parent is the
    ///   receiving instance, the nearest class scope (for methods), or the
    ///   scope the function was defined in. Parameters are bound
    ///   positionally; missing ones are null and extra arguments are ignored.
    /// - Native functions run in a transient child of the current scope.
    /// - Class-aware functions additionally receive `this`. Constructors
    ///   first build a new instance from their class template.
    pub fn invoke(&mut self,
                  function: &Arc<Function>,
                  args: Vec<Value>,
                  this: Option<&Arc<Class>>,
                  line: usize)
                  -> EvalResult<Value> {
        debug!(function = %function.name, args = args.len(), line, "call");

        match &function.body {
            FunctionBody::Interpreted(body) => {
                let parent = self.call_parent(function, this);
                let scope = parent.child(&function.name, false);
                let mut args = args.into_iter();
                for param in &function.params {
                    scope.set_variable(param, args.next().unwrap_or(Value::Null));
                }
                self.with_scope(scope, |interp| {
                        for statement in body {
                            if let Flow::Return(value) = interp.consolidate(statement)? {
                                return Ok(value);
                            }
                        }
                        Ok(Value::Null)
                    })
            },
            FunctionBody::Native(callback) => {
                let scope = self.current.child(&function.name, false);
                self.with_scope(scope, |_| callback(&args, line))
            },
            FunctionBody::Scoped(callback) => {
                let scope = self.current.child(&function.name, false);
                self.with_scope(scope, |interp| {
                        let call_scope = Arc::clone(&interp.current);
                        callback(interp, &args, &call_scope, line)
                    })
            },
            FunctionBody::ClassAware(callback) => {
                let instance = match (function.kind, &function.env) {
                    (FunctionKind::Constructor, Some(template)) => {
                        Some(Class::instantiate(&function.name, template))
                    },
                    _ => this.cloned(),
                };
                let scope = self.current.child(&function.name, false);
                self.with_scope(scope, |interp| {
                        let call_scope = Arc::clone(&interp.current);
                        callback(interp, instance.as_ref(), &args, &call_scope, line)
                    })
            },
        }
    }

    fn call_parent(&self, function: &Function, this: Option<&Arc<Class>>) -> Arc<Scope> {
        if let Some(class) = this {
            return Arc::clone(&class.scope);
        }
        if function.kind == FunctionKind::Member
           && let Some(scope) = self.current.nearest_class_scope()
        {
            return scope;
        }
        function.env.clone().unwrap_or_else(|| Arc::clone(&self.current))
    }

    /// Calls the member `name` on `receiver`: `receiver.name(args)`.
    ///
    /// Class instances look the name up among their methods first and
    /// dictionaries among their function-valued entries. Otherwise a
    /// function of that name is looked up in scope and called with the
    /// receiver prepended to the arguments, so `list.len()` is `len(list)`.
    pub fn call_member(&mut self,
                       receiver: &Value,
                       name: &str,
                       args: Vec<Value>,
                       line: usize)
                       -> EvalResult<Value> {
        match receiver {
            Value::Class(class) => {
                if let Some(method) = class.method(name) {
                    return self.invoke(&method, args, Some(class), line);
                }
            },
            Value::Dictionary(dictionary) => {
                let entry = dictionary.read().get(&Value::from(name), line)?;
                if let Some(Value::Function(function)) = entry {
                    return self.invoke(&function, args, None, line);
                }
            },
            _ => {},
        }

        let Some(function) = self.current.find_function(name) else {
            return Err(match receiver {
                Value::Class(_) => RuntimeError::UnknownMember { name: name.to_string(),
                                                                 found: receiver.value_type(),
                                                                 line },
                _ => RuntimeError::UnknownFunction { name: name.to_string(),
                                                     line },
            });
        };

        if let (FunctionBody::ClassAware(_), Value::Class(class)) = (&function.body, receiver) {
            return self.invoke(&function, args, Some(class), line);
        }

        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(receiver.clone());
        full.extend(args);
        self.invoke(&function, full, None, line)
    }
}
