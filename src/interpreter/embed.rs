use std::{path::Path, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
    error::{Error, RuntimeError},
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            function::core::register_builtins,
        },
        lexer::{Token, tokenize},
        module::Module,
        parser::statement::StatementParser,
        scope::Scope,
        value::{
            class::Class,
            core::Value,
            function::{Function, FunctionKind},
        },
    },
};

impl Interpreter {
    /// Registers a native function in the global scope.
    ///
    /// A function registered under an existing name replaces it.
    ///
    /// # Example
    /// ```
    /// use sable::{Interpreter, Value};
    ///
    /// let mut interp = Interpreter::new();
    /// interp.register_function("twice", |args, _line| {
    ///           Ok(Value::Int(2 * args.len() as i64))
    ///       });
    ///
    /// assert_eq!(interp.run_script("twice(1, 2, 3);").unwrap(), Value::Int(6));
    /// ```
    pub fn register_function(&mut self,
                             name: &str,
                             callback: impl Fn(&[Value], usize) -> EvalResult<Value>
                                 + Send
                                 + Sync
                                 + 'static) {
        self.global.add_function(Arc::new(Function::native(name, callback)));
        debug!(function = name, "registered native");
    }

    /// Registers a native function that receives the interpreter and its
    /// call scope, so it can call back into script code.
    pub fn register_scoped_function(&mut self,
                                    name: &str,
                                    callback: impl Fn(&mut Interpreter,
                                       &[Value],
                                       &Arc<Scope>,
                                       usize) -> EvalResult<Value>
                                        + Send
                                        + Sync
                                        + 'static) {
        self.global.add_function(Arc::new(Function::scoped(name, callback)));
        debug!(function = name, "registered scoped native");
    }

    /// Registers a native function that receives the class instance it is
    /// called on.
    ///
    /// Called as a member (`instance.name(args)`) the instance is passed;
    /// called as a plain function it is `None`.
    pub fn register_class_function(&mut self,
                                   name: &str,
                                   callback: impl Fn(&mut Interpreter,
                                      Option<&Arc<Class>>,
                                      &[Value],
                                      &Arc<Scope>,
                                      usize) -> EvalResult<Value>
                                       + Send
                                       + Sync
                                       + 'static) {
        let function = Function::class_aware(name, FunctionKind::Free, None, callback);
        self.global.add_function(Arc::new(function));
        debug!(function = name, "registered class-aware native");
    }

    /// Installs a module if the configuration grants every privilege it
    /// requires.
    ///
    /// # Returns
    /// `true` if the module's functions were installed, `false` if it was
    /// withheld.
    pub fn register_module(&mut self, module: Module) -> bool {
        if !module.is_allowed(self.config.privileges) {
            warn!(module = module.name(),
                  required = ?module.required(),
                  granted = ?self.config.privileges,
                  "module withheld");
            return false;
        }

        let name = module.name().to_string();
        let functions = module.into_functions();
        info!(module = %name, functions = functions.len(), "module installed");
        for function in functions {
            self.global.add_function(Arc::new(function));
        }
        true
    }

    /// Submits one chunk of source, usually a line, to the incremental
    /// parser.
    ///
    /// Statements are evaluated as soon as they are complete; a statement
    /// may span several submissions. On an error the message is logged (and
    /// printed to standard error unless disabled in the configuration), all
    /// partial input is discarded and evaluation returns to the global scope.
    /// Later submissions are unaffected. A held-back `if` chain that fails
    /// when this submission releases it does not discard this submission's
    /// own statements.
    ///
    /// # Returns
    /// `true` if an error occurred. The error is kept in
    /// [`last_error`](Self::last_error).
    ///
    /// # Example
    /// ```
    /// use sable::{Config, Interpreter, Value};
    ///
    /// let mut interp = Interpreter::with_config(Config::default().with_echo_errors(false));
    /// assert!(!interp.submit_line("var i = 1;"));
    /// assert!(interp.submit_line("i = nosuch(1);"));
    /// assert!(!interp.submit_line("i = i + 1;"));
    ///
    /// assert_eq!(interp.resolve_variable("i"), Value::Int(2));
    /// ```
    pub fn submit_line(&mut self, source: &str) -> bool {
        let first_line = self.next_line;
        self.next_line += source.lines().count().max(1);

        let mut parser = std::mem::take(&mut self.parser);
        let result = tokenize(source, first_line).map_err(Error::from)
                                                 .and_then(|tokens| {
                                                     self.feed_submission(&mut parser, tokens, first_line)
                                                 });
        self.parser = parser;

        match result {
            Ok(false) => {
                self.last_error = None;
                false
            },
            Ok(true) => true,
            Err(error) => {
                self.recover(error);
                true
            },
        }
    }

    /// Feeds one submission, executing statements as they complete.
    ///
    /// A statement that began in an earlier submission, such as an `if`
    /// chain released by this submission's first token, fails on its own:
    /// the error is reported and the remaining tokens are still fed. Any
    /// other error aborts the submission.
    ///
    /// # Returns
    /// `true` if an earlier statement failed and was reported.
    fn feed_submission(&mut self,
                       parser: &mut StatementParser,
                       tokens: Vec<(Token, usize)>,
                       first_line: usize)
                       -> Result<bool, Error> {
        let mut failed = false;

        for (token, line) in tokens {
            parser.feed(token, line)?;
            for statement in parser.take_ready() {
                match self.execute(&statement) {
                    Ok(_) => {},
                    Err(error) if statement.line() < first_line => {
                        self.report(error.into());
                        failed = true;
                    },
                    Err(error) => return Err(error.into()),
                }
            }
        }

        Ok(failed)
    }

    fn recover(&mut self, error: Error) {
        self.parser.reset();
        self.report(error);
    }

    fn report(&mut self, error: Error) {
        warn!(%error, "recovering from error");
        if self.config.echo_errors {
            eprintln!("{error}");
        }
        self.current = Arc::clone(&self.global);
        self.last_error = Some(error);
    }

    /// Evaluates a complete script.
    ///
    /// Unlike [`submit_line`](Self::submit_line), an error is returned to
    /// the caller. Definitions made by statements that completed before the
    /// error stay in place.
    ///
    /// # Returns
    /// The value of the last statement.
    ///
    /// # Errors
    /// The first syntax or runtime error, or `UnexpectedEndOfInput` if a
    /// construct is left open at the end of the script.
    pub fn run_script(&mut self, source: &str) -> Result<Value, Error> {
        let tokens = tokenize(source, 1)?;
        let mut parser = StatementParser::new();
        let result = self.feed_tokens(&mut parser, tokens, true);
        if result.is_err() {
            self.current = Arc::clone(&self.global);
        }
        result
    }

    /// Reads and evaluates a script file.
    ///
    /// # Errors
    /// `Error::Io` if the file cannot be read, otherwise as
    /// [`run_script`](Self::run_script).
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<Value, Error> {
        let path = path.as_ref();
        info!(path = %path.display(), "running file");
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(),
                                                                                source })?;
        self.run_script(&source)
    }

    /// Feeds tokens to `parser`, evaluating each statement as soon as it is
    /// complete.
    ///
    /// With `flush` the end of input is signalled afterwards, which
    /// completes a trailing statement and reports unclosed constructs.
    pub(crate) fn feed_tokens(&mut self,
                              parser: &mut StatementParser,
                              tokens: Vec<(Token, usize)>,
                              flush: bool)
                              -> Result<Value, Error> {
        let mut last = Value::Null;

        for (token, line) in tokens {
            parser.feed(token, line)?;
            for statement in parser.take_ready() {
                last = self.execute(&statement)?;
            }
        }

        if flush {
            parser.flush()?;
            for statement in parser.take_ready() {
                last = self.execute(&statement)?;
            }
        }

        Ok(last)
    }

    /// Looks a name up in the global scope.
    ///
    /// # Returns
    /// The variable's value, a function value if only a function of that
    /// name exists, or null.
    #[must_use]
    pub fn resolve_variable(&self, name: &str) -> Value {
        self.global.find_variable(name).unwrap_or(Value::Null)
    }

    /// Calls a function value from the host.
    ///
    /// A string is accepted too and names a function in the global scope.
    ///
    /// # Errors
    /// `NotCallable` for other values, `UnknownFunction` for an unknown
    /// name, or any error raised by the function itself.
    ///
    /// # Example
    /// ```
    /// use sable::{Interpreter, Value};
    ///
    /// let mut interp = Interpreter::new();
    /// interp.run_script("func add(a, b) { return a + b; }").unwrap();
    ///
    /// let add = interp.resolve_variable("add");
    /// let sum = interp.call_function(&add, vec![Value::Int(2), Value::Int(40)]).unwrap();
    /// assert_eq!(sum, Value::Int(42));
    /// ```
    pub fn call_function(&mut self, function: &Value, args: Vec<Value>) -> Result<Value, Error> {
        let function = match function {
            Value::Function(function) => Arc::clone(function),
            Value::String(name) => {
                self.global
                    .find_function(name)
                    .ok_or_else(|| RuntimeError::UnknownFunction { name: name.clone(),
                                                                   line: 0 })?
            },
            other => {
                return Err(RuntimeError::NotCallable { found: other.value_type(),
                                                       line:  0, }.into());
            },
        };
        Ok(self.invoke(&function, args, None, 0)?)
    }

    /// Discards every definition and all partial input.
    ///
    /// The global scope is torn down and replaced by a fresh one holding
    /// only the builtins. Host functions and modules have to be registered
    /// again.
    pub fn reset(&mut self) {
        self.global.teardown();
        self.release_retained();
        self.global = Scope::global();
        register_builtins(&self.global);
        self.current = Arc::clone(&self.global);
        self.parser.reset();
        self.next_line = 1;
        self.last_error = None;
        info!("interpreter reset");
    }

    /// The error of the most recent [`submit_line`](Self::submit_line) call,
    /// if it failed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// `true` when no statement is partially submitted.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.parser.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::Config, interpreter::module::Privileges};

    fn quiet() -> Interpreter {
        Interpreter::with_config(Config::default().with_echo_errors(false))
    }

    #[test]
    fn statements_may_span_submissions() {
        let mut interp = quiet();
        assert!(!interp.submit_line("func f(a) {"));
        assert!(!interp.is_idle());
        assert!(!interp.submit_line("return a * 2; }"));
        assert!(!interp.submit_line("var r = f(21);"));
        assert_eq!(interp.resolve_variable("r"), Value::Int(42));
    }

    #[test]
    fn syntax_error_discards_partial_input() {
        let mut interp = quiet();
        assert!(interp.submit_line("var x = 1 2;"));
        assert!(matches!(interp.last_error(), Some(Error::Parse(_))));
        assert!(interp.is_idle());
        assert!(!interp.submit_line("var y = 3;"));
        assert_eq!(interp.resolve_variable("y"), Value::Int(3));
    }

    #[test]
    fn failing_held_back_if_keeps_the_next_statement() {
        let mut interp = quiet();
        assert!(!interp.submit_line("if (true) { nosuch(); }"));
        assert!(interp.submit_line("j = 2;"));
        assert_eq!(interp.last_error().map(Error::line), Some(1));
        assert_eq!(interp.resolve_variable("j"), Value::Int(2));

        assert!(!interp.submit_line("k = 3;"));
        assert_eq!(interp.resolve_variable("k"), Value::Int(3));
        assert!(interp.last_error().is_none());
    }

    #[test]
    fn closures_are_freed_with_the_interpreter() {
        let mut interp = quiet();
        interp.run_script("func make(n) { func add(x) { return x + n; } return add; }
                           var add_two = make(2);")
              .unwrap();
        let Value::Function(add) = interp.resolve_variable("add_two") else {
            panic!("expected a function");
        };
        let closure = Arc::downgrade(&add);
        drop(add);
        assert!(closure.upgrade().is_some());

        drop(interp);
        assert!(closure.upgrade().is_none());
    }

    #[test]
    fn reset_frees_closures() {
        let mut interp = quiet();
        interp.run_script("func make() { var x = 3; if (true) { func inner() { return x; } return inner; } }
                           var f = make();")
              .unwrap();
        let Value::Function(inner) = interp.resolve_variable("f") else {
            panic!("expected a function");
        };
        let closure = Arc::downgrade(&inner);
        drop(inner);

        interp.reset();
        assert!(closure.upgrade().is_none());
        assert!(interp.retained.is_empty());
    }

    #[test]
    fn error_lines_keep_counting_across_submissions() {
        let mut interp = quiet();
        interp.submit_line("var a = 1;");
        interp.submit_line("var b = 2;");
        assert!(interp.submit_line("nosuch();"));
        assert_eq!(interp.last_error().map(Error::line), Some(3));
    }

    #[test]
    fn run_script_propagates_errors() {
        let mut interp = quiet();
        assert!(interp.run_script("var a = 1; a = nosuch();").is_err());
        assert_eq!(interp.resolve_variable("a"), Value::Int(1));
        assert!(matches!(interp.run_script("func f() {"),
                         Err(Error::Parse(crate::error::ParseError::UnexpectedEndOfInput { .. }))));
    }

    #[test]
    fn run_file_reports_missing_files() {
        let mut interp = quiet();
        assert!(matches!(interp.run_file("definitely/not/here.sbl"), Err(Error::Io { .. })));
    }

    #[test]
    fn modules_need_their_privileges() {
        let module = || {
            Module::new("io").requires(Privileges::FILE_IO)
                             .function("touch", |_, _| Ok(Value::Int(1)))
        };

        let mut denied = quiet();
        assert!(!denied.register_module(module()));
        assert!(denied.run_script("touch();").is_err());

        let mut granted =
            Interpreter::with_config(Config::default().with_privileges(Privileges::FILE_IO));
        assert!(granted.register_module(module()));
        assert_eq!(granted.run_script("touch();").unwrap(), Value::Int(1));
    }

    #[test]
    fn class_functions_receive_the_instance() {
        let mut interp = quiet();
        interp.register_class_function("name_of", |_, this, _, _, _| {
                  Ok(this.map_or(Value::Null, |class| Value::from(class.name.as_str())))
              });
        let result = interp.run_script("class Dog { var legs = 4; } var d = Dog(); d.name_of();")
                           .unwrap();
        assert_eq!(result, Value::from("Dog"));
        assert_eq!(interp.run_script("name_of();").unwrap(), Value::Null);
    }

    #[test]
    fn reset_forgets_definitions() {
        let mut interp = quiet();
        interp.run_script("var kept = 5;").unwrap();
        interp.reset();
        assert_eq!(interp.resolve_variable("kept"), Value::Null);
        assert_eq!(interp.run_script("len(\"abc\");").unwrap(), Value::Int(3));
    }
}
