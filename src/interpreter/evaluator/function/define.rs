use std::sync::Arc;

use tracing::debug;

use crate::{
    ast::{ClassDef, FunctionDef},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        value::{
            class::Class,
            core::Value,
            function::{Function, FunctionKind},
        },
    },
};

impl Interpreter {
    /// Defines a function in the current scope.
    ///
    /// The current scope becomes the function's environment, so the body
    /// sees the variables visible at the definition. Inside a class body the
    /// function becomes a method.
    ///
    /// A definition evaluates to null rather than to the function, so a
    /// block ending in a definition does not keep its scope alive.
    pub(crate) fn define_function(&mut self, def: &FunctionDef) -> Value {
        let kind = if self.current.is_class_scope() {
            FunctionKind::Member
        } else {
            FunctionKind::Free
        };
        let function = Function::interpreted(&def.name,
                                             def.params.clone(),
                                             def.body.clone(),
                                             kind,
                                             Arc::clone(&self.current));
        debug!(function = %def.name, params = def.params.len(), ?kind, line = def.line, "defined function");
        self.current.add_function(Arc::new(function));
        Value::Null
    }

    /// Defines a class in the current scope.
    ///
    /// A class template scope is created, the members of every base class
    /// are copied into it in order, then the body runs inside it. The
    /// template is registered as a named sub-scope, and a constructor of the
    /// same name is registered as a function: calling it copies the template
    /// into a new instance and runs the member function named like the
    /// class, if there is one, against that instance.
    ///
    /// # Parameters
    /// - `def`: The class definition.
    ///
    /// # Returns
    /// Null, or an error if a base class is unknown or the body fails.
    pub(crate) fn define_class(&mut self, def: &ClassDef) -> EvalResult<Value> {
        let template = self.current.child(&def.name, true);

        for base in &def.bases {
            let Some(base_scope) = self.current.find_scope(base) else {
                return Err(RuntimeError::UnknownClass { name: base.clone(),
                                                        line: def.line });
            };
            for (name, value) in base_scope.variables_snapshot() {
                template.set_variable(&name, value.duplicate());
            }
            for function in base_scope.functions_snapshot() {
                template.add_function(function);
            }
        }

        self.with_scope(Arc::clone(&template), |interp| interp.run_statements(&def.body))?;

        self.current.add_scope(&def.name, Arc::clone(&template));
        let constructor =
            Function::class_aware(&def.name, FunctionKind::Constructor, Some(template), construct);
        self.current.add_function(Arc::new(constructor));
        debug!(class = %def.name, bases = ?def.bases, line = def.line, "defined class");

        Ok(Value::Null)
    }
}

/// The body shared by every script-defined constructor.
fn construct(interp: &mut Interpreter,
             instance: Option<&Arc<Class>>,
             args: &[Value],
             _scope: &Arc<Scope>,
             line: usize)
             -> EvalResult<Value> {
    let Some(instance) = instance else {
        return Err(RuntimeError::UnknownClass { name: "<unknown>".to_string(),
                                                line });
    };
    if let Some(initializer) = instance.method(&instance.name) {
        interp.invoke(&initializer, args.to_vec(), Some(instance), line)?;
    }
    Ok(Value::Class(Arc::clone(instance)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::{Expression, Precedence};

    fn int(i: i64) -> Expression {
        Expression::Value { value: Value::Int(i),
                            line:  1, }
    }

    #[test]
    fn functions_capture_their_definition_scope() {
        let mut interp = Interpreter::new();
        let def = FunctionDef { name:   "f".to_string(),
                                params: vec!["a".to_string()],
                                body:   vec![],
                                line:   1, };
        assert_eq!(interp.define_function(&def), Value::Null);

        let f = interp.global().get_function("f").unwrap();
        assert_eq!(f.kind, FunctionKind::Free);
        assert!(Arc::ptr_eq(f.env.as_ref().unwrap(), interp.global()));
    }

    #[test]
    fn unknown_base_class_is_an_error() {
        let mut interp = Interpreter::new();
        let def = ClassDef { name:  "A".to_string(),
                             bases: vec!["Missing".to_string()],
                             body:  vec![],
                             line:  4, };
        assert!(matches!(interp.define_class(&def), Err(RuntimeError::UnknownClass { line: 4, .. })));
    }

    #[test]
    fn constructor_copies_template_members() {
        let mut interp = Interpreter::new();
        let member = Expression::DefineVar { name:        "x".to_string(),
                                             initializer: Some(Box::new(int(3))),
                                             line:        1, };
        let def = ClassDef { name:  "P".to_string(),
                             bases: vec![],
                             body:  vec![member],
                             line:  1, };
        interp.define_class(&def).unwrap();

        let call = Expression::call("P", vec![], Precedence::Func, 2);
        let Value::Class(instance) = interp.eval(&call).unwrap() else {
            panic!("expected a class instance");
        };
        assert_eq!(instance.name, "P");
        assert_eq!(instance.member("x"), Some(Value::Int(3)));
    }
}
