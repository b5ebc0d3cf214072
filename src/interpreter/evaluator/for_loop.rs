use tracing::trace;

use crate::{
    ast::Expression,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Flow, Interpreter},
        value::core::Value,
    },
};

impl Interpreter {
    /// Evaluates a `for` or `while` loop.
    ///
    /// The loop runs in one scope of its own: `init` runs once, then `test`
    /// is checked before every iteration and `iterate` runs after it. A
    /// missing test counts as true. A `return` inside the body ends the loop
    /// and propagates.
    ///
    /// # Returns
    /// The value of the last statement of the last iteration, or null if
    /// the body never ran.
    pub(crate) fn eval_loop(&mut self,
                            init: Option<&Expression>,
                            test: Option<&Expression>,
                            iterate: Option<&Expression>,
                            body: &[Expression])
                            -> EvalResult<Flow> {
        let scope = self.current.child("loop", false);

        self.with_scope(scope, |interp| {
                if let Some(init) = init {
                    interp.eval(init)?;
                }

                let mut last = Value::Null;
                let mut iterations = 0_usize;
                loop {
                    if let Some(test) = test
                       && !interp.eval_resolved(test)?.is_truthy()
                    {
                        break;
                    }
                    match interp.run_statements(body)? {
                        Flow::Normal(value) => last = value,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                    if let Some(iterate) = iterate {
                        interp.eval(iterate)?;
                    }
                    iterations += 1;
                }

                trace!(iterations, "loop finished");
                Ok(Flow::Normal(last))
            })
    }

    /// Evaluates a `foreach` loop.
    ///
    /// The source is evaluated once and its elements are snapshotted, so the
    /// body may modify the collection without affecting the iteration. Lists
    /// and arrays yield their elements, dictionaries their keys in key order,
    /// strings their characters. Iterating null runs the body zero times.
    pub(crate) fn eval_foreach(&mut self,
                               variable: &str,
                               source: &Expression,
                               body: &[Expression],
                               line: usize)
                               -> EvalResult<Flow> {
        let items = match self.eval_resolved(source)? {
            Value::Null => Vec::new(),
            Value::List(items) => items.read().clone(),
            Value::Array(array) => array.read().to_values(),
            Value::Dictionary(dictionary) => dictionary.read().keys(),
            Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
            other => {
                return Err(RuntimeError::TypeError { details: format!("cannot iterate over a \
                                                                       value of type {}",
                                                                      other.value_type()),
                                                     line });
            },
        };

        let scope = self.current.child("foreach", false);
        self.with_scope(scope, |interp| {
                let mut last = Value::Null;
                for item in items {
                    interp.current.set_variable(variable, item);
                    match interp.run_statements(body)? {
                        Flow::Normal(value) => last = value,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal(last))
            })
    }
}
