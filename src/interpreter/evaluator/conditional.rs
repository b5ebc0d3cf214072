use crate::{
    ast::IfBranch,
    interpreter::{
        evaluator::core::{EvalResult, Flow, Interpreter},
        value::core::Value,
    },
};

impl Interpreter {
    /// Evaluates an `if` / `else if` / `else` chain.
    ///
    /// Tests are evaluated in order in the enclosing scope; the first branch
    /// whose test is absent or truthy runs in a fresh scope. When no branch
    /// runs the chain evaluates to null.
    pub(crate) fn eval_if_else(&mut self, branches: &[IfBranch]) -> EvalResult<Flow> {
        for branch in branches {
            let taken = match &branch.test {
                Some(test) => self.eval_resolved(test)?.is_truthy(),
                None => true,
            };
            if taken {
                let scope = self.current.child("if", false);
                return self.with_scope(scope, |interp| interp.run_statements(&branch.body));
            }
        }

        Ok(Flow::Normal(Value::Null))
    }
}
