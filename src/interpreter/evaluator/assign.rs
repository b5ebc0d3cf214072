use std::sync::Arc;

use tracing::trace;

use crate::{
    ast::{AssignOperator, BinaryOperator, Expression},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::{collection::append_in_place, core::eval_binary},
            core::{EvalResult, Interpreter},
        },
        scope::Scope,
        value::{
            array::ArrayMember,
            core::{Value, ValueType},
            vec3::Vec3,
        },
    },
    util::num::index_checked,
};

/// Where an assignment writes to.
#[derive(Debug)]
enum Place {
    /// A variable in a particular scope.
    Variable { scope: Arc<Scope>, name: String },
    /// An element of a shared collection, or a class member.
    Element(ArrayMember),
    /// One component of a vector stored in another place. Vectors are plain
    /// values, so the whole vector is written back.
    Component { container: Box<Place>, index: usize },
    /// A computed value; it can be indexed into but not assigned.
    Temporary(Value),
}

impl Place {
    fn read(&self, line: usize) -> EvalResult<Value> {
        match self {
            Self::Variable { scope, name } => Ok(scope.get_variable(name).unwrap_or(Value::Null)),
            Self::Element(member) => member.get(line),
            Self::Component { container, index } => {
                let vector = expect_vec3(&container.read(line)?, line)?;
                Ok(vector.component(*index).map_or(Value::Null, Value::Float))
            },
            Self::Temporary(value) => Ok(value.clone()),
        }
    }

    fn write(&self, value: Value, line: usize) -> EvalResult<()> {
        match self {
            Self::Variable { scope, name } => {
                trace!(variable = %name, scope = scope.name(), "assign");
                scope.set_variable(name, value);
                Ok(())
            },
            Self::Element(member) => member.set(value, line),
            Self::Component { container, index } => {
                let vector = expect_vec3(&container.read(line)?, line)?;
                let Value::Float(component) = value.hardconvert(ValueType::Float, line)? else {
                    return Err(RuntimeError::InvalidAssignmentTarget { line });
                };
                let updated = vector.with_component(*index, component)
                                    .ok_or(RuntimeError::IndexOutOfBounds { index: 3, len: 3, line })?;
                container.write(Value::Vec3(updated), line)
            },
            Self::Temporary(_) => Err(RuntimeError::InvalidAssignmentTarget { line }),
        }
    }
}

fn expect_vec3(value: &Value, line: usize) -> EvalResult<Vec3> {
    match value {
        Value::Vec3(v) => Ok(*v),
        other => Err(RuntimeError::TypeError { details: format!("expected a vec3, found {}",
                                                                other.value_type()),
                                               line }),
    }
}

impl Interpreter {
    /// Evaluates an assignment operator call.
    ///
    /// The first argument is evaluated as a place. For `=` the right-hand
    /// value is stored as is; compound operators combine the current value
    /// with the right-hand value first. `+=` on a collection handle appends
    /// into the shared storage instead of building a new collection.
    ///
    /// # Parameters
    /// - `op`: The assignment operator.
    /// - `arguments`: Target and, except for `++`/`--`, the right-hand side.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The value that was stored.
    pub(crate) fn eval_assignment(&mut self,
                                  op: AssignOperator,
                                  arguments: &[Expression],
                                  line: usize)
                                  -> EvalResult<Value> {
        let value = match (op, arguments) {
            (AssignOperator::Increment | AssignOperator::Decrement, [target]) => {
                let place = self.eval_place(target, line)?;
                let current = place.read(line)?;
                let step = if op == AssignOperator::Increment {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Sub
                };
                let value = eval_binary(step, &current, &Value::Int(1), line)?;
                place.write(value.clone(), line)?;
                value
            },
            (AssignOperator::Increment | AssignOperator::Decrement, _) => {
                return Err(RuntimeError::ArgumentCountMismatch { name: symbol(op).to_string(),
                                                                 found: arguments.len(),
                                                                 line });
            },
            (_, [target, source]) => {
                let place = self.eval_place(target, line)?;
                let rhs = self.eval_resolved(source)?;
                let value = match op.arithmetic() {
                    None => rhs,
                    Some(BinaryOperator::Add) => append_in_place(&place.read(line)?, &rhs, line)?,
                    Some(arithmetic) => eval_binary(arithmetic, &place.read(line)?, &rhs, line)?,
                };
                place.write(value.clone(), line)?;
                value
            },
            _ => {
                return Err(RuntimeError::ArgumentCountMismatch { name: symbol(op).to_string(),
                                                                 found: arguments.len(),
                                                                 line });
            },
        };

        Ok(value)
    }

    fn eval_place(&mut self, target: &Expression, line: usize) -> EvalResult<Place> {
        match target {
            Expression::ResolveVar { name, .. } => {
                let scope = self.current
                                .find_variable_scope(name)
                                .unwrap_or_else(|| Arc::clone(&self.current));
                Ok(Place::Variable { scope,
                                     name: name.clone() })
            },
            Expression::DefineVar { name, .. } => {
                self.eval(target)?;
                Ok(Place::Variable { scope: Arc::clone(&self.current),
                                     name:  name.clone(), })
            },
            Expression::FunctionCall { arguments, .. }
                if target.callee_name() == Some("listindex") && arguments.len() == 2 =>
            {
                let container = self.eval_place(&arguments[0], line)?;
                let key = self.eval_resolved(&arguments[1])?;
                match container.read(line)? {
                    Value::Vec3(_) => {
                        let index = match &key {
                            Value::String(name) => Vec3::component_index(name).ok_or_else(|| {
                                                       RuntimeError::UnknownMember { name: name.clone(),
                                                                                     found: ValueType::Vec3,
                                                                                     line }
                                                   })?,
                            other => index_checked(other, 3, line)?,
                        };
                        Ok(Place::Component { container: Box::new(container),
                                              index })
                    },
                    collection => Ok(Place::Element(ArrayMember::new(collection, key))),
                }
            },
            other => match self.eval(other)? {
                Value::ArrayMember(member) => Ok(Place::Element(member)),
                value => Ok(Place::Temporary(value)),
            },
        }
    }
}

const fn symbol(op: AssignOperator) -> &'static str {
    match op {
        AssignOperator::Assign => "=",
        AssignOperator::AddAssign => "+=",
        AssignOperator::SubAssign => "-=",
        AssignOperator::MulAssign => "*=",
        AssignOperator::DivAssign => "/=",
        AssignOperator::Increment => "++",
        AssignOperator::Decrement => "--",
    }
}
