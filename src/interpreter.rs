use crate::ast::{BinaryOperator, Expression, ExpressionKind, Method, Source, Statement};
use crate::callable::{Callable, Function};
use crate::environment::{Environment, EnvironmentError, ScopeId};
use crate::types::Type;
use crate::value::{divide_decimal, Value};
use num_traits::Zero;
use std::cmp::Ordering;
use std::io::{self, Stdout, Write};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Runtime Error: expected {expected}, received {found}.")]
    TypeMismatch { expected: String, found: String },
    #[error("Runtime Error: {receiver} has no member '{name}'.")]
    UndefinedMember { receiver: String, name: String },
    #[error("Runtime Error: Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Runtime Error: Division by zero.")]
    DivisionByZero,
    #[error("Runtime Error: {0}")]
    Environment(#[from] EnvironmentError),
    #[error("Runtime Error: failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn mismatch(expected: &str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name(),
    }
}

/// How a statement finished. `Return` carries the value up to the nearest
/// enclosing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree-walking evaluator. Output of the built-in functions goes to `W`.
pub struct Interpreter<'a, W: Write = Stdout> {
    pub environment: Environment<'a>,
    output: W,
}

impl<'a> Interpreter<'a, Stdout> {
    pub fn new() -> Interpreter<'a, Stdout> {
        Interpreter::with_output(io::stdout())
    }
}

impl<'a, W: Write> Interpreter<'a, W> {
    pub fn with_output(output: W) -> Interpreter<'a, W> {
        Interpreter::with_environment(Environment::new(), output)
    }
    /// Runs against a host-prepared environment. Program fields and methods
    /// go in a scope nested inside the environment's current one.
    pub fn with_environment(mut environment: Environment<'a>, output: W) -> Interpreter<'a, W> {
        environment.start_block();
        Interpreter {
            environment,
            output,
        }
    }
    pub fn output(&self) -> &W {
        &self.output
    }
    pub fn into_output(self) -> W {
        self.output
    }
    /// Initializes the fields in order, defines every method, then calls
    /// `main/0` and returns its result.
    pub fn interpret(&mut self, source: &'a Source) -> Result<Value, RuntimeError> {
        for field in &source.fields {
            let value = match &field.value {
                Some(value) => self.evaluate(value)?,
                None => Value::Nil,
            };
            let ty = self.declared_type(&field.type_name);
            self.environment.define_variable(&field.name, ty, value)?;
        }
        for method in &source.methods {
            let function = self.function(method);
            self.environment.define_function(function)?;
        }
        debug!(
            fields = source.fields.len(),
            methods = source.methods.len(),
            "program loaded"
        );
        let main = self.environment.lookup_function("main", 0)?.clone();
        self.call(&main, Vec::new())
    }
    fn function(&self, method: &'a Method) -> Function<'a> {
        Function {
            name: method.name.clone(),
            parameter_types: method
                .parameter_type_names
                .iter()
                .map(|name| self.declared_type(name))
                .collect(),
            return_type: match &method.return_type_name {
                Some(name) => self.declared_type(name),
                None => Type::Nil,
            },
            callable: Callable::Defined {
                method,
                closure: self.environment.current(),
            },
        }
    }
    fn declared_type(&self, name: &str) -> Type {
        self.environment.lookup_type(name).unwrap_or(Type::Any)
    }
    pub fn execute(&mut self, statement: &'a Statement) -> Result<Flow, RuntimeError> {
        match statement {
            Statement::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Statement::Declaration {
                id: _,
                name,
                type_name,
                value,
            } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                let ty = match type_name {
                    Some(type_name) => self.declared_type(type_name),
                    None => Type::Any,
                };
                self.environment.define_variable(name, ty, value)?;
            }
            Statement::Assignment { receiver, value } => match &receiver.kind {
                ExpressionKind::Access {
                    receiver: None,
                    name,
                } => {
                    let value = self.evaluate(value)?;
                    self.environment.assign(name, value)?;
                }
                ExpressionKind::Access {
                    receiver: Some(object),
                    name,
                } => {
                    let object = self.evaluate(object)?;
                    let value = self.evaluate(value)?;
                    match object {
                        Value::Object(object) => object.set(name, value)?,
                        other => return Err(mismatch("an object", &other)),
                    }
                }
                _ => return Err(RuntimeError::InvalidAssignmentTarget),
            },
            Statement::If {
                condition,
                then_statements,
                else_statements,
            } => {
                let branch = if self.condition(condition)? {
                    then_statements
                } else {
                    else_statements
                };
                return self.execute_block(self.environment.current(), Vec::new(), branch);
            }
            Statement::For {
                name,
                value,
                statements,
            } => {
                let items = match self.evaluate(value)? {
                    Value::Iterable(items) => items,
                    other => return Err(mismatch("IntegerIterable", &other)),
                };
                for item in items {
                    let bindings = vec![(name.as_str(), Type::Integer, Value::Integer(item))];
                    let flow =
                        self.execute_block(self.environment.current(), bindings, statements)?;
                    if let Flow::Return(_) = flow {
                        return Ok(flow);
                    }
                }
            }
            Statement::While {
                condition,
                statements,
            } => {
                while self.condition(condition)? {
                    let flow =
                        self.execute_block(self.environment.current(), Vec::new(), statements)?;
                    if let Flow::Return(_) = flow {
                        return Ok(flow);
                    }
                }
            }
            Statement::Return(value) => return Ok(Flow::Return(self.evaluate(value)?)),
        }
        Ok(Flow::Normal)
    }
    fn condition(&mut self, condition: &'a Expression) -> Result<bool, RuntimeError> {
        match self.evaluate(condition)? {
            Value::Boolean(x) => Ok(x),
            other => Err(mismatch("Boolean", &other)),
        }
    }
    /// Runs `statements` in a new scope under `parent`, holding `bindings`.
    /// The scope is popped on every exit path.
    pub fn execute_block(
        &mut self,
        parent: ScopeId,
        bindings: Vec<(&str, Type, Value)>,
        statements: &'a [Statement],
    ) -> Result<Flow, RuntimeError> {
        self.environment.enter(parent);
        let result = self.execute_scoped(bindings, statements);
        self.environment.end_block();
        result
    }
    fn execute_scoped(
        &mut self,
        bindings: Vec<(&str, Type, Value)>,
        statements: &'a [Statement],
    ) -> Result<Flow, RuntimeError> {
        for (name, ty, value) in bindings {
            self.environment.define_variable(name, ty, value)?;
        }
        for statement in statements {
            let flow = self.execute(statement)?;
            if let Flow::Return(_) = flow {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }
    pub fn evaluate(&mut self, expr: &'a Expression) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExpressionKind::Literal(literal) => Ok(Value::from(literal)),
            ExpressionKind::Group(inner) => self.evaluate(inner),
            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => self.binary(*operator, left, right),
            ExpressionKind::Access {
                receiver: None,
                name,
            } => Ok(self.environment.lookup_variable(name)?.value.clone()),
            ExpressionKind::Access {
                receiver: Some(receiver),
                name,
            } => match self.evaluate(receiver)? {
                Value::Object(object) => object.get(name),
                other => Err(RuntimeError::UndefinedMember {
                    receiver: other.to_string(),
                    name: name.clone(),
                }),
            },
            ExpressionKind::Function {
                receiver: None,
                name,
                arguments,
            } => {
                let arguments = self.arguments(arguments)?;
                let function = self
                    .environment
                    .lookup_function(name, arguments.len())?
                    .clone();
                self.call(&function, arguments)
            }
            ExpressionKind::Function {
                receiver: Some(receiver),
                name,
                arguments,
            } => {
                let receiver = self.evaluate(receiver)?;
                let mut arguments = self.arguments(arguments)?;
                let object = match &receiver {
                    Value::Object(object) => object,
                    other => {
                        return Err(RuntimeError::UndefinedMember {
                            receiver: other.to_string(),
                            name: name.clone(),
                        })
                    }
                };
                let method = object
                    .type_of()
                    .method(name, arguments.len())
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedMember {
                        receiver: object.to_string(),
                        name: name.clone(),
                    })?;
                arguments.insert(0, receiver.clone());
                self.call(&method, arguments)
            }
        }
    }
    fn arguments(&mut self, arguments: &'a [Expression]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }
        Ok(values)
    }
    fn call(
        &mut self,
        function: &Function<'a>,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match &function.callable {
            Callable::Native(native) => (native.call)(&mut self.output, &arguments),
            Callable::Defined { method, closure } => {
                let method: &'a Method = *method;
                trace!(method = %method.name, "calling");
                let bindings = method
                    .parameters
                    .iter()
                    .map(String::as_str)
                    .zip(function.parameter_types.iter().cloned())
                    .zip(arguments)
                    .map(|((name, ty), value)| (name, ty, value))
                    .collect();
                match self.execute_block(*closure, bindings, &method.statements)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
        }
    }
    fn binary(
        &mut self,
        operator: BinaryOperator,
        left: &'a Expression,
        right: &'a Expression,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        match operator {
            BinaryOperator::And | BinaryOperator::Or => {
                let short_circuit = match left {
                    Value::Boolean(x) => x == (operator == BinaryOperator::Or),
                    _ => return Err(mismatch("Boolean", &left)),
                };
                if short_circuit {
                    return Ok(left);
                }
                match self.evaluate(right)? {
                    Value::Boolean(x) => Ok(Value::Boolean(x)),
                    other => Err(mismatch("Boolean", &other)),
                }
            }
            BinaryOperator::EqualEqual => Ok(Value::Boolean(equals(&left, &self.evaluate(right)?))),
            BinaryOperator::BangEqual => Ok(Value::Boolean(!equals(&left, &self.evaluate(right)?))),
            BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => {
                let right = self.evaluate(right)?;
                let ordering = compare(&left, &right)?;
                Ok(Value::Boolean(match operator {
                    BinaryOperator::Less => ordering == Ordering::Less,
                    BinaryOperator::LessEqual => ordering != Ordering::Greater,
                    BinaryOperator::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            _ => {
                let right = self.evaluate(right)?;
                arithmetic(operator, &left, &right)
            }
        }
    }
}

/// Value equality. Decimals are equal only when their scales match too, so
/// `1.0 == 1.00` is false while `1.0 < 1.00` and `1.0 > 1.00` are both false.
fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Decimal(l), Value::Decimal(r)) => {
            l == r && l.as_bigint_and_exponent().1 == r.as_bigint_and_exponent().1
        }
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Result<Ordering, RuntimeError> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Ok(l.cmp(r)),
        (Value::Decimal(l), Value::Decimal(r)) => Ok(l.cmp(r)),
        (Value::Character(l), Value::Character(r)) => Ok(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        (Value::Integer(_), _)
        | (Value::Decimal(_), _)
        | (Value::Character(_), _)
        | (Value::String(_), _) => Err(mismatch(&left.type_name(), right)),
        _ => Err(mismatch("a comparable value", left)),
    }
}

fn arithmetic(
    operator: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, RuntimeError> {
    match (operator, left, right) {
        (BinaryOperator::Plus, Value::String(_), _)
        | (BinaryOperator::Plus, _, Value::String(_)) => {
            Ok(Value::String(format!("{}{}", left, right)))
        }
        (BinaryOperator::Plus, Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l + r)),
        (BinaryOperator::Minus, Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l - r)),
        (BinaryOperator::Star, Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l * r)),
        (BinaryOperator::Slash, Value::Integer(l), Value::Integer(r)) => {
            if r.is_zero() {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Integer(l / r))
            }
        }
        (BinaryOperator::Plus, Value::Decimal(l), Value::Decimal(r)) => Ok(Value::Decimal(l + r)),
        (BinaryOperator::Minus, Value::Decimal(l), Value::Decimal(r)) => Ok(Value::Decimal(l - r)),
        (BinaryOperator::Star, Value::Decimal(l), Value::Decimal(r)) => Ok(Value::Decimal(l * r)),
        (BinaryOperator::Slash, Value::Decimal(l), Value::Decimal(r)) => divide_decimal(l, r)
            .map(Value::Decimal)
            .ok_or(RuntimeError::DivisionByZero),
        (_, Value::Integer(_), _) | (_, Value::Decimal(_), _) => {
            Err(mismatch(&left.type_name(), right))
        }
        _ => Err(mismatch("Integer or Decimal", left)),
    }
}
