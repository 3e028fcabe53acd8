use crate::ast::{
    BinaryOperator, Expression, ExpressionKind, Field, Literal, Method, NodeId, Source, Statement,
};
use crate::callable::{Callable, Function};
use crate::environment::{Environment, EnvironmentError, Variable};
use crate::types::Type;
use crate::value::Value;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;
use std::mem;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Type Error: {message}")]
pub struct TypeError {
    pub message: String,
}

impl TypeError {
    fn new(message: impl Into<String>) -> TypeError {
        TypeError {
            message: message.into(),
        }
    }
}

impl From<EnvironmentError> for TypeError {
    fn from(err: EnvironmentError) -> TypeError {
        TypeError::new(err.to_string())
    }
}

/// Results of analysis, keyed by node. Every analyzed expression has a type;
/// declarations and accesses have the variable they bind or read; calls and
/// methods have the function they resolve to.
#[derive(Debug, Default)]
pub struct Annotations<'a> {
    types: BTreeMap<NodeId, Type>,
    variables: BTreeMap<NodeId, Variable>,
    functions: BTreeMap<NodeId, Function<'a>>,
}

impl<'a> Annotations<'a> {
    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }
    pub fn variable(&self, id: NodeId) -> Option<&Variable> {
        self.variables.get(&id)
    }
    pub fn function(&self, id: NodeId) -> Option<&Function<'a>> {
        self.functions.get(&id)
    }
}

/// Succeeds when a value of type `source` may be stored where `target` is
/// expected.
pub fn require_assignable(target: &Type, source: &Type) -> Result<(), TypeError> {
    let assignable = target == source
        || match target {
            Type::Any => true,
            Type::Comparable => matches!(
                source,
                Type::Integer | Type::Decimal | Type::Character | Type::String
            ),
            _ => false,
        };
    if assignable {
        Ok(())
    } else {
        Err(TypeError::new(format!(
            "{} is not assignable to {}.",
            source, target
        )))
    }
}

pub struct Analyzer<'a> {
    pub environment: Environment<'a>,
    annotations: Annotations<'a>,
    return_type: Option<Type>,
}

impl<'a> Default for Analyzer<'a> {
    fn default() -> Self {
        Analyzer::new()
    }
}

impl<'a> Analyzer<'a> {
    pub fn new() -> Analyzer<'a> {
        Analyzer::with_environment(Environment::new())
    }
    /// Analyzes against a host-prepared environment. Program fields and
    /// methods go in a scope nested inside the environment's current one.
    pub fn with_environment(mut environment: Environment<'a>) -> Analyzer<'a> {
        environment.start_block();
        Analyzer {
            environment,
            annotations: Annotations::default(),
            return_type: None,
        }
    }
    pub fn analyze(&mut self, source: &'a Source) -> Result<Annotations<'a>, TypeError> {
        for field in &source.fields {
            self.field(field)?;
        }
        for method in &source.methods {
            self.declare_method(method)?;
        }
        for method in &source.methods {
            self.method(method)?;
        }
        let main = self
            .environment
            .lookup_function("main", 0)
            .map_err(|_| TypeError::new("The program must define a main/0 method."))?;
        if main.return_type != Type::Integer {
            return Err(TypeError::new("The main/0 method must return Integer."));
        }
        debug!(
            types = self.annotations.types.len(),
            "analysis complete"
        );
        Ok(mem::take(&mut self.annotations))
    }
    fn field(&mut self, field: &'a Field) -> Result<(), TypeError> {
        let value_type = match &field.value {
            Some(value) => Some(self.expression(value)?),
            None => None,
        };
        let ty = self.environment.lookup_type(&field.type_name)?;
        if let Some(value_type) = value_type {
            require_assignable(&ty, &value_type)?;
        }
        self.define(field.id, &field.name, ty)
    }
    fn define(&mut self, id: NodeId, name: &str, ty: Type) -> Result<(), TypeError> {
        self.environment.define_variable(name, ty.clone(), Value::Nil)?;
        self.annotations.variables.insert(
            id,
            Variable {
                name: name.to_string(),
                ty,
                value: Value::Nil,
            },
        );
        Ok(())
    }
    /// Defines a method's signature in the program scope, before any body is
    /// analyzed, so methods may call each other regardless of order.
    fn declare_method(&mut self, method: &'a Method) -> Result<(), TypeError> {
        let parameter_types = method
            .parameter_type_names
            .iter()
            .map(|name| self.environment.lookup_type(name))
            .collect::<Result<Vec<Type>, EnvironmentError>>()?;
        let return_type = match &method.return_type_name {
            Some(name) => self.environment.lookup_type(name)?,
            None => Type::Nil,
        };
        let function = Function {
            name: method.name.clone(),
            parameter_types,
            return_type,
            callable: Callable::Defined {
                method,
                closure: self.environment.current(),
            },
        };
        self.environment.define_function(function.clone())?;
        self.annotations.functions.insert(method.id, function);
        Ok(())
    }
    fn method(&mut self, method: &'a Method) -> Result<(), TypeError> {
        debug!(method = %method.name, "analyzing method");
        let function = match self.annotations.functions.get(&method.id) {
            Some(function) => function.clone(),
            None => return Err(TypeError::new(format!("Undeclared method '{}'.", method.name))),
        };
        let parameters = method
            .parameters
            .iter()
            .map(String::as_str)
            .zip(function.parameter_types.iter().cloned())
            .collect();
        let enclosing = self.return_type.replace(function.return_type);
        let result = self.block(parameters, &method.statements);
        self.return_type = enclosing;
        result
    }
    /// Analyzes `statements` in a fresh child scope holding `bindings`. The
    /// scope is discarded whether or not analysis succeeds.
    fn block(
        &mut self,
        bindings: Vec<(&str, Type)>,
        statements: &'a [Statement],
    ) -> Result<(), TypeError> {
        self.environment.start_block();
        let result = self.scoped(bindings, statements);
        self.environment.end_block();
        result
    }
    fn scoped(
        &mut self,
        bindings: Vec<(&str, Type)>,
        statements: &'a [Statement],
    ) -> Result<(), TypeError> {
        for (name, ty) in bindings {
            self.environment.define_variable(name, ty, Value::Nil)?;
        }
        for statement in statements {
            self.statement(statement)?;
        }
        Ok(())
    }
    fn statement(&mut self, statement: &'a Statement) -> Result<(), TypeError> {
        match statement {
            Statement::Expression(expr) => {
                if !matches!(expr.kind, ExpressionKind::Function { .. }) {
                    return Err(TypeError::new(
                        "An expression statement must be a function call.",
                    ));
                }
                self.expression(expr)?;
                Ok(())
            }
            Statement::Declaration {
                id,
                name,
                type_name,
                value,
            } => {
                let declared = match type_name {
                    Some(type_name) => Some(self.environment.lookup_type(type_name)?),
                    None => None,
                };
                let value_type = match value {
                    Some(value) => Some(self.expression(value)?),
                    None => None,
                };
                let ty = match (declared, value_type) {
                    (Some(declared), Some(value_type)) => {
                        require_assignable(&declared, &value_type)?;
                        declared
                    }
                    (Some(declared), None) => declared,
                    (None, Some(value_type)) => value_type,
                    (None, None) => {
                        return Err(TypeError::new(format!(
                            "The declaration of '{}' needs a type or a value.",
                            name
                        )))
                    }
                };
                self.define(*id, name, ty)
            }
            Statement::Assignment { receiver, value } => {
                if !matches!(receiver.kind, ExpressionKind::Access { .. }) {
                    return Err(TypeError::new(
                        "The receiver of an assignment must be a variable or a field.",
                    ));
                }
                let receiver_type = self.expression(receiver)?;
                let value_type = self.expression(value)?;
                require_assignable(&receiver_type, &value_type)
            }
            Statement::If {
                condition,
                then_statements,
                else_statements,
            } => {
                self.condition(condition)?;
                if then_statements.is_empty() {
                    return Err(TypeError::new("The body of an IF must not be empty."));
                }
                self.block(Vec::new(), then_statements)?;
                self.block(Vec::new(), else_statements)
            }
            Statement::For {
                name,
                value,
                statements,
            } => {
                let ty = self.expression(value)?;
                if ty != Type::IntegerIterable {
                    return Err(TypeError::new(format!(
                        "FOR requires an IntegerIterable, found {}.",
                        ty
                    )));
                }
                if statements.is_empty() {
                    return Err(TypeError::new("The body of a FOR must not be empty."));
                }
                self.block(vec![(name.as_str(), Type::Integer)], statements)
            }
            Statement::While {
                condition,
                statements,
            } => {
                self.condition(condition)?;
                self.block(Vec::new(), statements)
            }
            Statement::Return(value) => {
                let ty = self.expression(value)?;
                match &self.return_type {
                    Some(return_type) => require_assignable(return_type, &ty),
                    None => Err(TypeError::new("Cannot return outside of a method.")),
                }
            }
        }
    }
    fn condition(&mut self, condition: &'a Expression) -> Result<(), TypeError> {
        let ty = self.expression(condition)?;
        if ty != Type::Boolean {
            return Err(TypeError::new(format!(
                "A condition must be Boolean, found {}.",
                ty
            )));
        }
        Ok(())
    }
    /// Types an expression and records the result against its node.
    pub fn expression(&mut self, expr: &'a Expression) -> Result<Type, TypeError> {
        let ty = self.expression_type(expr)?;
        self.annotations.types.insert(expr.id, ty.clone());
        Ok(ty)
    }
    fn expression_type(&mut self, expr: &'a Expression) -> Result<Type, TypeError> {
        match &expr.kind {
            ExpressionKind::Literal(literal) => literal_type(literal),
            ExpressionKind::Group(inner) => {
                if !matches!(inner.kind, ExpressionKind::Binary { .. }) {
                    return Err(TypeError::new(
                        "A parenthesized expression must contain a binary expression.",
                    ));
                }
                self.expression(inner)
            }
            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                binary_type(*operator, &left, &right)
            }
            ExpressionKind::Access { receiver, name } => {
                let variable = match receiver {
                    None => self.environment.lookup_variable(name)?.clone(),
                    Some(receiver) => {
                        let receiver_type = self.expression(receiver)?;
                        let ty = receiver_type.field(name).cloned().ok_or_else(|| {
                            TypeError::new(format!(
                                "{} has no field '{}'.",
                                receiver_type, name
                            ))
                        })?;
                        Variable {
                            name: name.clone(),
                            ty,
                            value: Value::Nil,
                        }
                    }
                };
                let ty = variable.ty.clone();
                self.annotations.variables.insert(expr.id, variable);
                Ok(ty)
            }
            ExpressionKind::Function {
                receiver,
                name,
                arguments,
            } => {
                let function: Function<'a> = match receiver {
                    None => self
                        .environment
                        .lookup_function(name, arguments.len())?
                        .clone(),
                    Some(receiver) => {
                        let receiver_type = self.expression(receiver)?;
                        receiver_type
                            .method(name, arguments.len())
                            .cloned()
                            .ok_or_else(|| {
                                TypeError::new(format!(
                                    "{} has no method '{}/{}'.",
                                    receiver_type,
                                    name,
                                    arguments.len()
                                ))
                            })?
                    }
                };
                for (argument, parameter) in arguments.iter().zip(function.parameter_types.iter()) {
                    let ty = self.expression(argument)?;
                    require_assignable(parameter, &ty)?;
                }
                let ty = function.return_type.clone();
                self.annotations.functions.insert(expr.id, function);
                Ok(ty)
            }
        }
    }
}

fn literal_type(literal: &Literal) -> Result<Type, TypeError> {
    match literal {
        Literal::Nil => Ok(Type::Nil),
        Literal::Boolean(_) => Ok(Type::Boolean),
        Literal::Character(_) => Ok(Type::Character),
        Literal::String(_) => Ok(Type::String),
        Literal::Integer(x) => match x.to_i32() {
            Some(_) => Ok(Type::Integer),
            None => Err(TypeError::new(format!(
                "The integer {} does not fit in 32 bits.",
                x
            ))),
        },
        Literal::Decimal(x) => match x.to_f64() {
            Some(f) if f.is_finite() => Ok(Type::Decimal),
            _ => Err(TypeError::new(format!(
                "The decimal {} is out of range.",
                x.to_plain_string()
            ))),
        },
    }
}

fn binary_type(operator: BinaryOperator, left: &Type, right: &Type) -> Result<Type, TypeError> {
    match operator {
        BinaryOperator::And | BinaryOperator::Or => {
            if *left == Type::Boolean && *right == Type::Boolean {
                Ok(Type::Boolean)
            } else {
                Err(TypeError::new(format!(
                    "The operands of {} must be Boolean, found {} and {}.",
                    operator, left, right
                )))
            }
        }
        op if op.is_comparison() => {
            require_assignable(&Type::Comparable, left)?;
            if left != right {
                return Err(TypeError::new(format!(
                    "Cannot compare {} with {}.",
                    left, right
                )));
            }
            Ok(Type::Boolean)
        }
        BinaryOperator::Plus if *left == Type::String || *right == Type::String => {
            Ok(Type::String)
        }
        _ => match (left, right) {
            (Type::Integer, Type::Integer) => Ok(Type::Integer),
            (Type::Decimal, Type::Decimal) => Ok(Type::Decimal),
            _ => Err(TypeError::new(format!(
                "The operands of {} must both be Integer or both be Decimal, found {} and {}.",
                operator, left, right
            ))),
        },
    }
}

#[cfg(test)]
mod analyzer_tests {
    use crate::analyzer::{require_assignable, Analyzer, TypeError};
    use crate::ast::{ExpressionKind, Statement};
    use crate::environment::Environment;
    use crate::parser;
    use crate::scanner;
    use crate::types::{ObjectType, Type};
    use crate::value::Value;

    fn analyze(source: &str) -> Result<(), TypeError> {
        let tokens = scanner::scan_tokens(source).unwrap();
        let ast = parser::parse(&tokens).unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&ast).map(|_| ())
    }

    /// Analyzes `source` with a host type `Point { x: Integer }` carrying a
    /// `scaled/1` method, and a variable `origin` of that type.
    fn analyze_with_point(source: &str) -> Result<(), TypeError> {
        let point = ObjectType::new("Point")
            .field("x", Type::Integer)
            .method("scaled", vec![Type::Integer], Type::Integer, |_, _| {
                Ok(Value::Nil)
            })
            .build();
        let mut environment = Environment::new();
        environment.register_type(point.clone()).unwrap();
        environment
            .define_variable("origin", point, Value::Nil)
            .unwrap();
        let tokens = scanner::scan_tokens(source).unwrap();
        let ast = parser::parse(&tokens).unwrap();
        let mut analyzer = Analyzer::with_environment(environment);
        analyzer.analyze(&ast).map(|_| ())
    }

    fn expect_ok(source: &str) {
        if let Err(err) = analyze(source) {
            panic!("{}: {}", source, err);
        }
    }

    fn expect_error(source: &str, expected_error: &str) {
        match analyze(source) {
            Ok(()) => panic!("{}: expected an error", source),
            Err(err) => assert_eq!(err.message, expected_error),
        }
    }

    /// Wraps statements in a main method returning Integer.
    fn main(body: &str) -> String {
        format!("DEF main(): Integer DO {} RETURN 0; END", body)
    }

    #[test]
    fn if_condition_is_boolean() {
        expect_ok(&main("IF 1 < 2 DO print(\"yes\"); END"));
        expect_error(
            &main("IF 1 DO print(\"yes\"); END"),
            "A condition must be Boolean, found Integer.",
        );
    }

    #[test]
    fn condition_type_is_recorded() {
        let source = main("IF 1 < 2 DO print(\"yes\"); END");
        let tokens = scanner::scan_tokens(&source).unwrap();
        let ast = parser::parse(&tokens).unwrap();
        let annotations = Analyzer::new().analyze(&ast).unwrap();
        let condition = match &ast.methods[0].statements[0] {
            Statement::If { condition, .. } => condition,
            _ => panic!("expected an IF"),
        };
        assert_eq!(annotations.type_of(condition.id), Some(&Type::Boolean));
        let call = match &ast.methods[0].statements[0] {
            Statement::If {
                then_statements, ..
            } => match &then_statements[0] {
                Statement::Expression(expr) => expr,
                _ => panic!("expected a call"),
            },
            _ => panic!("expected an IF"),
        };
        assert!(matches!(call.kind, ExpressionKind::Function { .. }));
        assert_eq!(annotations.function(call.id).unwrap().name, "print");
        assert_eq!(annotations.type_of(call.id), Some(&Type::Nil));
        assert!(annotations.function(ast.methods[0].id).is_some());
    }

    #[test]
    fn entry_point() {
        expect_error(
            "DEF other(): Integer DO RETURN 1; END",
            "The program must define a main/0 method.",
        );
        expect_error(
            "DEF main(x: Integer): Integer DO RETURN x; END",
            "The program must define a main/0 method.",
        );
        expect_error(
            "DEF main() DO print(1); END",
            "The main/0 method must return Integer.",
        );
        expect_error(
            "DEF main(): Decimal DO RETURN 1.0; END",
            "The main/0 method must return Integer.",
        );
    }

    #[test]
    fn fields() {
        expect_ok("LET x: Integer = 1; LET y: String; DEF main(): Integer DO RETURN x; END");
        expect_error(
            "LET x: Integer = \"one\"; DEF main(): Integer DO RETURN 0; END",
            "String is not assignable to Integer.",
        );
        expect_error(
            "LET x: Number; DEF main(): Integer DO RETURN 0; END",
            "Undefined type 'Number'.",
        );
        expect_error(
            "LET x: Integer; LET x: Integer; DEF main(): Integer DO RETURN 0; END",
            "'x' is already defined in this scope.",
        );
    }

    #[test]
    fn methods_are_hoisted() {
        expect_ok(
            "DEF main(): Integer DO RETURN twice(2); END \
             DEF twice(x: Integer): Integer DO RETURN x * 2; END",
        );
        expect_ok(
            "DEF main(): Integer DO RETURN fact(5); END \
             DEF fact(n: Integer): Integer DO \
               IF n <= 1 DO RETURN 1; END \
               RETURN n * fact(n - 1); \
             END",
        );
        expect_error(
            "DEF main(): Integer DO RETURN twice(\"a\"); END \
             DEF twice(x: Integer): Integer DO RETURN x * 2; END",
            "String is not assignable to Integer.",
        );
        expect_error(
            &main("twice(1, 2);"),
            "Undefined function 'twice/2'.",
        );
    }

    #[test]
    fn return_types() {
        expect_error(
            "DEF main(): Integer DO RETURN \"zero\"; END",
            "String is not assignable to Integer.",
        );
        expect_ok("DEF f(): Any DO RETURN 'c'; END DEF main(): Integer DO f(); RETURN 0; END");
        expect_error(
            "DEF f() DO RETURN 1; END DEF main(): Integer DO RETURN 0; END",
            "Integer is not assignable to Nil.",
        );
    }

    #[test]
    fn declarations() {
        expect_ok(&main("LET y = 5; LET z: Decimal = 1.5; LET w: String;"));
        expect_error(
            &main("LET y;"),
            "The declaration of 'y' needs a type or a value.",
        );
        expect_error(
            &main("LET y: Integer = TRUE;"),
            "Boolean is not assignable to Integer.",
        );
        expect_error(
            &main("LET y = 1; LET y = 2;"),
            "'y' is already defined in this scope.",
        );
        expect_ok(&main("LET y = 1; IF TRUE DO LET y = 2; print(y); END"));
        expect_error(
            &main("IF TRUE DO LET inner = 2; print(inner); END print(inner);"),
            "Undefined variable 'inner'.",
        );
    }

    #[test]
    fn parameters_are_scoped_to_their_method() {
        expect_error(
            "DEF f(x: Integer) DO print(x); END DEF main(): Integer DO RETURN x; END",
            "Undefined variable 'x'.",
        );
    }

    #[test]
    fn assignment() {
        expect_ok(&main("LET y = 5; y = 6;"));
        expect_error(
            &main("LET y = 5; y = \"six\";"),
            "String is not assignable to Integer.",
        );
        expect_error(
            &main("print(1) = 2;"),
            "The receiver of an assignment must be a variable or a field.",
        );
        expect_error(&main("z = 2;"), "Undefined variable 'z'.");
    }

    #[test]
    fn expression_statements_must_be_calls() {
        expect_error(
            &main("1 + 2;"),
            "An expression statement must be a function call.",
        );
    }

    #[test]
    fn loops() {
        expect_ok(&main("LET i = 0; WHILE i < 10 DO i = i + 1; END"));
        expect_error(
            &main("WHILE 1 DO print(1); END"),
            "A condition must be Boolean, found Integer.",
        );
        expect_error(
            &main("FOR i IN 5 DO print(i); END"),
            "FOR requires an IntegerIterable, found Integer.",
        );
        expect_error(
            &main("IF TRUE DO END"),
            "The body of an IF must not be empty.",
        );
    }

    #[test]
    fn literal_bounds() {
        expect_ok(&main("LET a = 2147483647; LET b = -2147483648;"));
        expect_error(
            &main("LET a = 2147483648;"),
            "The integer 2147483648 does not fit in 32 bits.",
        );
        expect_error(
            &main("LET a = -2147483649;"),
            "The integer -2147483649 does not fit in 32 bits.",
        );
        expect_ok(&main("LET d = 1.5;"));
        let huge = format!("1{}.0", "0".repeat(400));
        expect_error(
            &main(&format!("LET d = {};", huge)),
            &format!("The decimal {} is out of range.", huge),
        );
        expect_error(
            &main(&format!("LET d = -{};", huge)),
            &format!("The decimal -{} is out of range.", huge),
        );
    }

    #[test]
    fn groups_hold_binary_expressions() {
        expect_ok(&main("LET a = (1 + 2) * 3;"));
        expect_error(
            &main("LET a = (1);"),
            "A parenthesized expression must contain a binary expression.",
        );
    }

    #[test]
    fn binary_operators() {
        expect_ok(&main("LET a = (TRUE AND FALSE) OR TRUE;"));
        expect_ok(&main("LET s: String = \"a\" + 1; LET t: String = 1.5 + \"b\";"));
        expect_ok(&main("LET d: Decimal = 1.5 * 2.0 - 0.5 / 1.0;"));
        expect_ok(&main("LET c = 'a' < 'b'; LET e = \"x\" != \"y\";"));
        expect_error(
            &main("LET a = 1 AND TRUE;"),
            "The operands of AND must be Boolean, found Integer and Boolean.",
        );
        expect_error(
            &main("LET a = 1 + 1.0;"),
            "The operands of + must both be Integer or both be Decimal, found Integer and Decimal.",
        );
        expect_error(&main("LET a = 1 < 1.0;"), "Cannot compare Integer with Decimal.");
        expect_error(
            &main("LET a = TRUE == TRUE;"),
            "Boolean is not assignable to Comparable.",
        );
        expect_error(
            &main("LET a = NIL == NIL;"),
            "Nil is not assignable to Comparable.",
        );
    }

    #[test]
    fn assignability() {
        for ty in &[
            Type::Nil,
            Type::Boolean,
            Type::Integer,
            Type::Decimal,
            Type::Character,
            Type::String,
            Type::IntegerIterable,
        ] {
            require_assignable(ty, ty).unwrap();
            require_assignable(&Type::Any, ty).unwrap();
        }
        for ty in &[Type::Integer, Type::Decimal, Type::Character, Type::String] {
            require_assignable(&Type::Comparable, ty).unwrap();
        }
        assert!(require_assignable(&Type::Comparable, &Type::Boolean).is_err());
        assert!(require_assignable(&Type::Comparable, &Type::Nil).is_err());
        assert!(require_assignable(&Type::Integer, &Type::Any).is_err());
        assert!(require_assignable(&Type::Integer, &Type::Decimal).is_err());
    }

    #[test]
    fn object_members() {
        analyze_with_point(
            "LET p: Point = origin; \
             DEF main(): Integer DO p.x = 3; RETURN p.scaled(p.x); END",
        )
        .unwrap();
        assert_eq!(
            analyze_with_point("DEF main(): Integer DO RETURN origin.y; END")
                .unwrap_err()
                .message,
            "Point has no field 'y'."
        );
        assert_eq!(
            analyze_with_point("DEF main(): Integer DO RETURN origin.scaled(); END")
                .unwrap_err()
                .message,
            "Point has no method 'scaled/0'."
        );
        assert_eq!(
            analyze_with_point("DEF main(): Integer DO origin.x = 'c'; RETURN 0; END")
                .unwrap_err()
                .message,
            "Character is not assignable to Integer."
        );
        assert_eq!(
            analyze("DEF main(): Integer DO LET p: Point; RETURN 0; END")
                .unwrap_err()
                .message,
            "Undefined type 'Point'."
        );
    }
}
