use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use strum_macros::{Display, EnumString};

/// Identity of an AST node, assigned by the parser. Analysis results are
/// keyed by it instead of being written back into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: NodeId,
    pub name: String,
    pub type_name: String,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub id: NodeId,
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_type_names: Vec<String>,
    pub return_type_name: Option<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Declaration {
        id: NodeId,
        name: String,
        type_name: Option<String>,
        value: Option<Expression>,
    },
    Assignment {
        receiver: Expression,
        value: Expression,
    },
    If {
        condition: Expression,
        then_statements: Vec<Statement>,
        else_statements: Vec<Statement>,
    },
    For {
        name: String,
        value: Expression,
        statements: Vec<Statement>,
    },
    While {
        condition: Expression,
        statements: Vec<Statement>,
    },
    Return(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: NodeId,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Literal),
    Group(Box<Expression>),
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Access {
        receiver: Option<Box<Expression>>,
        name: String,
    },
    Function {
        receiver: Option<Box<Expression>>,
        name: String,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum BinaryOperator {
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
    #[strum(to_string = "<")]
    Less,
    #[strum(to_string = "<=")]
    LessEqual,
    #[strum(to_string = ">")]
    Greater,
    #[strum(to_string = ">=")]
    GreaterEqual,
    #[strum(to_string = "==")]
    EqualEqual,
    #[strum(to_string = "!=")]
    BangEqual,
    #[strum(to_string = "+")]
    Plus,
    #[strum(to_string = "-")]
    Minus,
    #[strum(to_string = "*")]
    Star,
    #[strum(to_string = "/")]
    Slash,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEqual
                | BinaryOperator::EqualEqual
                | BinaryOperator::BangEqual
        )
    }
}

/// Renders the tree as nested s-expressions, one top-level form per line.
pub struct AstPrinter {}

impl AstPrinter {
    pub fn print(&self, source: &Source) -> String {
        let mut lines = Vec::new();
        for field in &source.fields {
            lines.push(self.field(field));
        }
        for method in &source.methods {
            lines.push(self.method(method));
        }
        lines.join("\n")
    }
    fn field(&self, field: &Field) -> String {
        match &field.value {
            None => format!("(field {} {})", field.name, field.type_name),
            Some(value) => format!(
                "(field {} {} {})",
                field.name,
                field.type_name,
                self.expression(value)
            ),
        }
    }
    fn method(&self, method: &Method) -> String {
        let parameters: Vec<String> = method
            .parameters
            .iter()
            .zip(method.parameter_type_names.iter())
            .map(|(name, type_name)| format!("{}:{}", name, type_name))
            .collect();
        format!(
            "(def {} ({}) {} {})",
            method.name,
            parameters.join(" "),
            method.return_type_name.as_deref().unwrap_or("Nil"),
            self.block(&method.statements)
        )
    }
    fn block(&self, statements: &[Statement]) -> String {
        let statements: Vec<String> = statements.iter().map(|s| self.statement(s)).collect();
        let separator = if statements.is_empty() { "" } else { " " };
        format!("(do{}{})", separator, statements.join(" "))
    }
    pub fn statement(&self, statement: &Statement) -> String {
        match statement {
            Statement::Expression(expr) => self.expression(expr),
            Statement::Declaration {
                id: _,
                name,
                type_name,
                value,
            } => {
                let mut x = format!("(let {}", name);
                if let Some(type_name) = type_name {
                    x.push_str(&format!(":{}", type_name));
                }
                if let Some(value) = value {
                    x.push(' ');
                    x.push_str(&self.expression(value));
                }
                x.push(')');
                x
            }
            Statement::Assignment { receiver, value } => self.parenthesize("=", &[receiver, value]),
            Statement::If {
                condition,
                then_statements,
                else_statements,
            } => format!(
                "(if {} {} {})",
                self.expression(condition),
                self.block(then_statements),
                self.block(else_statements)
            ),
            Statement::For {
                name,
                value,
                statements,
            } => format!(
                "(for {} {} {})",
                name,
                self.expression(value),
                self.block(statements)
            ),
            Statement::While {
                condition,
                statements,
            } => format!(
                "(while {} {})",
                self.expression(condition),
                self.block(statements)
            ),
            Statement::Return(value) => self.parenthesize("return", &[value]),
        }
    }
    pub fn expression(&self, expr: &Expression) -> String {
        match &expr.kind {
            ExpressionKind::Literal(literal) => match literal {
                Literal::Nil => String::from("NIL"),
                Literal::Boolean(x) => String::from(if *x { "TRUE" } else { "FALSE" }),
                Literal::Integer(x) => x.to_string(),
                Literal::Decimal(x) => x.to_plain_string(),
                Literal::Character(x) => format!("{:?}", x),
                Literal::String(x) => format!("{:?}", x),
            },
            ExpressionKind::Group(inner) => self.parenthesize("group", &[&**inner]),
            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => self.parenthesize(&operator.to_string(), &[&**left, &**right]),
            ExpressionKind::Access { receiver, name } => match receiver {
                None => name.clone(),
                Some(receiver) => self.parenthesize(&format!(".{}", name), &[&**receiver]),
            },
            ExpressionKind::Function {
                receiver,
                name,
                arguments,
            } => {
                let mut args: Vec<&Expression> = Vec::new();
                if let Some(receiver) = receiver {
                    args.push(&**receiver);
                }
                args.extend(arguments.iter());
                let name = if receiver.is_some() {
                    format!("call .{}", name)
                } else {
                    format!("call {}", name)
                };
                self.parenthesize(&name, &args)
            }
        }
    }
    fn parenthesize(&self, name: &str, args: &[&Expression]) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push(' ');
            x.push_str(self.expression(arg).as_str());
        }
        x.push(')');
        x
    }
}
