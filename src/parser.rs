use crate::ast::{
    BinaryOperator, Expression, ExpressionKind, Field, Literal, Method, NodeId, Source, Statement,
};
use crate::scanner::ESCAPES;
use crate::token::{Token, TokenType};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[token {index}] Parse Error: {message}")]
pub struct ParseError {
    pub index: usize,
    pub message: String,
}

const LOGICAL: &[BinaryOperator] = &[BinaryOperator::And, BinaryOperator::Or];
const EQUALITY: &[BinaryOperator] = &[
    BinaryOperator::Less,
    BinaryOperator::LessEqual,
    BinaryOperator::Greater,
    BinaryOperator::GreaterEqual,
    BinaryOperator::EqualEqual,
    BinaryOperator::BangEqual,
];
const ADDITIVE: &[BinaryOperator] = &[BinaryOperator::Plus, BinaryOperator::Minus];
const MULTIPLICATIVE: &[BinaryOperator] = &[BinaryOperator::Star, BinaryOperator::Slash];

pub fn parse<'a>(tokens: &'a [Token<'a>]) -> Result<Source, ParseError> {
    Parser::new(tokens).parse()
}

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    next_id: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Parser<'a> {
        Parser {
            tokens,
            current: 0,
            next_id: 0,
        }
    }
    pub fn parse(&mut self) -> Result<Source, ParseError> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while self.next_if("LET") {
            fields.push(self.field()?);
        }
        while self.next_if("DEF") {
            methods.push(self.method()?);
        }
        if !self.is_at_end() {
            return Err(self.error("Expected DEF."));
        }
        debug!(fields = fields.len(), methods = methods.len(), "parsed source");
        Ok(Source { fields, methods })
    }
    fn field(&mut self) -> Result<Field, ParseError> {
        let name = self.expect_identifier("Expected field name.")?;
        self.expect(":", "Expected ':' after field name.")?;
        let type_name = self.expect_identifier("Expected field type name.")?;
        let value = if self.next_if("=") {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(";", "Expected ';' after field.")?;
        Ok(Field {
            id: self.id(),
            name,
            type_name,
            value,
        })
    }
    fn method(&mut self) -> Result<Method, ParseError> {
        let name = self.expect_identifier("Expected method name.")?;
        self.expect("(", "Expected '(' after method name.")?;
        let mut parameters = Vec::new();
        let mut parameter_type_names = Vec::new();
        if !self.next_if(")") {
            loop {
                parameters.push(self.expect_identifier("Expected parameter name.")?);
                self.expect(":", "Expected ':' after parameter name.")?;
                parameter_type_names.push(self.expect_identifier("Expected parameter type name.")?);
                if self.next_if(")") {
                    break;
                }
                self.expect(",", "Expected ',' or ')' in parameter list.")?;
            }
        }
        let return_type_name = if self.next_if(":") {
            Some(self.expect_identifier("Expected return type name.")?)
        } else {
            None
        };
        self.expect("DO", "Expected DO before method body.")?;
        let statements = self.block(&["END"])?;
        self.expect("END", "Expected END after method body.")?;
        Ok(Method {
            id: self.id(),
            name,
            parameters,
            parameter_type_names,
            return_type_name,
            statements,
        })
    }
    /// Parses statements up to (not including) one of `terminators`.
    fn block(&mut self, terminators: &[&str]) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        while !terminators.iter().any(|t| self.peek_is(t)) {
            if self.is_at_end() {
                return Err(self.error(&format!("Expected {}.", terminators.join(" or "))));
            }
            statements.push(self.statement()?);
        }
        Ok(statements)
    }
    fn statement(&mut self) -> Result<Statement, ParseError> {
        if self.next_if("LET") {
            self.declaration_statement()
        } else if self.next_if("IF") {
            self.if_statement()
        } else if self.next_if("FOR") {
            self.for_statement()
        } else if self.next_if("WHILE") {
            self.while_statement()
        } else if self.next_if("RETURN") {
            let value = self.expression()?;
            self.expect(";", "Expected ';' after return value.")?;
            Ok(Statement::Return(value))
        } else {
            let receiver = self.expression()?;
            if self.next_if("=") {
                let value = self.expression()?;
                self.expect(";", "Expected ';' after assignment.")?;
                Ok(Statement::Assignment { receiver, value })
            } else {
                self.expect(";", "Expected ';' after expression.")?;
                Ok(Statement::Expression(receiver))
            }
        }
    }
    fn declaration_statement(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect_identifier("Expected variable name.")?;
        let type_name = if self.next_if(":") {
            Some(self.expect_identifier("Expected variable type name.")?)
        } else {
            None
        };
        let value = if self.next_if("=") {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(";", "Expected ';' after declaration.")?;
        Ok(Statement::Declaration {
            id: self.id(),
            name,
            type_name,
            value,
        })
    }
    fn if_statement(&mut self) -> Result<Statement, ParseError> {
        let condition = self.expression()?;
        self.expect("DO", "Expected DO after if condition.")?;
        let then_statements = self.block(&["ELSE", "END"])?;
        let else_statements = if self.next_if("ELSE") {
            self.block(&["END"])?
        } else {
            Vec::new()
        };
        self.expect("END", "Expected END after if statement.")?;
        Ok(Statement::If {
            condition,
            then_statements,
            else_statements,
        })
    }
    fn for_statement(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect_identifier("Expected loop variable name.")?;
        self.expect("IN", "Expected IN after loop variable.")?;
        let value = self.expression()?;
        self.expect("DO", "Expected DO after for expression.")?;
        let statements = self.block(&["END"])?;
        self.expect("END", "Expected END after for body.")?;
        Ok(Statement::For {
            name,
            value,
            statements,
        })
    }
    fn while_statement(&mut self) -> Result<Statement, ParseError> {
        let condition = self.expression()?;
        self.expect("DO", "Expected DO after while condition.")?;
        let statements = self.block(&["END"])?;
        self.expect("END", "Expected END after while body.")?;
        Ok(Statement::While {
            condition,
            statements,
        })
    }
    pub fn expression(&mut self) -> Result<Expression, ParseError> {
        self.logical()
    }
    fn logical(&mut self) -> Result<Expression, ParseError> {
        self.binary(LOGICAL, Parser::equality)
    }
    fn equality(&mut self) -> Result<Expression, ParseError> {
        self.binary(EQUALITY, Parser::additive)
    }
    fn additive(&mut self) -> Result<Expression, ParseError> {
        self.binary(ADDITIVE, Parser::multiplicative)
    }
    fn multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.binary(MULTIPLICATIVE, Parser::secondary)
    }
    /// One precedence level: an operand, optionally followed by a single
    /// operator of this level and a second operand. Never loops, so
    /// `a < b < c` leaves the second `<` for the caller to reject.
    fn binary(
        &mut self,
        operators: &[BinaryOperator],
        operand: fn(&mut Parser<'a>) -> Result<Expression, ParseError>,
    ) -> Result<Expression, ParseError> {
        let left = operand(self)?;
        let operator = match self.peek().map(|t| BinaryOperator::from_str(t.literal)) {
            Some(Ok(op)) if operators.contains(&op) => op,
            _ => return Ok(left),
        };
        self.advance();
        let right = operand(self)?;
        Ok(self.node(ExpressionKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }
    fn secondary(&mut self) -> Result<Expression, ParseError> {
        let primary = self.primary()?;
        if !self.next_if(".") {
            return Ok(primary);
        }
        let name = self.expect_identifier("Expected member name after '.'.")?;
        if self.next_if("(") {
            let arguments = self.arguments()?;
            Ok(self.node(ExpressionKind::Function {
                receiver: Some(Box::new(primary)),
                name,
                arguments,
            }))
        } else {
            Ok(self.node(ExpressionKind::Access {
                receiver: Some(Box::new(primary)),
                name,
            }))
        }
    }
    fn primary(&mut self) -> Result<Expression, ParseError> {
        let token = match self.peek() {
            Some(token) => token,
            None => return Err(self.error("Expected expression.")),
        };
        let literal = match token.tokentype {
            TokenType::Identifier if token.is("NIL") => Some(Literal::Nil),
            TokenType::Identifier if token.is("TRUE") => Some(Literal::Boolean(true)),
            TokenType::Identifier if token.is("FALSE") => Some(Literal::Boolean(false)),
            TokenType::Integer => {
                let digits = token.literal.strip_prefix('+').unwrap_or(token.literal);
                match BigInt::from_str(digits) {
                    Ok(x) => Some(Literal::Integer(x)),
                    Err(_) => return Err(self.error("Malformed integer literal.")),
                }
            }
            TokenType::Decimal => {
                let digits = token.literal.strip_prefix('+').unwrap_or(token.literal);
                match BigDecimal::from_str(digits) {
                    Ok(x) => Some(Literal::Decimal(x)),
                    Err(_) => return Err(self.error("Malformed decimal literal.")),
                }
            }
            TokenType::Character => match unescape(unquote(token.literal)).chars().next() {
                Some(c) => Some(Literal::Character(c)),
                None => return Err(self.error("Malformed character literal.")),
            },
            TokenType::String => Some(Literal::String(unescape(unquote(token.literal)))),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(self.node(ExpressionKind::Literal(literal)));
        }
        if self.next_if("(") {
            let inner = self.expression()?;
            self.expect(")", "Expected ')' after expression.")?;
            return Ok(self.node(ExpressionKind::Group(Box::new(inner))));
        }
        if token.tokentype == TokenType::Identifier {
            self.advance();
            let name = token.literal.to_string();
            if self.next_if("(") {
                let arguments = self.arguments()?;
                return Ok(self.node(ExpressionKind::Function {
                    receiver: None,
                    name,
                    arguments,
                }));
            }
            return Ok(self.node(ExpressionKind::Access {
                receiver: None,
                name,
            }));
        }
        Err(self.error("Expected expression."))
    }
    /// Comma separated arguments; the opening parenthesis is already consumed.
    fn arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut arguments = Vec::new();
        if self.next_if(")") {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.expression()?);
            if self.next_if(")") {
                return Ok(arguments);
            }
            self.expect(",", "Expected ',' or ')' in argument list.")?;
        }
    }
    fn node(&mut self, kind: ExpressionKind) -> Expression {
        Expression {
            id: self.id(),
            kind,
        }
    }
    fn id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id - 1)
    }
    fn expect(&mut self, literal: &str, message: &str) -> Result<(), ParseError> {
        if self.next_if(literal) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }
    fn expect_identifier(&mut self, message: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if token.tokentype == TokenType::Identifier => {
                self.advance();
                Ok(token.literal.to_string())
            }
            _ => Err(self.error(message)),
        }
    }
    fn next_if(&mut self, literal: &str) -> bool {
        if self.peek_is(literal) {
            self.advance();
            true
        } else {
            false
        }
    }
    fn peek_is(&self, literal: &str) -> bool {
        self.peek().map_or(false, |t| t.is(literal))
    }
    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.current)
    }
    fn error(&self, message: &str) -> ParseError {
        ParseError {
            index: self.current,
            message: message.to_string(),
        }
    }
}

fn unquote(literal: &str) -> &str {
    if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        ""
    }
}

fn unescape(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(ESCAPES.get(&escaped).copied().unwrap_or(escaped));
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod parser_tests {
    use crate::ast::{AstPrinter, ExpressionKind, Literal, Statement};
    use crate::parser::{parse, ParseError, Parser};
    use crate::scanner::scan_tokens;

    fn print_expression(source: &str) -> String {
        let tokens = scan_tokens(source).unwrap();
        let mut parser = Parser::new(&tokens);
        let expr = parser.expression().unwrap();
        AstPrinter {}.expression(&expr)
    }

    fn print_source(source: &str) -> String {
        let tokens = scan_tokens(source).unwrap();
        AstPrinter {}.print(&parse(&tokens).unwrap())
    }

    fn parse_error(source: &str) -> ParseError {
        let tokens = scan_tokens(source).unwrap();
        parse(&tokens).unwrap_err()
    }

    #[test]
    fn precedence() {
        assert_eq!(print_expression("a + b * c"), "(+ a (* b c))");
        assert_eq!(print_expression("a * b + c"), "(+ (* a b) c)");
        assert_eq!(
            print_expression("a < b + 1 AND c"),
            "(AND (< a (+ b 1)) c)"
        );
        assert_eq!(print_expression("(a + b) * c"), "(* (group (+ a b)) c)");
    }

    #[test]
    fn members_and_calls() {
        assert_eq!(print_expression("obj.field"), "(.field obj)");
        assert_eq!(print_expression("obj.method(1, x)"), "(call .method obj 1 x)");
        assert_eq!(print_expression("f()"), "(call f)");
        assert_eq!(print_expression("f(g(1), \"s\")"), "(call f (call g 1) \"s\")");
    }

    #[test]
    fn literals() {
        assert_eq!(print_expression("NIL"), "NIL");
        assert_eq!(print_expression("TRUE"), "TRUE");
        assert_eq!(print_expression("-12"), "-12");
        assert_eq!(print_expression("+7"), "7");
        assert_eq!(print_expression("2.50"), "2.50");
        assert_eq!(print_expression("0.0000001"), "0.0000001");
        assert_eq!(print_expression(r"'\n'"), "'\\n'");
        assert_eq!(print_expression(r#""a\tb\"""#), "\"a\\tb\\\"\"");
    }

    #[test]
    fn string_escapes_are_substituted() {
        let tokens = scan_tokens(r#""a\bb\\c\'""#).unwrap();
        let expr = Parser::new(&tokens).expression().unwrap();
        assert_eq!(
            expr.kind,
            ExpressionKind::Literal(Literal::String("a\u{8}b\\c'".to_string()))
        );
    }

    #[test]
    fn wide_integers_survive_parsing() {
        let tokens = scan_tokens("123456789012345678901234567890").unwrap();
        let expr = Parser::new(&tokens).expression().unwrap();
        match expr.kind {
            ExpressionKind::Literal(Literal::Integer(x)) => {
                assert_eq!(x.to_string(), "123456789012345678901234567890")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fields_and_methods() {
        assert_eq!(
            print_source(
                "LET x: Integer = 1; LET y: String; \
                 DEF f(a: Integer, b: Decimal): Integer DO RETURN a; END \
                 DEF main() DO END"
            ),
            "(field x Integer 1)\n(field y String)\n\
             (def f (a:Integer b:Decimal) Integer (do (return a)))\n\
             (def main () Nil (do))"
        );
    }

    #[test]
    fn statements() {
        assert_eq!(
            print_source(
                "DEF main(): Integer DO \
                 LET a = 1; LET b: Integer; LET c: Integer = 2; \
                 a = a + 1; print(a); \
                 IF a > 1 DO print(1); ELSE print(2); END \
                 FOR i IN xs DO print(i); END \
                 WHILE a < 10 DO a = a + 1; END \
                 RETURN 0; END"
            ),
            "(def main () Integer (do (let a 1) (let b:Integer) (let c:Integer 2) \
             (= a (+ a 1)) (call print a) \
             (if (> a 1) (do (call print 1)) (do (call print 2))) \
             (for i xs (do (call print i))) \
             (while (< a 10) (do (= a (+ a 1)))) \
             (return 0)))"
        );
    }

    #[test]
    fn declarations_keep_their_parts() {
        let tokens = scan_tokens("DEF main() DO LET y; END").unwrap();
        let source = parse(&tokens).unwrap();
        match &source.methods[0].statements[0] {
            Statement::Declaration {
                name,
                type_name,
                value,
                ..
            } => {
                assert_eq!(name, "y");
                assert!(type_name.is_none());
                assert!(value.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn comparisons_do_not_chain() {
        let error = parse_error("DEF main() DO RETURN a < b < c; END");
        assert_eq!(error.index, 9);
        assert_eq!(error.message, "Expected ';' after return value.");
        let tokens = scan_tokens("a + b + c").unwrap();
        let mut parser = Parser::new(&tokens);
        assert_eq!(AstPrinter {}.expression(&parser.expression().unwrap()), "(+ a b)");
    }

    #[test]
    fn missing_punctuation() {
        assert_eq!(parse_error("LET x Integer;").index, 2);
        assert_eq!(parse_error("LET x: Integer = 1").index, 6);
        assert_eq!(parse_error("DEF f(a: Integer b: Integer) DO END").index, 6);
        assert_eq!(parse_error("DEF f(a: Integer,) DO END").index, 7);
        assert_eq!(parse_error("DEF f() print(1); END").index, 4);
        assert_eq!(parse_error("DEF f() DO f(1 2); END").index, 8);
        assert_eq!(parse_error("DEF f() DO RETURN (1 + 2; END").index, 10);
    }

    #[test]
    fn unterminated_block() {
        let error = parse_error("DEF main() DO print(1);");
        assert_eq!(error.index, 10);
        assert_eq!(error.message, "Expected END.");
        let error = parse_error("DEF main() DO IF TRUE DO print(1); END");
        assert_eq!(error.message, "Expected END.");
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert_eq!(parse_error("DEF main() DO END LET x: Integer;").index, 6);
        assert_eq!(parse_error("x").message, "Expected DEF.");
    }

    #[test]
    fn node_ids_are_unique() {
        let tokens = scan_tokens("LET x: Integer = 1 + 2; DEF main() DO f(x, y.z); END").unwrap();
        let source = parse(&tokens).unwrap();
        let mut ids = vec![source.fields[0].id, source.methods[0].id];
        fn collect(expr: &crate::ast::Expression, ids: &mut Vec<crate::ast::NodeId>) {
            ids.push(expr.id);
            match &expr.kind {
                ExpressionKind::Binary { left, right, .. } => {
                    collect(left, ids);
                    collect(right, ids);
                }
                ExpressionKind::Function {
                    receiver,
                    arguments,
                    ..
                } => {
                    if let Some(r) = receiver {
                        collect(r, ids);
                    }
                    for a in arguments {
                        collect(a, ids);
                    }
                }
                ExpressionKind::Access {
                    receiver: Some(r), ..
                } => collect(r, ids),
                _ => {}
            }
        }
        if let Some(value) = &source.fields[0].value {
            collect(value, &mut ids);
        }
        if let Statement::Expression(e) = &source.methods[0].statements[0] {
            collect(e, &mut ids);
        }
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(count, 9);
    }
}
