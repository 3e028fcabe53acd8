use crate::ast::Literal;
use crate::object::Object;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
    Iterable(Vec<BigInt>),
    Object(Object),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "NIL"),
            Value::Boolean(x) => write!(f, "{}", if *x { "TRUE" } else { "FALSE" }),
            Value::Integer(x) => write!(f, "{}", x),
            Value::Decimal(x) => write!(f, "{}", x.to_plain_string()),
            Value::Character(x) => write!(f, "{}", x),
            Value::String(x) => write!(f, "{}", x),
            Value::Iterable(items) => {
                let items: Vec<String> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(x) => write!(f, "{}", x),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "Nil".to_string(),
            Value::Boolean(_) => "Boolean".to_string(),
            Value::Integer(_) => "Integer".to_string(),
            Value::Decimal(_) => "Decimal".to_string(),
            Value::Character(_) => "Character".to_string(),
            Value::String(_) => "String".to_string(),
            Value::Iterable(_) => "IntegerIterable".to_string(),
            Value::Object(x) => x.type_of().name().to_string(),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Value {
        match literal {
            Literal::Nil => Value::Nil,
            Literal::Boolean(x) => Value::Boolean(*x),
            Literal::Integer(x) => Value::Integer(x.clone()),
            Literal::Decimal(x) => Value::Decimal(x.clone()),
            Literal::Character(x) => Value::Character(*x),
            Literal::String(x) => Value::String(x.clone()),
        }
    }
}

/// Divides two decimals, keeping the scale of the dividend and rounding ties
/// to the even neighbour. Returns `None` for a zero divisor.
pub fn divide_decimal(dividend: &BigDecimal, divisor: &BigDecimal) -> Option<BigDecimal> {
    let (mut numerator, scale) = dividend.as_bigint_and_exponent();
    let (mut denominator, divisor_scale) = divisor.as_bigint_and_exponent();
    if denominator.is_zero() {
        return None;
    }
    // numerator / denominator, expressed in units of 10^-scale.
    if divisor_scale >= 0 {
        numerator *= BigInt::from(10u32).pow(divisor_scale as u32);
    } else {
        denominator *= BigInt::from(10u32).pow((-divisor_scale) as u32);
    }
    let negative = (numerator.sign() == Sign::Minus) != (denominator.sign() == Sign::Minus);
    let mut quotient = &numerator / &denominator;
    let remainder = &numerator % &denominator;
    let round_away = match (remainder.magnitude() * 2u32).cmp(denominator.magnitude()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => !(&quotient % 2u32).is_zero(),
    };
    if round_away {
        if negative {
            quotient -= 1u32;
        } else {
            quotient += 1u32;
        }
    }
    Some(BigDecimal::new(quotient, scale))
}
