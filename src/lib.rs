pub mod analyzer;
pub mod ast;
pub mod callable;
pub mod environment;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod types;
pub mod value;

use crate::analyzer::{Analyzer, TypeError};
use crate::interpreter::{Interpreter, RuntimeError};
use crate::parser::ParseError;
use crate::scanner::ScanError;
use crate::value::Value;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// True for errors found before the program starts running.
    pub fn is_static(&self) -> bool {
        !matches!(self, Error::Runtime(_))
    }
}

/// Scans, parses, analyzes and runs `source`, writing program output to
/// `output`. Returns the value produced by `main`.
pub fn run<W: Write>(source: &str, output: W) -> Result<Value, Error> {
    let tokens = scanner::scan_tokens(source)?;
    let ast = parser::parse(&tokens)?;
    let mut analyzer = Analyzer::new();
    analyzer.analyze(&ast)?;
    let mut interpreter = Interpreter::with_output(output);
    let value = interpreter.interpret(&ast)?;
    Ok(value)
}
