use crate::ast::Method;
use crate::environment::ScopeId;
use crate::interpreter::RuntimeError;
use crate::types::Type;
use crate::value::Value;
use std::fmt;
use std::fmt::Debug;
use std::io::Write;

/// Native code behind a built-in function or an object method. Receives the
/// interpreter's output channel and the evaluated arguments.
pub type NativeCall = fn(&mut dyn Write, &[Value]) -> Result<Value, RuntimeError>;

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub call: NativeCall,
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

#[derive(Clone, Debug)]
pub enum Callable<'a> {
    Native(NativeFunction),
    /// A method from the program, closed over the scope it was declared in.
    Defined { method: &'a Method, closure: ScopeId },
}

/// A function signature together with the code that implements it.
/// Functions are identified by name and arity.
#[derive(Clone, Debug)]
pub struct Function<'a> {
    pub name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
    pub callable: Callable<'a>,
}

impl Function<'static> {
    pub fn native(
        name: &'static str,
        parameter_types: Vec<Type>,
        return_type: Type,
        call: NativeCall,
    ) -> Function<'static> {
        Function {
            name: name.to_string(),
            parameter_types,
            return_type,
            callable: Callable::Native(NativeFunction { name, call }),
        }
    }
}

impl<'a> Function<'a> {
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

impl<'a> fmt::Display for Function<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}/{}>", self.name, self.arity())
    }
}

/// Functions present in every root scope.
pub fn builtins() -> Vec<Function<'static>> {
    vec![Function::native("print", vec![Type::Any], Type::Nil, print)]
}

fn print(output: &mut dyn Write, arguments: &[Value]) -> Result<Value, RuntimeError> {
    for argument in arguments {
        writeln!(output, "{}", argument)?;
    }
    Ok(Value::Nil)
}
