use crate::callable::{builtins, Function};
use crate::types::Type;
use crate::value::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    #[error("'{0}' is already defined in this scope.")]
    AlreadyDefined(String),
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Undefined function '{0}/{1}'.")]
    UndefinedFunction(String, usize),
    #[error("Undefined type '{0}'.")]
    UndefinedType(String),
}

/// Index of a scope in its environment's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub value: Value,
}

#[derive(Debug)]
struct Scope<'a> {
    parent: Option<ScopeId>,
    variables: BTreeMap<String, Variable>,
    functions: BTreeMap<(String, usize), Function<'a>>,
}

impl<'a> Scope<'a> {
    fn new(parent: Option<ScopeId>) -> Scope<'a> {
        Scope {
            parent,
            variables: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }
}

/// Lexically nested scopes stored in an arena. Scopes are pushed and popped
/// in stack order, but each one names its own parent, so a function body can
/// be entered as a child of the scope it was declared in rather than the
/// scope it was called from.
#[derive(Debug)]
pub struct Environment<'a> {
    scopes: Vec<Scope<'a>>,
    current: ScopeId,
    saved: Vec<ScopeId>,
    types: BTreeMap<String, Type>,
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Environment::new()
    }
}

impl<'a> Environment<'a> {
    /// Creates an environment holding only the root scope, with the built-in
    /// functions defined in it.
    pub fn new() -> Environment<'a> {
        let mut root = Scope::new(None);
        for function in builtins() {
            root.functions
                .insert((function.name.clone(), function.arity()), function);
        }
        Environment {
            scopes: vec![root],
            current: ScopeId(0),
            saved: Vec::new(),
            types: BTreeMap::new(),
        }
    }
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }
    pub fn current(&self) -> ScopeId {
        self.current
    }
    /// Number of live scopes, the root included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
    pub fn start_block(&mut self) {
        self.enter(self.current);
    }
    /// Pushes a scope whose parent is `parent` and makes it current.
    pub fn enter(&mut self, parent: ScopeId) {
        self.saved.push(self.current);
        self.current = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(Some(parent)));
    }
    /// Discards the innermost scope and restores the one that was current
    /// before it was pushed. The root scope is never discarded.
    pub fn end_block(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.scopes.pop();
            self.current = previous;
        }
    }
    pub fn define_variable(
        &mut self,
        name: &str,
        ty: Type,
        value: Value,
    ) -> Result<(), EnvironmentError> {
        let scope = &mut self.scopes[self.current.0];
        if scope.variables.contains_key(name) {
            return Err(EnvironmentError::AlreadyDefined(name.to_string()));
        }
        scope.variables.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                ty,
                value,
            },
        );
        Ok(())
    }
    pub fn lookup_variable(&self, name: &str) -> Result<&Variable, EnvironmentError> {
        self.resolve(|scope| scope.variables.contains_key(name))
            .and_then(|id| self.scopes[id.0].variables.get(name))
            .ok_or_else(|| EnvironmentError::UndefinedVariable(name.to_string()))
    }
    /// Replaces the value in the nearest visible slot named `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), EnvironmentError> {
        let id = self
            .resolve(|scope| scope.variables.contains_key(name))
            .ok_or_else(|| EnvironmentError::UndefinedVariable(name.to_string()))?;
        if let Some(variable) = self.scopes[id.0].variables.get_mut(name) {
            variable.value = value;
        }
        Ok(())
    }
    pub fn define_function(&mut self, function: Function<'a>) -> Result<(), EnvironmentError> {
        let key = (function.name.clone(), function.arity());
        let scope = &mut self.scopes[self.current.0];
        if scope.functions.contains_key(&key) {
            return Err(EnvironmentError::AlreadyDefined(format!(
                "{}/{}",
                key.0, key.1
            )));
        }
        scope.functions.insert(key, function);
        Ok(())
    }
    pub fn lookup_function(
        &self,
        name: &str,
        arity: usize,
    ) -> Result<&Function<'a>, EnvironmentError> {
        let key = (name.to_string(), arity);
        self.resolve(|scope| scope.functions.contains_key(&key))
            .and_then(|id| self.scopes[id.0].functions.get(&key))
            .ok_or_else(|| EnvironmentError::UndefinedFunction(name.to_string(), arity))
    }
    /// Makes an object type resolvable by name. Built-in type names cannot be
    /// redefined.
    pub fn register_type(&mut self, ty: Type) -> Result<(), EnvironmentError> {
        let name = ty.name().to_string();
        if Type::builtin(&name).is_some() || self.types.contains_key(&name) {
            return Err(EnvironmentError::AlreadyDefined(name));
        }
        self.types.insert(name, ty);
        Ok(())
    }
    pub fn lookup_type(&self, name: &str) -> Result<Type, EnvironmentError> {
        Type::builtin(name)
            .or_else(|| self.types.get(name).cloned())
            .ok_or_else(|| EnvironmentError::UndefinedType(name.to_string()))
    }
    /// Walks from the current scope towards the root and returns the first
    /// scope satisfying `found`.
    fn resolve(&self, found: impl Fn(&Scope<'a>) -> bool) -> Option<ScopeId> {
        let mut id = Some(self.current);
        while let Some(current) = id {
            let scope = &self.scopes[current.0];
            if found(scope) {
                return Some(current);
            }
            id = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod environment_tests {
    use crate::callable::Function;
    use crate::environment::{Environment, EnvironmentError};
    use crate::types::{ObjectType, Type};
    use crate::value::Value;

    fn integer(x: i32) -> Value {
        Value::Integer(x.into())
    }

    #[test]
    fn lookups_walk_outwards() {
        let mut env = Environment::new();
        env.define_variable("x", Type::Integer, integer(1)).unwrap();
        env.start_block();
        assert_eq!(env.lookup_variable("x").unwrap().value, integer(1));
        env.define_variable("x", Type::Integer, integer(2)).unwrap();
        assert_eq!(env.lookup_variable("x").unwrap().value, integer(2));
        env.end_block();
        assert_eq!(env.lookup_variable("x").unwrap().value, integer(1));
        assert_eq!(
            env.lookup_variable("y"),
            Err(EnvironmentError::UndefinedVariable("y".to_string()))
        );
    }

    #[test]
    fn redefinition_in_the_same_scope() {
        let mut env = Environment::new();
        env.define_variable("x", Type::Integer, integer(1)).unwrap();
        assert_eq!(
            env.define_variable("x", Type::String, Value::Nil),
            Err(EnvironmentError::AlreadyDefined("x".to_string()))
        );
    }

    #[test]
    fn assignment_updates_the_nearest_slot() {
        let mut env = Environment::new();
        env.define_variable("x", Type::Integer, integer(1)).unwrap();
        env.start_block();
        env.assign("x", integer(5)).unwrap();
        env.end_block();
        assert_eq!(env.lookup_variable("x").unwrap().value, integer(5));
        assert!(env.assign("nope", Value::Nil).is_err());
    }

    #[test]
    fn blocks_are_discarded() {
        let mut env = Environment::new();
        let depth = env.depth();
        env.start_block();
        env.define_variable("inner", Type::Boolean, Value::Boolean(true))
            .unwrap();
        env.end_block();
        assert_eq!(env.depth(), depth);
        assert!(env.lookup_variable("inner").is_err());
        env.end_block();
        assert_eq!(env.depth(), depth);
    }

    #[test]
    fn entered_scopes_skip_the_caller() {
        let mut env = Environment::new();
        let root = env.root();
        env.start_block();
        env.define_variable("caller", Type::Integer, integer(1))
            .unwrap();
        env.enter(root);
        assert!(env.lookup_variable("caller").is_err());
        env.end_block();
        assert!(env.lookup_variable("caller").is_ok());
    }

    #[test]
    fn functions_are_keyed_by_arity() {
        let mut env = Environment::new();
        assert!(env.lookup_function("print", 1).is_ok());
        assert_eq!(
            env.lookup_function("print", 2).unwrap_err(),
            EnvironmentError::UndefinedFunction("print".to_string(), 2)
        );
        let f = Function::native("f", vec![], Type::Nil, |_, _| Ok(Value::Nil));
        env.define_function(f.clone()).unwrap();
        assert_eq!(
            env.define_function(f).unwrap_err(),
            EnvironmentError::AlreadyDefined("f/0".to_string())
        );
        let g = Function::native("f", vec![Type::Any], Type::Nil, |_, _| Ok(Value::Nil));
        env.define_function(g).unwrap();
        assert_eq!(env.lookup_function("f", 1).unwrap().arity(), 1);
    }

    #[test]
    fn types_resolve_by_name() {
        let mut env = Environment::new();
        assert_eq!(env.lookup_type("Integer").unwrap(), Type::Integer);
        assert!(env.lookup_type("Point").is_err());
        let point = ObjectType::new("Point").build();
        env.register_type(point.clone()).unwrap();
        assert_eq!(env.lookup_type("Point").unwrap(), point);
        assert!(env.register_type(ObjectType::new("Integer").build()).is_err());
    }
}
