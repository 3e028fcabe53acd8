use crate::callable::{Function, NativeCall};
use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Static types. The built-in types are unit variants, so every use of one is
/// the same value; object types are shared behind an `Rc` and compare by
/// pointer identity.
#[derive(Clone, Debug)]
pub enum Type {
    Any,
    Nil,
    Comparable,
    Boolean,
    Integer,
    Decimal,
    Character,
    String,
    IntegerIterable,
    Object(Rc<ObjectType>),
}

impl Type {
    pub fn builtin(name: &str) -> Option<Type> {
        match name {
            "Any" => Some(Type::Any),
            "Nil" => Some(Type::Nil),
            "Comparable" => Some(Type::Comparable),
            "Boolean" => Some(Type::Boolean),
            "Integer" => Some(Type::Integer),
            "Decimal" => Some(Type::Decimal),
            "Character" => Some(Type::Character),
            "String" => Some(Type::String),
            "IntegerIterable" => Some(Type::IntegerIterable),
            _ => None,
        }
    }
    pub fn name(&self) -> &str {
        match self {
            Type::Any => "Any",
            Type::Nil => "Nil",
            Type::Comparable => "Comparable",
            Type::Boolean => "Boolean",
            Type::Integer => "Integer",
            Type::Decimal => "Decimal",
            Type::Character => "Character",
            Type::String => "String",
            Type::IntegerIterable => "IntegerIterable",
            Type::Object(object) => &object.name,
        }
    }
    /// Looks up a field in this type's member table. Only object types have
    /// members.
    pub fn field(&self, name: &str) -> Option<&Type> {
        match self {
            Type::Object(object) => object.fields.get(name),
            _ => None,
        }
    }
    pub fn method(&self, name: &str, arity: usize) -> Option<&Function<'static>> {
        match self {
            Type::Object(object) => object.methods.get(&(name.to_string(), arity)),
            _ => None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Object(a), Type::Object(b)) => Rc::ptr_eq(a, b),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A host-defined type with typed fields and native methods. Methods receive
/// the receiver object as their first argument.
#[derive(Debug)]
pub struct ObjectType {
    name: String,
    fields: BTreeMap<String, Type>,
    methods: BTreeMap<(String, usize), Function<'static>>,
}

impl ObjectType {
    pub fn new(name: &str) -> ObjectType {
        ObjectType {
            name: name.to_string(),
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
        }
    }
    pub fn field(mut self, name: &str, ty: Type) -> ObjectType {
        self.fields.insert(name.to_string(), ty);
        self
    }
    pub fn method(
        mut self,
        name: &'static str,
        parameter_types: Vec<Type>,
        return_type: Type,
        call: NativeCall,
    ) -> ObjectType {
        let arity = parameter_types.len();
        self.methods.insert(
            (name.to_string(), arity),
            Function::native(name, parameter_types, return_type, call),
        );
        self
    }
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Type)> {
        self.fields.iter()
    }
    pub fn build(self) -> Type {
        Type::Object(Rc::new(self))
    }
}
