use crate::interpreter::RuntimeError;
use crate::types::Type;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// An instance of an `ObjectType`. Clones share the same field table, so a
/// field assigned through one handle is visible through every other.
#[derive(Clone, Debug)]
pub struct Object {
    data: Rc<RefCell<ObjectImpl>>,
}

#[derive(Debug)]
struct ObjectImpl {
    ty: Type,
    fields: BTreeMap<String, Value>,
}

impl Object {
    /// Creates an instance with every declared field set to NIL.
    pub fn new(ty: Type) -> Object {
        let fields = match &ty {
            Type::Object(object) => object
                .fields()
                .map(|(name, _)| (name.clone(), Value::Nil))
                .collect(),
            _ => BTreeMap::new(),
        };
        Object {
            data: Rc::new(RefCell::new(ObjectImpl { ty, fields })),
        }
    }
    pub fn type_of(&self) -> Type {
        self.data.borrow().ty.clone()
    }
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.data
            .borrow()
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| self.undefined(name))
    }
    /// Assigns an existing field. Objects never grow new fields.
    pub fn set(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.data.borrow_mut().fields.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        Err(self.undefined(name))
    }
    pub fn equals(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
    fn undefined(&self, name: &str) -> RuntimeError {
        RuntimeError::UndefinedMember {
            receiver: self.to_string(),
            name: name.to_string(),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} object", self.data.borrow().ty)
    }
}
