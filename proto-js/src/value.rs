use crate::{MethodId, ModelError, ObjectInstance, ObjectModel};
use core::fmt;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Named values used both as an instance's initial own properties and as prototype slots.
pub type PropertyMap = BTreeMap<String, Value>;

/// A native method body.
///
/// Bodies are plain code: the same body may back many method objects, each with its own
/// [`MethodId`].
pub type NativeMethod = Rc<dyn Fn(&MethodCall<'_>) -> Result<Value, ModelError>>;

/// A value stored in an own property or a prototype slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(Rc<str>),
  /// An immutable array. Operations like [`Value::concat`] produce a new array.
  Array(Rc<[Value]>),
  Method(Method),
}

impl Value {
  pub fn string(s: &str) -> Self {
    Self::String(Rc::from(s))
  }

  pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
    Self::Array(items.into_iter().collect())
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&[Value]> {
    match self {
      Value::Array(items) => Some(items),
      _ => None,
    }
  }

  pub fn as_method(&self) -> Option<&Method> {
    match self {
      Value::Method(m) => Some(m),
      _ => None,
    }
  }

  pub fn is_method(&self) -> bool {
    matches!(self, Value::Method(_))
  }

  /// The `typeof` name of this value.
  pub fn type_of(&self) -> &'static str {
    match self {
      Value::Undefined => "undefined",
      Value::Null | Value::Array(_) => "object",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Method(_) => "function",
    }
  }

  /// Array concatenation. Array arguments are spread one level, anything else is appended.
  ///
  /// The receiver is left untouched.
  pub fn concat(&self, extra: impl Into<Value>) -> Result<Value, ModelError> {
    let Value::Array(items) = self else {
      return Err(ModelError::TypeError("concat called on a non-array value"));
    };
    let mut out: Vec<Value> = items.to_vec();
    match extra.into() {
      Value::Array(more) => out.extend(more.iter().cloned()),
      other => out.push(other),
    }
    Ok(Value::Array(out.into()))
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Self::Number(value as f64)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::string(value)
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::String(Rc::from(value))
  }
}

impl From<Vec<Value>> for Value {
  fn from(value: Vec<Value>) -> Self {
    Self::Array(value.into())
  }
}

impl From<Method> for Value {
  fn from(value: Method) -> Self {
    Self::Method(value)
  }
}

/// `undefined` serializes as `{"$undefined": true}` so that it stays distinct from `null`, in the
/// same marker style as methods (`{"$method": ..}`).
impl Serialize for Value {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::Undefined => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$undefined", &true)?;
        map.end()
      }
      Value::Null => serializer.serialize_unit(),
      Value::Bool(b) => serializer.serialize_bool(*b),
      Value::Number(n) => serializer.serialize_f64(*n),
      Value::String(s) => serializer.serialize_str(s),
      Value::Array(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items.iter() {
          seq.serialize_element(item)?;
        }
        seq.end()
      }
      Value::Method(m) => m.serialize(serializer),
    }
  }
}

/// A method object: a native body plus an identity.
///
/// Equality is identity: two methods are equal only if they are the same allocation, regardless
/// of whether their bodies are the same code.
#[derive(Clone)]
pub struct Method {
  id: MethodId,
  name: Rc<str>,
  body: NativeMethod,
}

impl Method {
  pub(crate) fn new(id: MethodId, name: &str, body: NativeMethod) -> Self {
    Self {
      id,
      name: Rc::from(name),
      body,
    }
  }

  #[inline]
  pub fn id(&self) -> MethodId {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn invoke(&self, call: &MethodCall<'_>) -> Result<Value, ModelError> {
    (self.body)(call)
  }
}

impl PartialEq for Method {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl fmt::Debug for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Method")
      .field("id", &self.id)
      .field("name", &&*self.name)
      .finish()
  }
}

impl Serialize for Method {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("$method", &*self.name)?;
    map.serialize_entry("id", &self.id)?;
    map.end()
  }
}

/// Method templates handed to [`ObjectModel::construct`].
///
/// A template is turned into method objects by the model: once per instance for the copying
/// strategies, once per prototype record for the delegating ones.
#[derive(Clone, Default)]
pub struct MethodTable {
  methods: BTreeMap<String, NativeMethod>,
}

impl MethodTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style [`MethodTable::insert`].
  pub fn with<F>(mut self, name: &str, body: F) -> Self
  where
    F: Fn(&MethodCall<'_>) -> Result<Value, ModelError> + 'static,
  {
    self.insert(name, body);
    self
  }

  pub fn insert<F>(&mut self, name: &str, body: F)
  where
    F: Fn(&MethodCall<'_>) -> Result<Value, ModelError> + 'static,
  {
    self.methods.insert(name.to_string(), Rc::new(body));
  }

  pub fn contains(&self, name: &str) -> bool {
    self.methods.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.methods.len()
  }

  pub fn is_empty(&self) -> bool {
    self.methods.is_empty()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.methods.keys().map(String::as_str)
  }

  pub fn iter(&self) -> btree_map::Iter<'_, String, NativeMethod> {
    self.methods.iter()
  }
}

impl fmt::Debug for MethodTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.methods.keys()).finish()
  }
}

/// The context a native method body runs in.
pub struct MethodCall<'a> {
  model: &'a ObjectModel,
  this: &'a ObjectInstance,
  args: &'a [Value],
}

impl<'a> MethodCall<'a> {
  pub(crate) fn new(model: &'a ObjectModel, this: &'a ObjectInstance, args: &'a [Value]) -> Self {
    Self { model, this, args }
  }

  pub fn model(&self) -> &'a ObjectModel {
    self.model
  }

  /// The receiver (`this`).
  pub fn this(&self) -> &'a ObjectInstance {
    self.this
  }

  /// Reads a property of the receiver, delegating to its prototype as usual.
  pub fn this_get(&self, name: &str) -> Result<&'a Value, ModelError> {
    self.model.get(self.this, name)
  }

  pub fn args(&self) -> &'a [Value] {
    self.args
  }

  /// The argument at `index`, or `undefined` if fewer were passed.
  pub fn arg(&self, index: usize) -> Value {
    self.args.get(index).cloned().unwrap_or(Value::Undefined)
  }
}
