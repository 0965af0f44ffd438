use crate::{PropertyMap, RecordId, Value};

/// An object instance: an exclusively owned map of own properties plus a non-owning reference to
/// at most one [`PrototypeRecord`](crate::PrototypeRecord).
///
/// The caller owns the instance. The record it points at is owned by the
/// [`ObjectModel`](crate::ObjectModel), so dropping an instance never affects other delegators.
#[derive(Debug, Clone)]
pub struct ObjectInstance {
  own: PropertyMap,
  prototype: Option<RecordId>,
}

impl ObjectInstance {
  pub(crate) fn new(own: PropertyMap, prototype: Option<RecordId>) -> Self {
    Self { own, prototype }
  }

  /// The record this instance delegates to, if any.
  pub fn prototype(&self) -> Option<RecordId> {
    self.prototype
  }

  /// Rebinds the delegation target. Own properties are untouched.
  pub fn set_prototype(&mut self, prototype: Option<RecordId>) {
    self.prototype = prototype;
  }

  pub fn get_own(&self, name: &str) -> Option<&Value> {
    self.own.get(name)
  }

  /// Writes an own property.
  ///
  /// This never touches the prototype record, even when it has a slot with the same name: the own
  /// value shadows the slot from now on.
  pub fn set_own(&mut self, name: &str, value: impl Into<Value>) {
    self.own.insert(name.to_string(), value.into());
  }

  /// Removes an own property, uncovering any prototype slot it was shadowing.
  pub fn delete_own(&mut self, name: &str) -> Option<Value> {
    self.own.remove(name)
  }

  pub fn has_own_property(&self, name: &str) -> bool {
    self.own.contains_key(name)
  }

  /// Own property names, in sorted order.
  pub fn own_keys(&self) -> impl Iterator<Item = &str> {
    self.own.keys().map(String::as_str)
  }

  pub fn own_properties(&self) -> &PropertyMap {
    &self.own
  }
}
