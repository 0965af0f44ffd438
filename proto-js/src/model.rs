use crate::handle::ModelNonce;
use crate::value::MethodCall;
use crate::{
  CreatorTag, Method, MethodId, MethodTable, ModelError, NativeMethod, ObjectInstance,
  PropertyMap, PrototypeRecord, RecordId, Strategy, Value,
};
use ahash::AHashMap;
use std::rc::Rc;
use tracing::{debug, debug_span, trace};

/// Model configuration and resource limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelLimits {
  /// Maximum number of prototype records the model will allocate over its lifetime. Records are
  /// never freed, since old instances may still delegate to a replaced record.
  pub max_records: usize,
}

impl ModelLimits {
  pub fn new(max_records: usize) -> Self {
    Self { max_records }
  }
}

impl Default for ModelLimits {
  fn default() -> Self {
    Self {
      max_records: usize::MAX,
    }
  }
}

/// Factory and runtime for prototype-delegating objects.
///
/// The model owns every [`PrototypeRecord`] and tracks, per [`CreatorTag`], the record that new
/// delegating instances attach to. Instances themselves are owned by the caller; there is no
/// registry of them.
///
/// Every model has its own nonce, carried by the [`RecordId`]s and [`MethodId`]s it hands out.
/// Passing an instance built by another model fails with [`ModelError::InvalidHandle`] for
/// lookups, and never compares equal in the identity tests.
///
/// # Lazy initialization
///
/// [`Strategy::DynamicPrototype`] populates a tag's record with a check-then-act sequence. The
/// model is single-threaded (`!Sync`) so this is sound here, but a host that shares a model behind
/// a lock must hold it across the whole `construct` call.
pub struct ObjectModel {
  nonce: ModelNonce,
  limits: ModelLimits,
  records: Vec<PrototypeRecord>,
  /// The record each tag's future constructions attach to.
  current: AHashMap<CreatorTag, RecordId>,
  next_method_id: u64,
}

impl Default for ObjectModel {
  fn default() -> Self {
    Self::new()
  }
}

impl ObjectModel {
  pub fn new() -> Self {
    Self::with_limits(ModelLimits::default())
  }

  pub fn with_limits(limits: ModelLimits) -> Self {
    Self {
      nonce: ModelNonce::next(),
      limits,
      records: Vec::new(),
      current: AHashMap::new(),
      next_method_id: 0,
    }
  }

  pub fn limits(&self) -> ModelLimits {
    self.limits
  }

  /// Number of records allocated so far, including replaced ones.
  pub fn record_count(&self) -> usize {
    self.records.len()
  }

  pub fn record(&self, id: RecordId) -> Result<&PrototypeRecord, ModelError> {
    if id.model() != self.nonce {
      return Err(ModelError::InvalidHandle);
    }
    self
      .records
      .get(id.index() as usize)
      .ok_or(ModelError::InvalidHandle)
  }

  fn record_mut(&mut self, id: RecordId) -> Result<&mut PrototypeRecord, ModelError> {
    if id.model() != self.nonce {
      return Err(ModelError::InvalidHandle);
    }
    self
      .records
      .get_mut(id.index() as usize)
      .ok_or(ModelError::InvalidHandle)
  }

  /// The record new instances of `tag` attach to, if one exists yet.
  pub fn current_record(&self, tag: &str) -> Option<RecordId> {
    self.current.get(tag).copied()
  }

  /// Like [`ObjectModel::current_record`], but a missing record is an error.
  pub fn record_for_tag(&self, tag: &str) -> Result<RecordId, ModelError> {
    self
      .current_record(tag)
      .ok_or_else(|| ModelError::UnknownCreatorTag(CreatorTag::new(tag)))
  }

  fn next_record_id(&self) -> Result<RecordId, ModelError> {
    let len = self.records.len();
    if len >= self.limits.max_records || len >= u32::MAX as usize {
      return Err(ModelError::RecordLimitExceeded {
        limit: self.limits.max_records,
      });
    }
    Ok(RecordId::from_parts(len as u32, self.nonce))
  }

  /// Stores `record`, optionally making it the current record for its tag.
  fn push_record(&mut self, record: PrototypeRecord, bind: bool) -> RecordId {
    let id = record.id();
    debug!(record = id.index(), tag = %record.creator_tag(), bind, "allocated prototype record");
    if bind {
      self.current.insert(record.creator_tag().clone(), id);
    }
    self.records.push(record);
    id
  }

  /// Allocates an empty record for `tag` and makes it the tag's current record.
  pub fn create_record(&mut self, tag: &str) -> Result<RecordId, ModelError> {
    let id = self.next_record_id()?;
    Ok(self.push_record(PrototypeRecord::new(id, CreatorTag::new(tag)), true))
  }

  /// Writes a slot in place. Every instance delegating to `record` observes the new value.
  pub fn set_slot(&mut self, record: RecordId, name: &str, value: Value) -> Result<(), ModelError> {
    let record = self.record_mut(record)?;
    trace!(record = record.id().index(), name, "set prototype slot");
    record.set_slot(name, value);
    Ok(())
  }

  /// Swaps `record`'s slots wholesale.
  ///
  /// The old record is left as is: instances that already delegate to it keep doing so and never
  /// see `slots`. A new record carrying `slots` is returned, and if `record` was its tag's current
  /// record the tag is rebound so only later constructions attach to the new one. The new record
  /// has no constructor back-link.
  pub fn replace_slots(
    &mut self,
    record: RecordId,
    slots: PropertyMap,
  ) -> Result<RecordId, ModelError> {
    let tag = self.record(record)?.creator_tag().clone();
    let id = self.next_record_id()?;
    let was_current = self.current.get(&tag) == Some(&record);
    let span = debug_span!("replace_slots", tag = %tag, old = record.index(), new = id.index());
    let _guard = span.enter();

    self.push_record(PrototypeRecord::with_slots(id, tag, slots), was_current);
    debug!("severed constructor link on replacement record");
    Ok(id)
  }

  fn alloc_method(&mut self, name: &str, body: &NativeMethod) -> Method {
    let id = MethodId {
      model: self.nonce,
      seq: self.next_method_id,
    };
    self.next_method_id += 1;
    Method::new(id, name, Rc::clone(body))
  }

  /// Allocates a standalone method object, e.g. to store via
  /// [`ObjectModel::mutate_shared_slot`].
  pub fn method<F>(&mut self, name: &str, body: F) -> Method
  where
    F: Fn(&MethodCall<'_>) -> Result<Value, ModelError> + 'static,
  {
    let body: NativeMethod = Rc::new(body);
    self.alloc_method(name, &body)
  }

  fn write_methods(&mut self, record: RecordId, methods: &MethodTable) -> Result<(), ModelError> {
    for (name, body) in methods.iter() {
      let method = self.alloc_method(name, body);
      self.set_slot(record, name, Value::Method(method))?;
    }
    Ok(())
  }

  /// Builds a new instance.
  ///
  /// `fields` always become own properties. Where `methods` end up depends on `strategy`; see
  /// [`Strategy`]. `tag` is ignored by the copying strategies, which never create a record.
  ///
  /// On error no instance is produced and the model is unchanged.
  pub fn construct(
    &mut self,
    strategy: Strategy,
    fields: &PropertyMap,
    methods: &MethodTable,
    tag: &str,
  ) -> Result<ObjectInstance, ModelError> {
    let span = debug_span!("construct", strategy = %strategy, tag);
    let _guard = span.enter();

    let prototype = match strategy {
      Strategy::Factory | Strategy::ConstructorOnly => None,
      Strategy::ConstructorWithPrototype => Some(match self.current_record(tag) {
        Some(id) => id,
        None => {
          let id = self.create_record(tag)?;
          self.write_methods(id, methods)?;
          id
        }
      }),
      Strategy::DynamicPrototype => {
        let id = match self.current_record(tag) {
          Some(id) => id,
          None => self.create_record(tag)?,
        };
        if !self.record(id)?.is_populated() {
          debug!(record = id.index(), "populating prototype lazily");
          self.write_methods(id, methods)?;
        }
        Some(id)
      }
    };

    let mut own = fields.clone();
    if !strategy.uses_prototype() {
      for (name, body) in methods.iter() {
        let method = self.alloc_method(name, body);
        own.insert(name.clone(), Value::Method(method));
      }
    }
    trace!(own = own.len(), "constructed instance");
    Ok(ObjectInstance::new(own, prototype))
  }

  /// [`ObjectModel::construct`] with the strategy given by name.
  pub fn construct_named(
    &mut self,
    strategy: &str,
    fields: &PropertyMap,
    methods: &MethodTable,
    tag: &str,
  ) -> Result<ObjectInstance, ModelError> {
    let strategy: Strategy = strategy.parse()?;
    self.construct(strategy, fields, methods, tag)
  }

  /// Property lookup: own properties first, then the prototype record's slots.
  ///
  /// Delegation is a single level deep.
  pub fn get<'a>(
    &'a self,
    instance: &'a ObjectInstance,
    name: &str,
  ) -> Result<&'a Value, ModelError> {
    if let Some(value) = instance.get_own(name) {
      return Ok(value);
    }
    if let Some(id) = instance.prototype() {
      if let Some(value) = self.record(id)?.slot(name) {
        return Ok(value);
      }
    }
    Err(ModelError::PropertyNotFound(name.to_string()))
  }

  /// Whether `name` resolves on `instance`, either as an own property or through delegation.
  pub fn has_property(&self, instance: &ObjectInstance, name: &str) -> bool {
    self.get(instance, name).is_ok()
  }

  /// Looks up `name` and calls it with `instance` as the receiver.
  pub fn call_method(
    &self,
    instance: &ObjectInstance,
    name: &str,
    args: &[Value],
  ) -> Result<Value, ModelError> {
    let method = self
      .get(instance, name)?
      .as_method()
      .ok_or(ModelError::NotCallable)?;
    method.invoke(&MethodCall::new(self, instance, args))
  }

  /// Whether both instances delegate to the same record of this model. Instances without a
  /// record share nothing.
  pub fn shares_record_with(&self, a: &ObjectInstance, b: &ObjectInstance) -> bool {
    matches!(
      (a.prototype(), b.prototype()),
      (Some(a), Some(b)) if a == b && a.model() == self.nonce
    )
  }

  /// Whether `instance` delegates to a record created for `tag`.
  ///
  /// Always false for instances built by the copying strategies.
  pub fn produced_by(&self, instance: &ObjectInstance, tag: &str) -> bool {
    instance
      .prototype()
      .and_then(|id| self.record(id).ok())
      .is_some_and(|record| record.creator_tag().as_str() == tag)
  }

  /// `instanceof`: whether `instance` delegates to the tag's current record.
  ///
  /// Unlike [`ObjectModel::produced_by`], this turns false for instances built before the tag's
  /// prototype was replaced.
  pub fn is_instance_of(&self, instance: &ObjectInstance, tag: &str) -> bool {
    match (instance.prototype(), self.current_record(tag)) {
      (Some(proto), Some(current)) => proto == current,
      _ => false,
    }
  }

  /// The constructor back-link of the instance's record, if it has one.
  pub fn constructor_of(&self, instance: &ObjectInstance) -> Option<&CreatorTag> {
    let id = instance.prototype()?;
    self.record(id).ok()?.constructor()
  }

  /// Restores the constructor back-link on the tag's current record.
  pub fn relink_constructor(&mut self, tag: &str) -> Result<(), ModelError> {
    let id = self.record_for_tag(tag)?;
    let record = self.record_mut(id)?;
    let tag = record.creator_tag().clone();
    record.set_constructor(Some(tag));
    Ok(())
  }

  /// Whether `name` resolves to the very same method object on both instances.
  ///
  /// Non-method values are never method references.
  pub fn same_method_reference(
    &self,
    a: &ObjectInstance,
    b: &ObjectInstance,
    name: &str,
  ) -> Result<bool, ModelError> {
    let a = self.get(a, name)?;
    let b = self.get(b, name)?;
    Ok(match (a, b) {
      (Value::Method(a), Value::Method(b)) => a.id() == b.id(),
      _ => false,
    })
  }

  /// Writes a slot on the tag's current record, visible to every instance delegating to it.
  pub fn mutate_shared_slot(
    &mut self,
    tag: &str,
    name: &str,
    value: impl Into<Value>,
  ) -> Result<(), ModelError> {
    let id = self.record_for_tag(tag)?;
    self.set_slot(id, name, value.into())
  }

  /// Replaces the tag's prototype with a fresh record holding `methods`.
  ///
  /// Only constructions after this call see the new record. See
  /// [`ObjectModel::replace_prototype_slots`].
  pub fn replace_prototype(
    &mut self,
    tag: &str,
    methods: &MethodTable,
  ) -> Result<RecordId, ModelError> {
    let mut slots = PropertyMap::new();
    for (name, body) in methods.iter() {
      let method = self.alloc_method(name, body);
      slots.insert(name.clone(), Value::Method(method));
    }
    self.replace_prototype_slots(tag, slots)
  }

  /// Replaces the tag's prototype with a fresh record holding arbitrary `slots`.
  ///
  /// A tag without a record simply gets one.
  pub fn replace_prototype_slots(
    &mut self,
    tag: &str,
    slots: PropertyMap,
  ) -> Result<RecordId, ModelError> {
    match self.current_record(tag) {
      Some(old) => self.replace_slots(old, slots),
      None => {
        let id = self.next_record_id()?;
        let span = debug_span!("replace_slots", tag = %tag, new = id.index());
        let _guard = span.enter();

        let record = PrototypeRecord::with_slots(id, CreatorTag::new(tag), slots);
        self.push_record(record, true);
        debug!("severed constructor link on replacement record");
        Ok(id)
      }
    }
  }
}
