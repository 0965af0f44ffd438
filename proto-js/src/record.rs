use crate::{CreatorTag, PropertyMap, RecordId, Value};

/// A shared record of slots that instances delegate to for properties they do not own.
///
/// The record's identity ([`RecordId`]) is fixed for its lifetime. Its slots are mutable in place,
/// and every instance currently delegating to the record observes such writes. Swapping the slots
/// wholesale is a different operation: it produces a new record (see
/// [`ObjectModel::replace_slots`](crate::ObjectModel::replace_slots)).
#[derive(Debug, Clone)]
pub struct PrototypeRecord {
  id: RecordId,
  creator_tag: CreatorTag,
  slots: PropertyMap,
  /// Back-link from the record to the tag whose constructor owns it.
  constructor: Option<CreatorTag>,
  slot_writes: u64,
}

impl PrototypeRecord {
  pub(crate) fn new(id: RecordId, creator_tag: CreatorTag) -> Self {
    Self {
      id,
      constructor: Some(creator_tag.clone()),
      creator_tag,
      slots: PropertyMap::new(),
      slot_writes: 0,
    }
  }

  /// A record that starts out with `slots` and no constructor back-link.
  pub(crate) fn with_slots(id: RecordId, creator_tag: CreatorTag, slots: PropertyMap) -> Self {
    Self {
      id,
      creator_tag,
      slots,
      constructor: None,
      slot_writes: 0,
    }
  }

  #[inline]
  pub fn id(&self) -> RecordId {
    self.id
  }

  pub fn creator_tag(&self) -> &CreatorTag {
    &self.creator_tag
  }

  pub fn slot(&self, name: &str) -> Option<&Value> {
    self.slots.get(name)
  }

  pub fn slots(&self) -> &PropertyMap {
    &self.slots
  }

  /// Whether any slot has been written. Lazy initialization keys off this.
  pub fn is_populated(&self) -> bool {
    !self.slots.is_empty()
  }

  /// Number of in-place slot writes this record has seen.
  pub fn slot_writes(&self) -> u64 {
    self.slot_writes
  }

  pub fn constructor(&self) -> Option<&CreatorTag> {
    self.constructor.as_ref()
  }

  pub(crate) fn set_slot(&mut self, name: &str, value: Value) {
    self.slots.insert(name.to_string(), value);
    self.slot_writes += 1;
  }

  pub(crate) fn set_constructor(&mut self, tag: Option<CreatorTag>) {
    self.constructor = tag;
  }
}
