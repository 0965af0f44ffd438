use core::fmt;
use serde::Serialize;
use std::borrow::Borrow;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identity of a [`PrototypeRecord`](crate::PrototypeRecord) within an
/// [`ObjectModel`](crate::ObjectModel).
///
/// This is a packed `{ index: u32, model: u32 }`.
/// - `index` selects a slot in the model's record table.
/// - `model` is the nonce of the model that allocated the record, so a handle from one model is
///   never mistaken for a record of another.
///
/// Ids are never reused: replacing a record's slots allocates a new record with a new id, so two
/// instances compare equal here only if they were attached to the very same record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RecordId(pub(crate) u64);

impl RecordId {
  pub(crate) fn from_parts(index: u32, model: ModelNonce) -> Self {
    Self((index as u64) | ((model.0 as u64) << 32))
  }

  /// The slot index within the model's record table.
  #[inline]
  pub fn index(self) -> u32 {
    self.0 as u32
  }

  #[inline]
  pub(crate) fn model(self) -> ModelNonce {
    ModelNonce((self.0 >> 32) as u32)
  }
}

impl fmt::Debug for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecordId")
      .field("index", &self.index())
      .field("model", &self.model().0)
      .finish()
  }
}

// Snapshots only ever describe records of one model.
impl Serialize for RecordId {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(self.index())
  }
}

/// Identity of a single method object.
///
/// Every method allocation gets a fresh id, even when two methods share the same native body.
/// This mirrors a function expression being evaluated twice: same code, two distinct objects.
/// Like [`RecordId`], the id carries the nonce of the allocating model.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct MethodId {
  pub(crate) model: ModelNonce,
  pub(crate) seq: u64,
}

impl Serialize for MethodId {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(self.seq)
  }
}

/// Per-model nonce distinguishing handles of different [`ObjectModel`](crate::ObjectModel)s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub(crate) struct ModelNonce(pub(crate) u32);

static NEXT_MODEL_NONCE: AtomicU32 = AtomicU32::new(0);

impl ModelNonce {
  pub(crate) fn next() -> Self {
    Self(NEXT_MODEL_NONCE.fetch_add(1, Ordering::Relaxed))
  }
}

/// Symbolic name grouping instances built from the same template (e.g. `"Person3"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatorTag(Rc<str>);

impl CreatorTag {
  pub fn new(name: &str) -> Self {
    Self(Rc::from(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for CreatorTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "CreatorTag({:?})", &*self.0)
  }
}

impl fmt::Display for CreatorTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// `Rc<str>` hashes and compares like `str`, so map lookups by `&str` are consistent.
impl Borrow<str> for CreatorTag {
  fn borrow(&self) -> &str {
    &self.0
  }
}

impl From<&str> for CreatorTag {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

impl From<String> for CreatorTag {
  fn from(value: String) -> Self {
    Self(Rc::from(value))
  }
}

impl Serialize for CreatorTag {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}
