use crate::{CreatorTag, ModelError, ObjectInstance, ObjectModel, PropertyMap, RecordId};
use serde::Serialize;

/// A serializable view of an [`ObjectInstance`].
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSnapshot {
  pub own: PropertyMap,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prototype: Option<RecordSnapshot>,
}

/// A serializable view of a [`PrototypeRecord`](crate::PrototypeRecord).
#[derive(Debug, Clone, Serialize)]
pub struct RecordSnapshot {
  pub id: RecordId,
  pub creator_tag: CreatorTag,
  pub constructor: Option<CreatorTag>,
  pub slots: PropertyMap,
}

impl ObjectModel {
  pub fn record_snapshot(&self, id: RecordId) -> Result<RecordSnapshot, ModelError> {
    let record = self.record(id)?;
    Ok(RecordSnapshot {
      id,
      creator_tag: record.creator_tag().clone(),
      constructor: record.constructor().cloned(),
      slots: record.slots().clone(),
    })
  }

  pub fn snapshot(&self, instance: &ObjectInstance) -> Result<InstanceSnapshot, ModelError> {
    let prototype = match instance.prototype() {
      Some(id) => Some(self.record_snapshot(id)?),
      None => None,
    };
    Ok(InstanceSnapshot {
      own: instance.own_properties().clone(),
      prototype,
    })
  }
}
