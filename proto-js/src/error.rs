use crate::CreatorTag;

/// Errors produced by the object model.
///
/// Every failure is synchronous and local to the call that produced it; the model is left in the
/// state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
  /// Neither the instance's own properties nor its prototype record define the name.
  #[error("property not found: {0}")]
  PropertyNotFound(String),

  /// The operation needs a prototype record for this tag, but none has been created yet.
  #[error("unknown creator tag: {0}")]
  UnknownCreatorTag(CreatorTag),

  /// A construction strategy name that the model does not support.
  #[error("invalid construction strategy: {0:?}")]
  InvalidStrategy(String),

  /// A record id that does not belong to this model.
  #[error("invalid handle")]
  InvalidHandle,

  /// Attempted to call a value that is not a method.
  #[error("value is not callable")]
  NotCallable,

  /// An operation was applied to a value of the wrong type (e.g. `concat` on a non-array).
  #[error("type error: {0}")]
  TypeError(&'static str),

  /// Allocating another prototype record would exceed [`ModelLimits::max_records`](crate::ModelLimits).
  #[error("prototype record limit exceeded (limit {limit})")]
  RecordLimitExceeded { limit: usize },
}
