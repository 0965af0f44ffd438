//! A prototype-delegation object model.
//!
//! Objects are split into two tiers:
//! - own properties, stored on each [`ObjectInstance`] and owned exclusively by it, and
//! - a [`PrototypeRecord`], owned by the [`ObjectModel`] and shared by every instance that
//!   delegates to it.
//!
//! Lookups ([`ObjectModel::get`]) consult the own tier first and fall back to the record's slots.
//! Writes through [`ObjectInstance::set_own`] only ever touch the own tier, so an own property
//! shadows a same-named slot rather than merging with it.
//!
//! # Construction strategies
//!
//! [`ObjectModel::construct`] supports four [`Strategy`] values. The copying strategies
//! (`factory`, `constructorOnly`) give every instance private copies of every method, so no two
//! instances share a method object and there is no record to type-test against. The delegating
//! strategies (`constructorWithPrototype`, `dynamicPrototype`) write methods once into a record per
//! [`CreatorTag`], so every instance of the tag sees the same method objects.
//!
//! # Shared mutation vs. replacement
//!
//! A record's slots can be changed in two ways with different sharing outcomes:
//! - [`ObjectModel::mutate_shared_slot`] writes in place; every current delegator sees it.
//! - [`ObjectModel::replace_prototype`] allocates a new record for the tag; existing instances keep
//!   the old record and only later constructions attach to the new one.

mod error;
mod handle;
mod instance;
mod model;
mod record;
mod snapshot;
mod strategy;
mod value;

pub use crate::error::ModelError;
pub use crate::handle::CreatorTag;
pub use crate::handle::MethodId;
pub use crate::handle::RecordId;
pub use crate::instance::ObjectInstance;
pub use crate::model::ModelLimits;
pub use crate::model::ObjectModel;
pub use crate::record::PrototypeRecord;
pub use crate::snapshot::InstanceSnapshot;
pub use crate::snapshot::RecordSnapshot;
pub use crate::strategy::Strategy;
pub use crate::value::Method;
pub use crate::value::MethodCall;
pub use crate::value::MethodTable;
pub use crate::value::NativeMethod;
pub use crate::value::PropertyMap;
pub use crate::value::Value;
