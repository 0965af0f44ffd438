use crate::ModelError;
use core::fmt;
use core::str::FromStr;
use serde::Serialize;

/// How [`ObjectModel::construct`](crate::ObjectModel::construct) lays out a new instance.
///
/// | strategy | own properties | prototype |
/// |---|---|---|
/// | `factory` | fields + fresh copies of every method | none |
/// | `constructorOnly` | fields + fresh copies of every method | none |
/// | `constructorWithPrototype` | fields | per-tag record, methods written when it is created |
/// | `dynamicPrototype` | fields | per-tag record, methods written lazily if it is empty |
///
/// Parasitic and durable constructors only differ from `factory` in calling convention, so they
/// are built with `factory`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
  Factory,
  ConstructorOnly,
  ConstructorWithPrototype,
  DynamicPrototype,
}

impl Strategy {
  pub const ALL: [Strategy; 4] = [
    Strategy::Factory,
    Strategy::ConstructorOnly,
    Strategy::ConstructorWithPrototype,
    Strategy::DynamicPrototype,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Strategy::Factory => "factory",
      Strategy::ConstructorOnly => "constructorOnly",
      Strategy::ConstructorWithPrototype => "constructorWithPrototype",
      Strategy::DynamicPrototype => "dynamicPrototype",
    }
  }

  /// Whether instances built with this strategy delegate to a shared record.
  pub fn uses_prototype(self) -> bool {
    matches!(
      self,
      Strategy::ConstructorWithPrototype | Strategy::DynamicPrototype
    )
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Strategy {
  type Err = ModelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Strategy::ALL
      .into_iter()
      .find(|strategy| strategy.as_str() == s)
      .ok_or_else(|| ModelError::InvalidStrategy(s.to_string()))
  }
}
