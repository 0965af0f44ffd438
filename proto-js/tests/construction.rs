use proto_js::{
  MethodTable, ModelError, ObjectModel, PropertyMap, Strategy, Value,
};

fn person(name: &str) -> PropertyMap {
  let mut fields = PropertyMap::new();
  fields.insert("name".to_string(), Value::from(name));
  fields.insert("age".to_string(), Value::from(26));
  fields.insert(
    "friends".to_string(),
    Value::array([Value::from("Lily"), Value::from("Ben")]),
  );
  fields
}

fn person_methods() -> MethodTable {
  MethodTable::new()
    .with("sayName", |call| Ok(call.this_get("name")?.clone()))
    .with("sayAge", |call| Ok(call.this_get("age")?.clone()))
}

#[test]
fn copying_strategies_give_every_instance_private_methods() -> Result<(), ModelError> {
  let mut model = ObjectModel::new();
  let methods = person_methods();

  for strategy in [Strategy::Factory, Strategy::ConstructorOnly] {
    let a = model.construct(strategy, &person("ben"), &methods, "Person")?;
    let b = model.construct(strategy, &person("shirley"), &methods, "Person")?;

    assert!(a.has_own_property("sayName"));
    assert!(a.has_own_property("sayAge"));
    assert_eq!(a.prototype(), None);
    for name in methods.names() {
      assert!(
        !model.same_method_reference(&a, &b, name)?,
        "{strategy} instances must not share {name}"
      );
    }
    assert!(!model.shares_record_with(&a, &b));
    assert!(!model.produced_by(&a, "Person"));
    assert!(!model.is_instance_of(&a, "Person"));
    assert_eq!(model.constructor_of(&a), None);
  }

  // The copying strategies never allocate records, whatever the tag.
  assert_eq!(model.record_count(), 0);
  assert_eq!(model.current_record("Person"), None);
  Ok(())
}

#[test]
fn copied_array_fields_are_independent() -> Result<(), ModelError> {
  let mut model = ObjectModel::new();
  let methods = person_methods();
  let mut a = model.construct(Strategy::Factory, &person("ben"), &methods, "Person")?;
  let b = model.construct(Strategy::Factory, &person("shirley"), &methods, "Person")?;

  let grown = model.get(&a, "friends")?.concat("mike")?;
  a.set_own("friends", grown);

  assert_eq!(
    model.get(&a, "friends")?,
    &Value::array(["Lily", "Ben", "mike"].map(Value::from))
  );
  assert_eq!(
    model.get(&b, "friends")?,
    &Value::array(["Lily", "Ben"].map(Value::from))
  );
  Ok(())
}

#[test]
fn delegating_strategies_share_method_identity() -> Result<(), ModelError> {
  let mut model = ObjectModel::new();
  let methods = person_methods();

  for (strategy, tag) in [
    (Strategy::ConstructorWithPrototype, "Person1"),
    (Strategy::DynamicPrototype, "Person4"),
  ] {
    let a = model.construct(strategy, &person("lily"), &methods, tag)?;
    let b = model.construct(strategy, &person("ben"), &methods, tag)?;

    // Methods live on the record only.
    assert!(!a.has_own_property("sayName"));
    assert!(model.has_property(&a, "sayName"));
    assert!(model.shares_record_with(&a, &b));
    for name in methods.names() {
      assert!(model.same_method_reference(&a, &b, name)?);
    }
    assert!(model.produced_by(&a, tag));
    assert!(model.is_instance_of(&b, tag));
    assert!(!model.produced_by(&a, "Other"));
    assert_eq!(model.constructor_of(&a).map(|t| t.as_str()), Some(tag));
    assert_eq!(model.current_record(tag), a.prototype());
  }
  assert_eq!(model.record_count(), 2);
  Ok(())
}

#[test]
fn separate_tags_get_separate_records() -> Result<(), ModelError> {
  let mut model = ObjectModel::new();
  let methods = person_methods();
  let a = model.construct(Strategy::ConstructorWithPrototype, &person("a"), &methods, "A")?;
  let b = model.construct(Strategy::ConstructorWithPrototype, &person("b"), &methods, "B")?;

  assert!(!model.shares_record_with(&a, &b));
  assert!(!model.same_method_reference(&a, &b, "sayName")?);
  assert!(model.produced_by(&a, "A"));
  assert!(!model.produced_by(&a, "B"));
  Ok(())
}

#[test]
fn own_array_reassignment_leaves_siblings_untouched() -> Result<(), ModelError> {
  let mut model = ObjectModel::new();
  let methods = MethodTable::new().with("sayName", |call| Ok(call.this_get("name")?.clone()));
  let mut fields = PropertyMap::new();
  fields.insert("name".to_string(), Value::from("Ben"));
  fields.insert(
    "friends".to_string(),
    Value::array([Value::from("Lily"), Value::from("Ben")]),
  );

  let mut i1 = model.construct_named("constructorWithPrototype", &fields, &methods, "Person3")?;
  let i2 = model.construct_named("constructorWithPrototype", &fields, &methods, "Person3")?;

  let grown = model.get(&i1, "friends")?.concat("mike")?;
  i1.set_own("friends", grown);

  assert_eq!(
    model.get(&i2, "friends")?,
    &Value::array([Value::from("Lily"), Value::from("Ben")])
  );
  assert_eq!(
    model.get(&i1, "friends")?.as_array().map(<[Value]>::len),
    Some(3)
  );
  assert!(model.same_method_reference(&i1, &i2, "sayName")?);
  Ok(())
}

#[test]
fn strategy_names_round_trip_and_reject_unknown() {
  for strategy in Strategy::ALL {
    assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
  }
  assert_eq!(
    "parasitic".parse::<Strategy>(),
    Err(ModelError::InvalidStrategy("parasitic".to_string()))
  );
}

#[test]
fn invalid_strategy_produces_no_instance_and_no_record() {
  let mut model = ObjectModel::new();
  let result = model.construct_named("Factory", &person("x"), &person_methods(), "Person");
  assert_eq!(
    result.err(),
    Some(ModelError::InvalidStrategy("Factory".to_string()))
  );
  assert_eq!(model.record_count(), 0);
}

#[test]
fn methods_are_called_with_the_instance_as_receiver() -> Result<(), ModelError> {
  let mut model = ObjectModel::new();
  let methods = person_methods();
  let p5 = model.construct(Strategy::ConstructorWithPrototype, &person("lily"), &methods, "Person1")?;
  let p6 = model.construct(Strategy::ConstructorWithPrototype, &person("Ben"), &methods, "Person1")?;

  assert_eq!(model.call_method(&p5, "sayName", &[])?, Value::from("lily"));
  assert_eq!(model.call_method(&p6, "sayName", &[])?, Value::from("Ben"));

  let p1 = model.construct(Strategy::Factory, &person("ben"), &methods, "")?;
  assert_eq!(model.call_method(&p1, "sayAge", &[])?, Value::from(26));
  Ok(())
}
