use proto_js::{MethodTable, ObjectModel, PropertyMap, Strategy, Value};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedWriter {
  buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
  fn contents(&self) -> String {
    String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
  }
}

struct SharedWriterGuard<'a> {
  buffer: &'a Arc<Mutex<Vec<u8>>>,
}

impl<'a> io::Write for SharedWriterGuard<'a> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buffer.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for SharedWriter {
  type Writer = SharedWriterGuard<'a>;

  fn make_writer(&'a self) -> Self::Writer {
    SharedWriterGuard {
      buffer: &self.buffer,
    }
  }
}

#[test]
fn lazy_population_is_logged_once() {
  let writer = SharedWriter::default();
  let subscriber = tracing_subscriber::fmt()
    .with_writer(writer.clone())
    .with_max_level(tracing::Level::DEBUG)
    .with_ansi(false)
    .finish();

  tracing::subscriber::with_default(subscriber, || {
    let mut model = ObjectModel::new();
    let methods = MethodTable::new().with("sayName", |call| Ok(call.this_get("name")?.clone()));
    let mut fields = PropertyMap::new();
    fields.insert("name".to_string(), Value::from("Nicholas"));
    for _ in 0..3 {
      model
        .construct(Strategy::DynamicPrototype, &fields, &methods, "Person4")
        .unwrap();
    }
  });

  let output = writer.contents();
  assert_eq!(
    output.matches("populating prototype lazily").count(),
    1,
    "unexpected log output:\n{output}"
  );
  assert_eq!(output.matches("allocated prototype record").count(), 1);
  assert!(output.contains("construct"), "spans should be recorded:\n{output}");
}

#[test]
fn replacement_is_logged_whether_or_not_the_tag_had_a_record() {
  let writer = SharedWriter::default();
  let subscriber = tracing_subscriber::fmt()
    .with_writer(writer.clone())
    .with_max_level(tracing::Level::DEBUG)
    .with_ansi(false)
    .finish();

  tracing::subscriber::with_default(subscriber, || {
    let mut model = ObjectModel::new();
    // No record yet for `Fresh`; `Known` gets one from `create_record`.
    model.replace_prototype("Fresh", &MethodTable::new()).unwrap();
    model.create_record("Known").unwrap();
    model.replace_prototype("Known", &MethodTable::new()).unwrap();
  });

  let output = writer.contents();
  assert_eq!(
    output
      .matches("severed constructor link on replacement record")
      .count(),
    2,
    "unexpected log output:\n{output}"
  );
  assert!(output.contains("replace_slots{tag=Fresh"), "{output}");
  assert!(output.contains("replace_slots{tag=Known"), "{output}");
}
