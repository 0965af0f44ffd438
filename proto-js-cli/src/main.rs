use clap::Parser;
use proto_js::{
  InstanceSnapshot, MethodTable, ModelError, ObjectInstance, ObjectModel, PropertyMap, Strategy,
  Value,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::stdout;
use std::process;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[command(
  name = "proto-js",
  about = "Construct objects and report how they share prototype state"
)]
struct Cli {
  /// Construction strategy: factory, constructorOnly, constructorWithPrototype or
  /// dynamicPrototype.
  #[arg(short, long)]
  strategy: String,

  /// Creator tag grouping the constructed instances.
  #[arg(short, long, default_value = "Person")]
  tag: String,

  /// Own field as NAME=VALUE. Values may be true, false, null, numbers, [a,b] arrays or strings.
  #[arg(short, long = "field", value_name = "NAME=VALUE")]
  fields: Vec<String>,

  /// Method to define; its body returns the receiver's `name`.
  #[arg(short, long = "method", value_name = "NAME")]
  methods: Vec<String>,

  /// Number of instances to construct.
  #[arg(short = 'n', long, default_value_t = 2)]
  count: usize,

  /// Replace the tag's prototype after this many constructions.
  #[arg(long, value_name = "N")]
  replace_after: Option<usize>,

  /// Method for the replacement prototype.
  #[arg(long = "replace-method", value_name = "NAME")]
  replace_methods: Vec<String>,

  /// Emit tracing spans (JSON) on stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Serialize)]
struct Report {
  schema_version: u32,
  strategy: Strategy,
  tag: String,
  instances: Vec<InstanceSnapshot>,
  checks: Checks,
}

/// Each vector holds one entry per instance, comparing instance 0 with instance `i`.
#[derive(Default, Serialize)]
struct Checks {
  shares_record: Vec<bool>,
  /// `null` where the method does not resolve on one of the two instances.
  same_method_reference: BTreeMap<String, Vec<Option<bool>>>,
  produced_by: Vec<bool>,
  is_instance_of: Vec<bool>,
}

fn parse_value(raw: &str) -> Value {
  let raw = raw.trim();
  if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
    if inner.trim().is_empty() {
      return Value::array([]);
    }
    return Value::array(inner.split(',').map(parse_value));
  }
  match raw {
    "true" => Value::Bool(true),
    "false" => Value::Bool(false),
    "null" => Value::Null,
    _ => match raw.parse::<f64>() {
      Ok(n) => Value::Number(n),
      Err(_) => Value::from(raw),
    },
  }
}

fn parse_fields(raw: &[String]) -> Result<PropertyMap, String> {
  let mut fields = PropertyMap::new();
  for field in raw {
    let Some((name, value)) = field.split_once('=') else {
      return Err(format!("field {field:?} is not of the form NAME=VALUE"));
    };
    fields.insert(name.to_string(), parse_value(value));
  }
  Ok(fields)
}

fn method_table(names: &[String]) -> MethodTable {
  let mut table = MethodTable::new();
  for name in names {
    table.insert(name, |call| match call.this_get("name") {
      Ok(value) => Ok(value.clone()),
      Err(ModelError::PropertyNotFound(_)) => Ok(Value::Undefined),
      Err(err) => Err(err),
    });
  }
  table
}

fn checks(model: &ObjectModel, tag: &str, names: &[&str], instances: &[ObjectInstance]) -> Checks {
  let mut checks = Checks::default();
  let Some(first) = instances.first() else {
    return checks;
  };
  for inst in instances {
    checks.shares_record.push(model.shares_record_with(first, inst));
    checks.produced_by.push(model.produced_by(inst, tag));
    checks.is_instance_of.push(model.is_instance_of(inst, tag));
    for &name in names {
      checks
        .same_method_reference
        .entry(name.to_string())
        .or_default()
        .push(model.same_method_reference(first, inst, name).ok());
    }
  }
  checks
}

fn run(args: &Cli) -> Result<Report, String> {
  let strategy: Strategy = args.strategy.parse().map_err(|err: ModelError| err.to_string())?;
  let fields = parse_fields(&args.fields)?;
  if let Some(after) = args.replace_after {
    if after >= args.count {
      return Err(format!(
        "--replace-after {after} must be less than --count {count}",
        count = args.count
      ));
    }
  }
  let methods = method_table(&args.methods);
  let replacement = method_table(&args.replace_methods);

  let mut model = ObjectModel::new();
  let mut instances = Vec::with_capacity(args.count);
  for i in 0..args.count {
    if args.replace_after == Some(i) {
      model
        .replace_prototype(&args.tag, &replacement)
        .map_err(|err| err.to_string())?;
    }
    let inst = model
      .construct(strategy, &fields, &methods, &args.tag)
      .map_err(|err| err.to_string())?;
    instances.push(inst);
  }

  let mut names: Vec<&str> = methods.names().chain(replacement.names()).collect();
  names.sort_unstable();
  names.dedup();
  let checks = checks(&model, &args.tag, &names, &instances);
  let instances = instances
    .iter()
    .map(|inst| model.snapshot(inst))
    .collect::<Result<Vec<_>, _>>()
    .map_err(|err| err.to_string())?;

  Ok(Report {
    schema_version: 1,
    strategy,
    tag: args.tag.clone(),
    instances,
    checks,
  })
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::TRACE)
    .with_writer(std::io::stderr)
    .json()
    .with_ansi(false)
    .try_init();
}

fn main() {
  let args = Cli::parse();
  init_tracing(args.trace);
  match run(&args) {
    Ok(report) => serde_json::to_writer(stdout(), &report).expect("write to stdout"),
    Err(err) => {
      eprintln!("error: {err}");
      process::exit(1);
    }
  }
}
