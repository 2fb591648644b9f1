//! GitHub Actions workflow commands: step outputs, log groups, annotations.
//!
//! Log groups are written with a single `println!` so that groups emitted from
//! concurrently processed suites and runs never interleave line-by-line.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

/// Name of the step output carrying the number of cancellation requests.
pub const CANCELLED_RUNS_OUTPUT: &str = "cancelled-runs";

/// Keys dropped from diagnostic dumps at any depth: back-references to the
/// repository, user objects, and free text.
const ELIDED_KEYS: &[&str] = &[
    "repository",
    "head_repository",
    "repo",
    "user",
    "owner",
    "actor",
    "triggering_actor",
    "sender",
    "labels",
    "body",
];

/// Sets a step output.
///
/// Appends to the `GITHUB_OUTPUT` file when the runner provides one. The
/// deprecated `::set-output` command is only used on runners too old to set
/// `GITHUB_OUTPUT`, and a warning is logged when that happens.
pub fn set_output(name: &str, value: &str) -> io::Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) if !path.is_empty() => append_output(Path::new(&path), name, value),
        _ => {
            tracing::warn!(name, "GITHUB_OUTPUT is not set, using deprecated ::set-output");
            println!("{}", legacy_set_output(name, value));
            Ok(())
        }
    }
}

fn legacy_set_output(name: &str, value: &str) -> String {
    format!("::set-output name={}::{}", name, escape_data(value))
}

/// Appends `name=value` to a step output file.
pub fn append_output(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}={}", name, value)
}

/// Emits an error annotation marking the step failed.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Emits a warning annotation.
pub fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

/// Dumps `value` as pretty JSON inside a collapsible log group, with
/// [`ELIDED_KEYS`] removed.
pub fn dump_group(title: &str, value: &impl Serialize) {
    let body = match serde_json::to_value(value) {
        Ok(v) => serde_json::to_string_pretty(&elide(v)).unwrap_or_default(),
        Err(e) => format!("<unserializable: {}>", e),
    };
    println!("::group::{}\n{}\n::endgroup::", title, body);
}

/// Recursively removes [`ELIDED_KEYS`] from every object in `value`.
pub fn elide(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !ELIDED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k, elide(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(elide).collect()),
        other => other,
    }
}

/// Workflow command data escaping: `%`, CR and LF would otherwise end or
/// corrupt the command.
fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
