use crate::config::AUTHOR_KEY_PREFIX;
use crate::models::Author;
use serde_json::{Map, Value};
use tracing::debug;

/// Builds an [`Author`] from a parsed author record. Missing fields become empty strings.
pub fn map_author(record: &Map<String, Value>) -> Author {
    let author = Author {
        id: strip_key(opt_str(record, "key"), AUTHOR_KEY_PREFIX),
        name: opt_str(record, "name").to_string(),
    };
    debug!(name = %author.name, "Mapped author");
    author
}

/// String value of `field`, or `""` when it is absent or not a string.
pub(crate) fn opt_str<'a>(record: &'a Map<String, Value>, field: &str) -> &'a str {
    record.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Removes every occurrence of `prefix` from a namespaced key.
pub(crate) fn strip_key(key: &str, prefix: &str) -> String {
    key.replace(prefix, "")
}
