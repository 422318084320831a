//! Work records: dump object -> [`Book`].
//!
//! Mapping happens in two steps. [`parse_work`] is pure and can run on any
//! thread; [`WorkRecord::resolve`] needs the store to look up author names and
//! runs in file order on the driver.

use crate::author::{opt_str, strip_key};
use crate::config::{AUTHOR_KEY_PREFIX, CREATED_FORMAT, NOT_AVAILABLE, WORK_KEY_PREFIX};
use crate::error::{Error, Result};
use crate::models::Book;
use crate::resolve::AuthorResolver;
use crate::store::Store;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

/// A parsed work whose author names have not been looked up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub published_date: Option<NaiveDate>,
    pub cover_ids: Vec<String>,
    pub author_ids: Vec<String>,
}

pub fn parse_work(record: &Map<String, Value>) -> Result<WorkRecord> {
    let key = record
        .get("key")
        .and_then(Value::as_str)
        .ok_or(Error::RequiredFieldMissing("key"))?;

    let description = match record.get("description").and_then(Value::as_object) {
        Some(obj) => opt_str(obj, "value").to_string(),
        None => NOT_AVAILABLE.to_string(),
    };

    let published_date = match record.get("created").and_then(Value::as_object) {
        Some(obj) => Some(parse_created(opt_str(obj, "value"))?),
        None => None,
    };

    let cover_ids = match record.get("covers").and_then(Value::as_array) {
        Some(covers) => covers.iter().map(cover_id).collect(),
        None => Vec::new(),
    };

    let author_ids = match record.get("authors").and_then(Value::as_array) {
        Some(authors) => authors
            .iter()
            .map(|entry| {
                entry
                    .get("author")
                    .and_then(|author| author.get("key"))
                    .and_then(Value::as_str)
                    .map(|key| strip_key(key, AUTHOR_KEY_PREFIX))
                    .ok_or(Error::RequiredFieldMissing("authors[].author.key"))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(WorkRecord {
        id: strip_key(key, WORK_KEY_PREFIX),
        name: opt_str(record, "title").to_string(),
        description,
        published_date,
        cover_ids,
        author_ids,
    })
}

impl WorkRecord {
    /// Resolves every author id, in order and one lookup per id, into a [`Book`].
    pub async fn resolve<S: Store>(self, resolver: &AuthorResolver<'_, S>) -> Book {
        let mut author_names = Vec::with_capacity(self.author_ids.len());
        for id in &self.author_ids {
            author_names.push(resolver.resolve(id).await);
        }

        debug!(name = %self.name, "Mapped book");

        Book {
            id: self.id,
            name: self.name,
            description: self.description,
            published_date: self.published_date,
            cover_ids: self.cover_ids,
            author_ids: self.author_ids,
            author_names,
        }
    }
}

/// Parses a work record and resolves its authors.
pub async fn map_work<S: Store>(
    record: &Map<String, Value>,
    resolver: &AuthorResolver<'_, S>,
) -> Result<Book> {
    Ok(parse_work(record)?.resolve(resolver).await)
}

/// Date component of a `created.value` timestamp such as `2009-12-11T01:57:19.964652`.
pub fn parse_created(value: &str) -> Result<NaiveDate> {
    NaiveDateTime::parse_from_str(value, CREATED_FORMAT)
        .map(|ts| ts.date())
        .map_err(|source| Error::DateParse {
            value: value.to_string(),
            source,
        })
}

fn cover_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
