use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

/// A work from the dump, enriched with author names at ingestion time.
///
/// `author_names[i]` is the name `author_ids[i]` resolved to when the book was
/// loaded; it is not refreshed if the author changes later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub description: String,
    pub published_date: Option<NaiveDate>,
    pub cover_ids: Vec<String>,
    pub author_ids: Vec<String>,
    pub author_names: Vec<String>,
}
