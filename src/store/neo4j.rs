use super::Store;
use crate::config;
use crate::models::{Author, Book};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use neo4rs::{query, Graph, Query};
use tracing::info;

const CYPHER_SAVE_AUTHOR: &str = "MERGE (a:Author {id: $id}) SET a.name = $name;";

const CYPHER_SAVE_BOOK: &str = r#"MERGE (b:Book {id: $id})
SET b.name = $name,
    b.description = $description,
    b.published_date = $published_date,
    b.cover_ids = $cover_ids,
    b.author_ids = $author_ids,
    b.author_names = $author_names;"#;

const CYPHER_SAVE_BOOK_UNDATED: &str = r#"MERGE (b:Book {id: $id})
SET b.name = $name,
    b.description = $description,
    b.cover_ids = $cover_ids,
    b.author_ids = $author_ids,
    b.author_names = $author_names
REMOVE b.published_date;"#;

const CYPHER_FIND_AUTHOR: &str = "MATCH (a:Author {id: $id}) RETURN a.name AS name LIMIT 1;";

const CYPHER_FIND_BOOK: &str = r#"MATCH (b:Book {id: $id})
RETURN b.name AS name,
       b.description AS description,
       b.published_date AS published_date,
       b.cover_ids AS cover_ids,
       b.author_ids AS author_ids,
       b.author_names AS author_names
LIMIT 1;"#;

const SCHEMA: &[&str] = &[
    "CREATE CONSTRAINT author_id_unique IF NOT EXISTS FOR (a:Author) REQUIRE a.id IS UNIQUE;",
    "CREATE CONSTRAINT book_id_unique IF NOT EXISTS FOR (b:Book) REQUIRE b.id IS UNIQUE;",
];

/// Neo4j-backed store. Authors and books are `:Author` / `:Book` nodes keyed by `id`.
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = connect_with_retry(uri, user, password).await?;
        let store = Self { graph };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        for cypher in SCHEMA {
            run_cypher(&self.graph, query(cypher)).await?;
        }
        info!("Store constraints in place");
        Ok(())
    }
}

impl Store for Neo4jStore {
    async fn save_author(&self, author: &Author) -> Result<()> {
        let q = query(CYPHER_SAVE_AUTHOR)
            .param("id", author.id.as_str())
            .param("name", author.name.as_str());
        run_cypher(&self.graph, q).await
    }

    async fn save_book(&self, book: &Book) -> Result<()> {
        let q = match book.published_date {
            Some(date) => query(CYPHER_SAVE_BOOK).param("published_date", date.to_string()),
            None => query(CYPHER_SAVE_BOOK_UNDATED),
        };
        let q = q
            .param("id", book.id.as_str())
            .param("name", book.name.as_str())
            .param("description", book.description.as_str())
            .param("cover_ids", book.cover_ids.clone())
            .param("author_ids", book.author_ids.clone())
            .param("author_names", book.author_names.clone());
        run_cypher(&self.graph, q).await
    }

    async fn find_author(&self, id: &str) -> Result<Option<Author>> {
        let mut result = self
            .graph
            .execute(query(CYPHER_FIND_AUTHOR).param("id", id))
            .await
            .with_context(|| format!("Failed to look up author {id}"))?;

        match result.next().await? {
            Some(row) => {
                let name: String = row.get("name").context("Missing 'name' field in result")?;
                Ok(Some(Author {
                    id: id.to_string(),
                    name,
                }))
            }
            None => Ok(None),
        }
    }

    async fn find_book(&self, id: &str) -> Result<Option<Book>> {
        let mut result = self
            .graph
            .execute(query(CYPHER_FIND_BOOK).param("id", id))
            .await
            .with_context(|| format!("Failed to look up book {id}"))?;

        let Some(row) = result.next().await? else {
            return Ok(None);
        };

        let published: Option<String> = row.get("published_date").ok();
        let published_date = published
            .map(|s| s.parse::<NaiveDate>())
            .transpose()
            .with_context(|| format!("Stored published_date of book {id} is not a date"))?;

        Ok(Some(Book {
            id: id.to_string(),
            name: row.get("name").context("Missing 'name' field in result")?,
            description: row
                .get("description")
                .context("Missing 'description' field in result")?,
            published_date,
            cover_ids: row.get("cover_ids").unwrap_or_default(),
            author_ids: row.get("author_ids").unwrap_or_default(),
            author_names: row.get("author_names").unwrap_or_default(),
        }))
    }
}

async fn connect_with_retry(uri: &str, user: &str, password: &str) -> Result<Graph> {
    let max_retries = config::STORE_MAX_RETRIES;
    let delay = tokio::time::Duration::from_secs(config::STORE_RETRY_DELAY_SECS);

    for attempt in 1..=max_retries {
        match Graph::new(uri, user, password) {
            Ok(graph) => match graph.run(query("RETURN 1;")).await {
                Ok(_) => return Ok(graph),
                Err(e) if attempt < max_retries => {
                    info!(attempt, "Connection test failed, retrying: {e}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(e).context(format!(
                        "Cannot connect to Neo4j at {uri} after {max_retries} attempts"
                    ));
                }
            },
            Err(e) if attempt < max_retries => {
                info!(attempt, "Cannot connect to Neo4j at {uri}, retrying: {e}");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(e).context(format!(
                    "Cannot connect to Neo4j at {uri} after {max_retries} attempts"
                ));
            }
        }
    }

    bail!("Cannot connect to Neo4j at {uri} after {max_retries} attempts");
}

async fn run_cypher(graph: &Graph, q: Query) -> Result<()> {
    graph.run(q).await.context("Failed to execute Cypher query")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_templates_merge_on_id() {
        for cypher in [CYPHER_SAVE_AUTHOR, CYPHER_SAVE_BOOK, CYPHER_SAVE_BOOK_UNDATED] {
            assert!(cypher.starts_with("MERGE ("));
            assert!(cypher.contains("{id: $id}"));
        }
    }

    #[test]
    fn undated_template_clears_stale_date() {
        assert!(CYPHER_SAVE_BOOK_UNDATED.contains("REMOVE b.published_date"));
        assert!(!CYPHER_SAVE_BOOK_UNDATED.contains("$published_date"));
        assert!(CYPHER_SAVE_BOOK.contains("$published_date"));
    }

    #[test]
    fn find_templates_return_expected_columns() {
        assert!(CYPHER_FIND_AUTHOR.contains("AS name"));
        for column in [
            "AS name",
            "AS description",
            "AS published_date",
            "AS cover_ids",
            "AS author_ids",
            "AS author_names",
        ] {
            assert!(CYPHER_FIND_BOOK.contains(column), "missing {column}");
        }
    }

    #[test]
    fn schema_covers_both_labels() {
        assert!(SCHEMA.iter().any(|c| c.contains("(a:Author)")));
        assert!(SCHEMA.iter().any(|c| c.contains("(b:Book)")));
    }
}
