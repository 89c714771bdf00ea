// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Jsonb, Text};
use diesel_async::RunQueryDsl;
use serde_json::Value;
use tracing::debug;

use super::{DocPath, Direction, Document, DocumentStore, Query};
use crate::db::{Database, DbConnection};
use crate::error::StoreError;
use crate::schema::documents;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct DocumentRow {
    id: String,
    data: Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
struct NewDocument<'a> {
    collection: &'a str,
    id: &'a str,
    data: &'a Value,
    updated_at: DateTime<Utc>,
}

/// Document store kept in the Postgres `documents` table, one JSONB body per row
pub struct PgDocumentStore {
    db: Arc<Database>,
}

impl PgDocumentStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn get_connection(&self) -> Result<DbConnection, StoreError> {
        self.db
            .get_connection()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to get database connection: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let mut conn = self.get_connection().await?;

        let row = documents::table
            .filter(documents::collection.eq(path.collection()))
            .filter(documents::id.eq(path.id()))
            .select(DocumentRow::as_select())
            .first::<DocumentRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(|r| Document {
            id: r.id,
            data: r.data,
        }))
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.get_connection().await?;

        let mut statement = documents::table
            .filter(documents::collection.eq(collection))
            .select(DocumentRow::as_select())
            .into_boxed();

        for (field, value) in &query.filters {
            statement = statement.filter(
                sql::<Bool>("data -> ")
                    .bind::<Text, _>(field.clone())
                    .sql(" = ")
                    .bind::<Jsonb, _>(value.clone()),
            );
        }

        // Ties keep insertion order, matching the stable sort in `Query::apply`
        statement = match &query.order_by {
            Some(order) => {
                let present = sql::<Bool>("COALESCE(jsonb_typeof(data -> ")
                    .bind::<Text, _>(order.field.clone())
                    .sql("), 'null') <> 'null'");
                let key = sql::<Jsonb>("data -> ").bind::<Text, _>(order.field.clone());
                let statement = statement.filter(present);
                match order.direction {
                    Direction::Ascending => statement.order(key.asc()),
                    Direction::Descending => statement.order(key.desc()),
                }
                .then_order_by(documents::seq.asc())
            }
            None => statement.order(documents::seq.asc()),
        };

        if let Some(limit) = query.limit {
            statement = statement.limit(limit as i64);
        }

        let rows = statement.load::<DocumentRow>(&mut conn).await?;

        debug!("Loaded {} documents from {}", rows.len(), collection);

        let docs = rows
            .into_iter()
            .map(|r| Document {
                id: r.id,
                data: r.data,
            })
            .collect();
        // jsonb ordering agrees with instant ordering for the UTC timestamps the platform writes;
        // re-applying the query settles mixed offsets within the bounded page
        Ok(query.apply(docs))
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let now = Utc::now();

        let new_document = NewDocument {
            collection: path.collection(),
            id: path.id(),
            data: &data,
            updated_at: now,
        };

        diesel::insert_into(documents::table)
            .values(&new_document)
            .on_conflict((documents::collection, documents::id))
            .do_update()
            .set((documents::data.eq(&data), documents::updated_at.eq(now)))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Value) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;

        let updated = diesel::sql_query(
            "UPDATE documents SET data = data || $3, updated_at = now() \
             WHERE collection = $1 AND id = $2",
        )
        .bind::<Text, _>(path.collection().to_string())
        .bind::<Text, _>(path.id().to_string())
        .bind::<Jsonb, _>(fields)
        .execute(&mut conn)
        .await?;

        if updated == 0 {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<bool, StoreError> {
        let mut conn = self.get_connection().await?;

        let removed = diesel::delete(
            documents::table
                .filter(documents::collection.eq(path.collection()))
                .filter(documents::id.eq(path.id())),
        )
        .execute(&mut conn)
        .await?;

        Ok(removed > 0)
    }

    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;

        // Single statement so concurrent moderators never overwrite each other's changes
        let updated = diesel::sql_query(
            "UPDATE documents \
             SET data = jsonb_set(data, ARRAY[$3]::text[], \
                 to_jsonb(COALESCE((data->>$3)::numeric, 0) + $4)), \
                 updated_at = now() \
             WHERE collection = $1 AND id = $2",
        )
        .bind::<Text, _>(path.collection().to_string())
        .bind::<Text, _>(path.id().to_string())
        .bind::<Text, _>(field.to_string())
        .bind::<BigInt, _>(delta)
        .execute(&mut conn)
        .await?;

        if updated == 0 {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::Database;
    use serde_json::json;

    async fn store() -> PgDocumentStore {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL is set");
        let db = Database::new(&DatabaseConfig {
            url,
            max_connections: 2,
        })
        .await
        .unwrap();
        PgDocumentStore::new(Arc::new(db))
    }

    #[tokio::test]
    #[ignore = "needs a Postgres database at TEST_DATABASE_URL"]
    async fn list_filters_orders_and_limits_in_the_database() {
        let store = store().await;
        let collection = format!("questions-{}", uuid::Uuid::new_v4());
        let rows = [
            ("q1", "pending", Some("2026-06-01T09:00:00Z")),
            ("q2", "answered", Some("2026-06-03T09:00:00Z")),
            ("q3", "pending", Some("2026-06-02T09:00:00Z")),
            ("q4", "pending", None),
            ("q5", "pending", Some("2026-06-02T09:00:00Z")),
        ];
        for (id, status, created_at) in rows {
            let mut data = json!({ "status": status });
            if let Some(ts) = created_at {
                data["createdAt"] = json!(ts);
            }
            store.set(&DocPath::new(&collection, id), data).await.unwrap();
        }

        let query = Query::new()
            .filter_eq("status", "pending")
            .order_by("createdAt", Direction::Descending)
            .limit(2);
        let ids: Vec<String> = store
            .list(&collection, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["q3".to_string(), "q5".to_string()]);

        assert!(store.delete(&DocPath::new(&collection, "q1")).await.unwrap());
        assert!(!store.delete(&DocPath::new(&collection, "q1")).await.unwrap());
    }
}
