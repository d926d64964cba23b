//! [`DataProvider`] on top of the statement builder

use super::core::GenericStore;
use crate::errors::StoreError;
use crate::id_type::HasUniversalId;
use crate::query_builder::{FilterGroup, SqlStatement};
use crate::traits::{ConnectionFactory, DataProvider, Projection, QueryAdapter, TableMetadata};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

impl<T, F, A> GenericStore<T, F, A>
where
    T: TableMetadata,
    F: ConnectionFactory,
    A: QueryAdapter<Connection = F::Connection>,
{
    async fn query_rows<R>(&self, operation: &str, statement: SqlStatement) -> Result<Vec<R>, StoreError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        tracing::debug!("[{}] Table: {}", operation, T::table_name());
        tracing::debug!("[{}] SQL: {}", operation, statement.sql);
        tracing::debug!("[{}] params count: {}", operation, statement.parameters.len());

        let mut connection = self.factory.connection().await?;
        self.adapter
            .query(&mut connection, &statement.sql, &statement.parameters)
            .await
    }

    async fn execute_statement(&self, operation: &str, statement: SqlStatement) -> Result<u64, StoreError> {
        tracing::debug!("[{}] Table: {}", operation, T::table_name());
        tracing::debug!("[{}] SQL: {}", operation, statement.sql);
        tracing::debug!("[{}] params count: {}", operation, statement.parameters.len());

        let mut connection = self.factory.connection().await?;
        self.adapter
            .execute(&mut connection, &statement.sql, &statement.parameters)
            .await
    }
}

#[async_trait]
impl<T, F, A> DataProvider for GenericStore<T, F, A>
where
    T: TableMetadata,
    F: ConnectionFactory + 'static,
    A: QueryAdapter<Connection = F::Connection> + 'static,
{
    type Model = T;

    async fn add(&self, model: T) -> Result<T, StoreError> {
        let statement = self.statements().insert(&model)?;
        self.query_rows::<T>("ADD", statement)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::no_rows_returned(T::entity_name(), "add"))
    }

    async fn get(&self) -> Result<Vec<T>, StoreError> {
        let statement = self.statements().select_all::<T>()?;
        self.query_rows("GET", statement).await
    }

    async fn get_by_id(&self, id: &T::Id) -> Result<T, StoreError> {
        let statement = self.statements().select_by_id::<T>(id)?;
        self.query_rows::<T>("GET_BY_ID", statement)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(T::entity_name(), id.universal_id()))
    }

    async fn update(&self, model: T) -> Result<T, StoreError> {
        let statement = self.statements().update(&model)?;
        self.query_rows::<T>("UPDATE", statement)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(T::entity_name(), model.extract_id().universal_id()))
    }

    async fn delete(&self, ids: &[T::Id]) -> Result<u64, StoreError> {
        match self.statements().delete::<T>(ids)? {
            Some(statement) => self.execute_statement("DELETE", statement).await,
            None => {
                tracing::trace!(
                    "[DELETE] Table: {} no non-default ids among {}, skipping",
                    T::table_name(),
                    ids.len()
                );
                Ok(0)
            }
        }
    }

    async fn find(&self, filter: &FilterGroup) -> Result<Vec<T>, StoreError> {
        let statement = self.statements().select_where::<T>(filter)?;
        self.query_rows("FIND", statement).await
    }

    async fn select<P: Projection>(&self, filter: &FilterGroup) -> Result<Vec<P>, StoreError> {
        let statement = self.statements().select_projection::<T, P>(filter)?;
        self.query_rows("SELECT", statement).await
    }

    fn max_row_count(&self) -> u32 {
        self.factory.max_row_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::{Dialect, FilterItem, JoinPathField, QueryParameters};
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Comment {
        id: i64,
        message: String,
    }

    impl TableMetadata for Comment {
        type Id = i64;

        fn table_name() -> &'static str {
            "comments"
        }
        fn entity_name() -> &'static str {
            "Comment"
        }
        fn primary_key_field() -> &'static str {
            "id"
        }
        fn fields() -> &'static [&'static str] {
            &["id", "message"]
        }
        fn identity_generated() -> bool {
            true
        }
        fn extract_id(&self) -> i64 {
            self.id
        }
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct CommentSummary {
        id: i64,
        author: String,
    }

    impl Projection for CommentSummary {
        fn join_path_fields() -> &'static [JoinPathField] {
            const FIELDS: &[JoinPathField] =
                &[JoinPathField::new("author", "[users:id:author_id].name")];
            FIELDS
        }
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct BareComment {
        id: i64,
    }

    impl Projection for BareComment {
        fn join_path_fields() -> &'static [JoinPathField] {
            &[]
        }
    }

    struct Factory {
        dialect: Dialect,
    }

    #[async_trait]
    impl ConnectionFactory for Factory {
        type Connection = ();

        async fn connection(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn dialect(&self) -> Dialect {
            self.dialect
        }

        fn max_row_count(&self) -> u32 {
            500
        }
    }

    /// Records every statement and answers queries from a queue of JSON rows
    #[derive(Default)]
    struct RecordingAdapter {
        calls: Mutex<Vec<(String, QueryParameters)>>,
        rows: Mutex<VecDeque<Vec<Value>>>,
        affected: u64,
    }

    impl RecordingAdapter {
        fn with_rows(rows: Vec<Value>) -> Self {
            let adapter = Self::default();
            adapter.rows.lock().unwrap().push_back(rows);
            adapter
        }

        fn calls(&self) -> Vec<(String, QueryParameters)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryAdapter for RecordingAdapter {
        type Connection = ();

        async fn query<R>(
            &self,
            _connection: &mut (),
            sql: &str,
            parameters: &QueryParameters,
        ) -> Result<Vec<R>, StoreError>
        where
            R: DeserializeOwned + Send + 'static,
        {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), parameters.clone()));
            let rows = self.rows.lock().unwrap().pop_front().unwrap_or_default();
            rows.into_iter()
                .map(|row| serde_json::from_value(row).map_err(StoreError::from))
                .collect()
        }

        async fn execute(
            &self,
            _connection: &mut (),
            sql: &str,
            parameters: &QueryParameters,
        ) -> Result<u64, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), parameters.clone()));
            Ok(self.affected)
        }
    }

    fn store(
        dialect: Dialect,
        adapter: RecordingAdapter,
    ) -> (GenericStore<Comment, Factory, RecordingAdapter>, Arc<RecordingAdapter>) {
        let adapter = Arc::new(adapter);
        let store = GenericStore::new(Arc::new(Factory { dialect }), Arc::clone(&adapter));
        (store, adapter)
    }

    #[tokio::test]
    async fn test_add_returns_stored_row() {
        let (store, adapter) = store(
            Dialect::PostgreSql,
            RecordingAdapter::with_rows(vec![json!({ "id": 17, "message": "nit" })]),
        );

        let created = store
            .add(Comment {
                id: 0,
                message: "nit".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, 17);
        let calls = adapter.calls();
        assert_eq!(
            calls[0].0,
            "INSERT INTO \"comments\" (\"message\") VALUES (@P1) RETURNING *"
        );
    }

    #[tokio::test]
    async fn test_add_without_returned_row_fails() {
        let (store, _) = store(Dialect::PostgreSql, RecordingAdapter::default());
        let err = store
            .add(Comment {
                id: 0,
                message: "lost".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoRowsReturned { .. }));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (store, adapter) = store(Dialect::SqlServer, RecordingAdapter::default());

        let err = store.get_by_id(&99).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(
            err,
            StoreError::EntityNotFound { ref entity, ref id } if entity == "Comment" && id == "99"
        ));
        assert_eq!(
            adapter.calls()[0].0,
            "SELECT * FROM [comments] WHERE [id] = @P1"
        );
    }

    #[tokio::test]
    async fn test_update_with_default_identity_runs_nothing() {
        let (store, adapter) = store(Dialect::PostgreSql, RecordingAdapter::default());

        let err = store
            .update(Comment {
                id: 0,
                message: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MissingIdentity { .. }));
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let (store, _) = store(Dialect::PostgreSql, RecordingAdapter::default());
        let err = store
            .update(Comment {
                id: 4,
                message: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_binds_only_real_ids() {
        let adapter = RecordingAdapter {
            affected: 1,
            ..RecordingAdapter::default()
        };
        let (store, adapter) = store(Dialect::PostgreSql, adapter);

        let affected = store.delete(&[0, 31, 0]).await.unwrap();

        assert_eq!(affected, 1);
        let calls = adapter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[0].1.get("id").unwrap().value, json!([31]));
    }

    #[tokio::test]
    async fn test_delete_all_default_ids_executes_nothing() {
        let (store, adapter) = store(Dialect::SqlServer, RecordingAdapter::default());

        assert_eq!(store.delete(&[0, 0, 0]).await.unwrap(), 0);
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_with_empty_filter_selects_everything() {
        let (store, adapter) = store(
            Dialect::PostgreSql,
            RecordingAdapter::with_rows(vec![
                json!({ "id": 1, "message": "a" }),
                json!({ "id": 2, "message": "b" }),
            ]),
        );

        let rows = store.find(&FilterGroup::default()).await.unwrap();

        assert_eq!(rows.len(), 2);
        let calls = adapter.calls();
        assert_eq!(calls[0].0, "SELECT * FROM \"comments\"");
        assert!(calls[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_select_projection_joins_related_table() {
        let (store, adapter) = store(
            Dialect::SqlServer,
            RecordingAdapter::with_rows(vec![json!({ "id": 1, "message": "a", "author": "kim" })]),
        );
        let filter = FilterGroup::and().item(FilterItem::equal("Id", "id", 1));

        let rows: Vec<CommentSummary> = store.select(&filter).await.unwrap();

        assert_eq!(
            rows,
            vec![CommentSummary {
                id: 1,
                author: "kim".to_string()
            }]
        );
        assert_eq!(
            adapter.calls()[0].0,
            "SELECT [comments].*, [users_author_id].[name] AS [author] FROM [comments] \
             LEFT OUTER JOIN [users] AS [users_author_id] WITH (NOLOCK) \
             ON [users_author_id].[id] = [comments].[author_id] \
             WHERE [comments].[id] = @P1"
        );
    }

    #[tokio::test]
    async fn test_select_projection_without_join_paths_falls_back() {
        let (store, adapter) = store(
            Dialect::PostgreSql,
            RecordingAdapter::with_rows(vec![json!({ "id": 5, "message": "m" })]),
        );

        let rows: Vec<BareComment> = store.select(&FilterGroup::default()).await.unwrap();

        assert_eq!(rows, vec![BareComment { id: 5 }]);
        assert_eq!(adapter.calls()[0].0, "SELECT * FROM \"comments\"");
    }

    #[test]
    fn test_max_row_count_comes_from_factory() {
        let (store, _) = store(Dialect::PostgreSql, RecordingAdapter::default());
        assert_eq!(DataProvider::max_row_count(&store), 500);
    }
}
