//! Whole-collection fetches.

use crate::framework::{FrameworkError, StoreClient};
use crate::gateway::{Gateway, GatewayError};
use crate::model::Record;
use crate::store::{CollectionEvent, StoreSlot};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("fetch of {table} failed: {source}")]
    Remote {
        table: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("could not decode {table} rows: {message}")]
    Decode {
        table: &'static str,
        message: String,
    },

    #[error("store unavailable: {0}")]
    Store(#[from] FrameworkError),
}

impl FetchError {
    /// Message recorded on the failed collection.
    pub fn message(&self) -> String {
        match self {
            FetchError::Remote { source, .. } => source.message(),
            FetchError::Decode { message, .. } => message.clone(),
            FetchError::Store(error) => error.to_string(),
        }
    }
}

/// Decodes backend rows into entities. One bad row fails the batch.
pub fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    rows.into_iter().map(serde_json::from_value).collect()
}

/// Reads the whole collection of `T` with its listing query.
pub async fn load<T: Record>(gateway: &dyn Gateway) -> Result<Vec<T>, FetchError> {
    let rows = gateway
        .select(&T::listing())
        .await
        .map_err(|source| FetchError::Remote {
            table: T::TABLE,
            source,
        })?;
    decode_rows(rows).map_err(|e| FetchError::Decode {
        table: T::TABLE,
        message: e.to_string(),
    })
}

/// Refetches the collection of `T` into `store`: `Loading`, then `Replace` or `Failed`.
///
/// Returns the number of rows loaded. A remote or decode failure is recorded on the
/// collection before being returned.
pub async fn fetch_collection<T, S>(
    gateway: &dyn Gateway,
    store: &StoreClient<S>,
) -> Result<usize, FetchError>
where
    T: Record,
    S: StoreSlot<T>,
{
    store.dispatch(S::command(CollectionEvent::Loading)).await?;
    match load::<T>(gateway).await {
        Ok(items) => {
            let count = items.len();
            store
                .dispatch(S::command(CollectionEvent::Replace(items)))
                .await?;
            debug!(collection = T::TABLE, count, "Fetched");
            Ok(count)
        }
        Err(error) => {
            warn!(collection = T::TABLE, error = %error, "Fetch failed");
            store
                .dispatch(S::command(CollectionEvent::Failed(error.message())))
                .await?;
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{apply_next, create_mock_store};
    use crate::gateway::mock::MockGateway;
    use crate::model::Year;
    use crate::store::{CollectionStatus, ContentState};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetch_dispatches_loading_then_replace() {
        let gateway = MockGateway::new();
        gateway.expect_select("years").return_ok(vec![
            json!({"id": "y1", "year_number": 1, "name": "Year 1"}),
            json!({"id": "y2", "year_number": 2, "name": "Year 2"}),
        ]);
        let (client, mut receiver) = create_mock_store::<ContentState>(8);

        let store = tokio::spawn(async move {
            let mut state = Arc::new(ContentState::default());
            let first = apply_next(&mut receiver, &mut state).await;
            let loading = state.years.is_loading();
            let second = apply_next(&mut receiver, &mut state).await;
            (first, loading, second, state)
        });

        let count = fetch_collection::<Year, _>(&gateway, &client).await.unwrap();
        let (first, loading, second, state) = store.await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(first, Some("Years"));
        assert!(loading);
        assert_eq!(second, Some("Years"));
        assert_eq!(state.years.status(), &CollectionStatus::Ready);
        assert_eq!(state.years.len(), 2);
        gateway.verify();
    }

    #[tokio::test]
    async fn test_remote_failure_is_recorded_on_the_collection() {
        let gateway = MockGateway::new();
        gateway.expect_select("years").return_err(GatewayError::Status {
            status: 401,
            message: "JWT expired".into(),
        });
        let (client, mut receiver) = create_mock_store::<ContentState>(8);

        let store = tokio::spawn(async move {
            let mut state = Arc::new(ContentState::default());
            apply_next(&mut receiver, &mut state).await;
            apply_next(&mut receiver, &mut state).await;
            state
        });

        let result = fetch_collection::<Year, _>(&gateway, &client).await;
        let state = store.await.unwrap();

        assert!(matches!(result, Err(FetchError::Remote { table: "years", .. })));
        assert_eq!(state.years.error(), Some("JWT expired"));
        assert_eq!(state.error.as_deref(), Some("JWT expired"));
    }

    #[tokio::test]
    async fn test_undecodable_rows_fail_the_batch() {
        let gateway = MockGateway::new();
        gateway
            .expect_select("years")
            .return_ok(vec![json!({"id": "y1", "name": "Year 1"})]);

        let result = load::<Year>(&gateway).await;
        assert!(matches!(result, Err(FetchError::Decode { table: "years", .. })));
    }
}
