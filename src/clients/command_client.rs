use crate::clients::error::{decode_row, encode, remote, CommandError};
use crate::framework::{StoreClient, StoreState};
use crate::gateway::Gateway;
use crate::model::{Draft, Record};
use crate::store::{CollectionEvent, StoreSlot};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Trait for store-specific clients to inherit the standard write operations.
///
/// Every operation performs exactly one remote write and then folds the server's answer into
/// the store: the returned row on create and update, the id on delete. Nothing is folded when
/// the write fails.
#[async_trait]
pub trait CommandClient<S: StoreState>: Send + Sync {
    fn gateway(&self) -> &dyn Gateway;

    fn store(&self) -> &StoreClient<S>;

    /// Validate `draft`, insert it, fold the stored row.
    #[instrument(skip(self, draft))]
    async fn create<T>(&self, mut draft: T::Draft) -> Result<T, CommandError>
    where
        T: Record,
        S: StoreSlot<T>,
    {
        draft
            .prepare()
            .map_err(|source| CommandError::Validation {
                table: T::TABLE,
                source,
            })?;
        let row = encode(T::TABLE, &draft)?;
        debug!(table = T::TABLE, "Sending insert");
        let stored = self
            .gateway()
            .insert(T::TABLE, row, &T::embeds())
            .await
            .map_err(remote(T::TABLE))?;
        let entity: T = decode_row(T::TABLE, stored)?;
        self.store()
            .dispatch(S::command(CollectionEvent::Upsert(entity.clone())))
            .await?;
        info!(table = T::TABLE, id = %entity.id(), "Created");
        Ok(entity)
    }

    /// Apply `patch` remotely and fold the row the backend returns.
    #[instrument(skip(self, patch))]
    async fn update<T>(&self, id: &T::Id, patch: T::Patch) -> Result<T, CommandError>
    where
        T: Record,
        S: StoreSlot<T>,
    {
        let patch = encode(T::TABLE, &patch)?;
        debug!(table = T::TABLE, "Sending update");
        let stored = self
            .gateway()
            .update(T::TABLE, id.as_ref(), patch, &T::embeds())
            .await
            .map_err(remote(T::TABLE))?;
        let entity: T = decode_row(T::TABLE, stored)?;
        self.store()
            .dispatch(S::command(CollectionEvent::Upsert(entity.clone())))
            .await?;
        info!(table = T::TABLE, "Updated");
        Ok(entity)
    }

    /// Delete remotely, then drop the id from the store.
    #[instrument(skip(self))]
    async fn delete<T>(&self, id: &T::Id) -> Result<(), CommandError>
    where
        T: Record,
        S: StoreSlot<T>,
    {
        debug!(table = T::TABLE, "Sending delete");
        self.gateway()
            .delete(T::TABLE, id.as_ref())
            .await
            .map_err(remote(T::TABLE))?;
        self.store()
            .dispatch(S::command(CollectionEvent::Remove(id.clone())))
            .await?;
        info!(table = T::TABLE, "Deleted");
        Ok(())
    }
}
