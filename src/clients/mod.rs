//! Command Layer: typed create/update/delete per entity, reconciled with the server's answer.

pub mod command_client;
pub mod content_client;
pub mod editorial_client;
pub mod error;

pub use command_client::CommandClient;
pub use content_client::ContentClient;
pub use editorial_client::EditorialClient;
pub use error::CommandError;

/// Generates `create_*`, `update_*` and `delete_*` methods delegating to [`CommandClient`].
macro_rules! typed_commands {
    ($($name:ident: $entity:ty),* $(,)?) => { paste::paste! {$(
        #[doc = concat!("Creates a `", stringify!($entity), "` and folds the stored row.")]
        pub async fn [<create_ $name>](
            &self,
            draft: <$entity as $crate::model::Record>::Draft,
        ) -> Result<$entity, $crate::clients::CommandError> {
            self.create::<$entity>(draft).await
        }

        #[doc = concat!("Updates a `", stringify!($entity), "` and folds the returned row.")]
        pub async fn [<update_ $name>](
            &self,
            id: &<$entity as $crate::model::Record>::Id,
            patch: <$entity as $crate::model::Record>::Patch,
        ) -> Result<$entity, $crate::clients::CommandError> {
            self.update::<$entity>(id, patch).await
        }

        #[doc = concat!("Deletes a `", stringify!($entity), "` and removes it from the store.")]
        pub async fn [<delete_ $name>](
            &self,
            id: &<$entity as $crate::model::Record>::Id,
        ) -> Result<(), $crate::clients::CommandError> {
            self.delete::<$entity>(id).await
        }
    )*}};
}

pub(crate) use typed_commands;
