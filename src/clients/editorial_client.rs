use crate::clients::{typed_commands, CommandClient, CommandError};
use crate::framework::StoreClient;
use crate::gateway::Gateway;
use crate::model::{Category, Post, PostId, PostPatch};
use crate::store::EditorialState;
use std::sync::Arc;

/// Writes for posts and categories.
#[derive(Clone)]
pub struct EditorialClient {
    gateway: Arc<dyn Gateway>,
    store: StoreClient<EditorialState>,
}

impl CommandClient<EditorialState> for EditorialClient {
    fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    fn store(&self) -> &StoreClient<EditorialState> {
        &self.store
    }
}

impl EditorialClient {
    pub fn new(gateway: Arc<dyn Gateway>, store: StoreClient<EditorialState>) -> Self {
        Self { gateway, store }
    }

    typed_commands!(post: Post, category: Category);

    pub async fn publish_post(&self, id: &PostId, published: bool) -> Result<Post, CommandError> {
        let patch = PostPatch {
            published: Some(published),
            ..Default::default()
        };
        self.update_post(id, patch).await
    }
}
