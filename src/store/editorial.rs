//! Editorial content state.

use crate::framework::StoreState;
use crate::model::{Category, CategoryId, Post};
use crate::store::{store_slots, track_failure, Collection, CollectionEvent};

#[derive(Debug, Clone, Default)]
pub struct EditorialState {
    /// Every post, drafts included, newest first.
    pub posts: Collection<Post>,
    pub categories: Collection<Category>,
    pub error: Option<String>,
    pub error_source: Option<&'static str>,
}

#[derive(Debug)]
pub enum EditorialCommand {
    Posts(CollectionEvent<Post>),
    Categories(CollectionEvent<Category>),
    ClearError,
}

store_slots!(EditorialState {
    Post => posts as EditorialCommand::Posts,
    Category => categories as EditorialCommand::Categories,
});

impl StoreState for EditorialState {
    type Command = EditorialCommand;

    fn reduce(&self, command: EditorialCommand) -> Self {
        let mut next = self.clone();
        match command {
            EditorialCommand::Posts(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.posts = self.posts.apply(event);
            }
            EditorialCommand::Categories(event) => {
                track_failure(&mut next.error, &mut next.error_source, &event);
                next.categories = self.categories.apply(event);
            }
            EditorialCommand::ClearError => {
                next.error = None;
                next.error_source = None;
            }
        }
        next
    }

    fn label(command: &EditorialCommand) -> &'static str {
        match command {
            EditorialCommand::Posts(_) => "Posts",
            EditorialCommand::Categories(_) => "Categories",
            EditorialCommand::ClearError => "ClearError",
        }
    }
}

impl EditorialState {
    pub fn loading(&self) -> bool {
        self.posts.is_loading() || self.categories.is_loading()
    }

    pub fn published_posts(&self) -> Vec<&Post> {
        self.posts.iter().filter(|post| post.published).collect()
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }
}
