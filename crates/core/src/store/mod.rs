//! Persistence traits and their backends.
//!
//! The store is constructed once at start-up and handed to the workflows and
//! route handlers; nothing reaches for a global connection.
use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    BlogPost, ContactMessage, Meeting, NewBlogPost, NewContactMessage, NewMeeting, RecordId,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("stored {entity} is malformed: {detail}")]
    Corrupt { entity: &'static str, detail: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, new: &NewContactMessage) -> Result<ContactMessage, StoreError>;
}

#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the calendar event id is
    /// already recorded.
    async fn insert_meeting(&self, new: &NewMeeting) -> Result<Meeting, StoreError>;

    /// All meetings, earliest start first.
    async fn list_meetings(&self) -> Result<Vec<Meeting>, StoreError>;
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn insert_blog(&self, new: &NewBlogPost) -> Result<BlogPost, StoreError>;

    /// All posts, newest created first.
    async fn list_blogs(&self) -> Result<Vec<BlogPost>, StoreError>;

    async fn get_blog(&self, id: RecordId) -> Result<Option<BlogPost>, StoreError>;

    /// Replace the editable fields of `id` and refresh `updated_at`.
    /// Returns `None` when the post no longer exists.
    async fn update_blog(
        &self,
        id: RecordId,
        fields: &NewBlogPost,
    ) -> Result<Option<BlogPost>, StoreError>;

    /// Returns the removed post, or `None` when nothing matched.
    async fn delete_blog(&self, id: RecordId) -> Result<Option<BlogPost>, StoreError>;
}

/// A complete backend.
#[async_trait]
pub trait Store: ContactStore + MeetingStore + BlogStore {
    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}
