use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BlogStore, ContactStore, MeetingStore, Store, StoreError};
use crate::model::{
    BlogPost, ContactMessage, Meeting, NewBlogPost, NewContactMessage, NewMeeting, RecordId,
};

/// In-process store with the same constraints as the PostgreSQL schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    contacts: Vec<ContactMessage>,
    meetings: Vec<Meeting>,
    blogs: Vec<BlogPost>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contacts(&self) -> Vec<ContactMessage> {
        self.inner.read().await.contacts.clone()
    }

    pub async fn meetings(&self) -> Vec<Meeting> {
        self.inner.read().await.meetings.clone()
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact(&self, new: &NewContactMessage) -> Result<ContactMessage, StoreError> {
        let contact = ContactMessage {
            id: RecordId::generate(),
            name: new.name.clone(),
            email: new.email.clone(),
            message: new.message.clone(),
            created_at: Utc::now(),
        };
        self.inner.write().await.contacts.push(contact.clone());
        Ok(contact)
    }
}

#[async_trait]
impl MeetingStore for MemoryStore {
    async fn insert_meeting(&self, new: &NewMeeting) -> Result<Meeting, StoreError> {
        let mut tables = self.inner.write().await;
        if tables
            .meetings
            .iter()
            .any(|m| m.calendar_event_id == new.calendar_event_id)
        {
            return Err(StoreError::Duplicate {
                entity: "meeting",
                key: new.calendar_event_id.clone(),
            });
        }

        let meeting = Meeting {
            id: RecordId::generate(),
            date: new.date,
            time: new.time.clone(),
            duration: new.duration,
            topic: new.topic.clone(),
            attendee_email: new.attendee_email.clone(),
            calendar_event_id: new.calendar_event_id.clone(),
            meeting_link: new.meeting_link.clone(),
            created_at: Utc::now(),
        };
        tables.meetings.push(meeting.clone());
        Ok(meeting)
    }

    async fn list_meetings(&self) -> Result<Vec<Meeting>, StoreError> {
        let mut meetings = self.inner.read().await.meetings.clone();
        meetings.sort_by_key(|m| m.date);
        Ok(meetings)
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn insert_blog(&self, new: &NewBlogPost) -> Result<BlogPost, StoreError> {
        let now = Utc::now();
        let post = BlogPost {
            id: RecordId::generate(),
            title: new.title.clone(),
            excerpt: new.excerpt.clone(),
            category: new.category,
            image: new.image.clone(),
            date: now,
            read_time: new.read_time,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.blogs.push(post.clone());
        Ok(post)
    }

    async fn list_blogs(&self) -> Result<Vec<BlogPost>, StoreError> {
        let mut posts = self.inner.read().await.blogs.clone();
        // Insertion order breaks ties between posts created in the same instant.
        posts.reverse();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get_blog(&self, id: RecordId) -> Result<Option<BlogPost>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .blogs
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_blog(
        &self,
        id: RecordId,
        fields: &NewBlogPost,
    ) -> Result<Option<BlogPost>, StoreError> {
        let mut tables = self.inner.write().await;
        let Some(post) = tables.blogs.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.title = fields.title.clone();
        post.excerpt = fields.excerpt.clone();
        post.category = fields.category;
        post.read_time = fields.read_time;
        post.image = fields.image.clone();
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_blog(&self, id: RecordId) -> Result<Option<BlogPost>, StoreError> {
        let mut tables = self.inner.write().await;
        let position = tables.blogs.iter().position(|p| p.id == id);
        Ok(position.map(|i| tables.blogs.remove(i)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
