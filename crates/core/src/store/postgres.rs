//! PostgreSQL backend. Schema lives in the workspace `migrations/` directory.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{BlogStore, ContactStore, MeetingStore, Store, StoreError};
use crate::model::{
    BlogPost, ContactMessage, Meeting, MeetingDuration, NewBlogPost, NewContactMessage,
    NewMeeting, RecordId,
};

/// Store backed by a shared connection pool. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<ContactRow> for ContactMessage {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MeetingRow {
    id: Uuid,
    date: DateTime<Utc>,
    time: String,
    duration: i32,
    topic: String,
    attendee_email: String,
    calendar_event_id: String,
    meeting_link: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = StoreError;

    fn try_from(row: MeetingRow) -> Result<Self, Self::Error> {
        let duration = u32::try_from(row.duration)
            .ok()
            .and_then(MeetingDuration::from_minutes)
            .ok_or_else(|| StoreError::Corrupt {
                entity: "meeting",
                detail: format!("duration {}", row.duration),
            })?;
        Ok(Self {
            id: row.id.into(),
            date: row.date,
            time: row.time,
            duration,
            topic: row.topic,
            attendee_email: row.attendee_email,
            calendar_event_id: row.calendar_event_id,
            meeting_link: row.meeting_link,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct BlogRow {
    id: Uuid,
    title: String,
    excerpt: String,
    category: String,
    image: String,
    date: DateTime<Utc>,
    read_time: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogRow> for BlogPost {
    type Error = StoreError;

    fn try_from(row: BlogRow) -> Result<Self, Self::Error> {
        let corrupt = |detail: String| StoreError::Corrupt {
            entity: "blog post",
            detail,
        };
        Ok(Self {
            id: row.id.into(),
            category: row
                .category
                .parse()
                .map_err(|_| corrupt(format!("category {}", row.category)))?,
            read_time: row
                .read_time
                .parse()
                .map_err(|_| corrupt(format!("read time {}", row.read_time)))?,
            title: row.title,
            excerpt: row.excerpt,
            image: row.image,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BLOG_COLUMNS: &str =
    "id, title, excerpt, category, image, date, read_time, created_at, updated_at";

const MEETING_COLUMNS: &str =
    "id, date, time, duration, topic, attendee_email, calendar_event_id, meeting_link, created_at";

#[async_trait]
impl ContactStore for PgStore {
    async fn insert_contact(&self, new: &NewContactMessage) -> Result<ContactMessage, StoreError> {
        let row: ContactRow = sqlx::query_as(
            "INSERT INTO contact_messages (id, name, email, message) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, message, created_at",
        )
        .bind(RecordId::generate().as_uuid())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

#[async_trait]
impl MeetingStore for PgStore {
    async fn insert_meeting(&self, new: &NewMeeting) -> Result<Meeting, StoreError> {
        let sql = format!(
            "INSERT INTO meetings \
             (id, date, time, duration, topic, attendee_email, calendar_event_id, meeting_link) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {MEETING_COLUMNS}"
        );
        let row: MeetingRow = sqlx::query_as(&sql)
            .bind(RecordId::generate().as_uuid())
            .bind(new.date)
            .bind(&new.time)
            .bind(new.duration.minutes() as i32)
            .bind(&new.topic)
            .bind(&new.attendee_email)
            .bind(&new.calendar_event_id)
            .bind(new.meeting_link.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::Duplicate {
                        entity: "meeting",
                        key: new.calendar_event_id.clone(),
                    }
                }
                other => StoreError::Database(other),
            })?;
        row.try_into()
    }

    async fn list_meetings(&self) -> Result<Vec<Meeting>, StoreError> {
        let sql = format!("SELECT {MEETING_COLUMNS} FROM meetings ORDER BY date ASC");
        let rows: Vec<MeetingRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Meeting::try_from).collect()
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn insert_blog(&self, new: &NewBlogPost) -> Result<BlogPost, StoreError> {
        let sql = format!(
            "INSERT INTO blog_posts (id, title, excerpt, category, image, read_time) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {BLOG_COLUMNS}"
        );
        let row: BlogRow = sqlx::query_as(&sql)
            .bind(RecordId::generate().as_uuid())
            .bind(&new.title)
            .bind(&new.excerpt)
            .bind(new.category.as_str())
            .bind(&new.image)
            .bind(new.read_time.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn list_blogs(&self) -> Result<Vec<BlogPost>, StoreError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog_posts ORDER BY created_at DESC, id DESC");
        let rows: Vec<BlogRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(BlogPost::try_from).collect()
    }

    async fn get_blog(&self, id: RecordId) -> Result<Option<BlogPost>, StoreError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog_posts WHERE id = $1");
        let row: Option<BlogRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(BlogPost::try_from).transpose()
    }

    async fn update_blog(
        &self,
        id: RecordId,
        fields: &NewBlogPost,
    ) -> Result<Option<BlogPost>, StoreError> {
        let sql = format!(
            "UPDATE blog_posts \
             SET title = $2, excerpt = $3, category = $4, image = $5, read_time = $6, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {BLOG_COLUMNS}"
        );
        let row: Option<BlogRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(&fields.title)
            .bind(&fields.excerpt)
            .bind(fields.category.as_str())
            .bind(&fields.image)
            .bind(fields.read_time.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(BlogPost::try_from).transpose()
    }

    async fn delete_blog(&self, id: RecordId) -> Result<Option<BlogPost>, StoreError> {
        let sql = format!("DELETE FROM blog_posts WHERE id = $1 RETURNING {BLOG_COLUMNS}");
        let row: Option<BlogRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(BlogPost::try_from).transpose()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
