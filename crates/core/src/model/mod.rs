//! Records held by the store and the request shapes that create them.

pub mod blog;
pub mod contact;
pub mod id;
pub mod meeting;

pub use blog::{BlogDraft, BlogPatch, BlogPost, Category, NewBlogPost, ReadTime};
pub use contact::{ContactMessage, ContactRequest, NewContactMessage};
pub use id::RecordId;
pub use meeting::{Meeting, MeetingDuration, MeetingRequest, NewMeeting, ScheduleMeetingRequest};
