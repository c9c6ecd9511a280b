use thiserror::Error;

use super::non_blank;
use crate::model::blog::EXCERPT_MAX_CHARS;
use crate::model::{BlogDraft, Category, NewBlogPost, ReadTime};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlogValidationError {
    #[error("Blog title is required")]
    MissingTitle,
    #[error("Excerpt is required")]
    MissingExcerpt,
    #[error("Excerpt cannot be more than 200 characters")]
    ExcerptTooLong,
    #[error("Category is required")]
    MissingCategory,
    #[error("`{0}` is not a valid category")]
    UnknownCategory(String),
    #[error("`{0}` is not a valid read time")]
    UnknownReadTime(String),
    #[error("Featured image URL is required")]
    MissingImage,
}

/// Validate a draft into an insertable post. Runs on create and, against the
/// merged post, on every update.
pub fn validate_blog(draft: BlogDraft) -> Result<NewBlogPost, BlogValidationError> {
    let title = non_blank(draft.title.as_deref()).ok_or(BlogValidationError::MissingTitle)?;

    let excerpt =
        non_blank(draft.excerpt.as_deref()).ok_or(BlogValidationError::MissingExcerpt)?;
    if excerpt.chars().count() > EXCERPT_MAX_CHARS {
        return Err(BlogValidationError::ExcerptTooLong);
    }

    let category = match non_blank(draft.category.as_deref()) {
        None => return Err(BlogValidationError::MissingCategory),
        Some(raw) => raw
            .parse::<Category>()
            .map_err(|e| BlogValidationError::UnknownCategory(e.0))?,
    };

    let read_time = match non_blank(draft.read_time.as_deref()) {
        None => ReadTime::default(),
        Some(raw) => raw
            .parse::<ReadTime>()
            .map_err(|e| BlogValidationError::UnknownReadTime(e.0))?,
    };

    let image = non_blank(draft.image.as_deref()).ok_or(BlogValidationError::MissingImage)?;

    Ok(NewBlogPost {
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        category,
        read_time,
        image: image.to_string(),
    })
}
