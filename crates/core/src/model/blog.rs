use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::id::RecordId;

/// Maximum excerpt length, in characters.
pub const EXCERPT_MAX_CHARS: usize = 200;

/// Blog categories shown on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "SEO")]
    Seo,
    Trends,
    Content,
    Email,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "PPC")]
    Ppc,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Seo,
        Category::Trends,
        Category::Content,
        Category::Email,
        Category::SocialMedia,
        Category::Ppc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Seo => "SEO",
            Category::Trends => "Trends",
            Category::Content => "Content",
            Category::Email => "Email",
            Category::SocialMedia => "Social Media",
            Category::Ppc => "PPC",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reading-time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ReadTime {
    #[serde(rename = "3 min")]
    Three,
    #[default]
    #[serde(rename = "5 min")]
    Five,
    #[serde(rename = "7 min")]
    Seven,
    #[serde(rename = "10 min")]
    Ten,
    #[serde(rename = "15 min")]
    Fifteen,
}

impl ReadTime {
    pub const ALL: [ReadTime; 5] = [
        ReadTime::Three,
        ReadTime::Five,
        ReadTime::Seven,
        ReadTime::Ten,
        ReadTime::Fifteen,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadTime::Three => "3 min",
            ReadTime::Five => "5 min",
            ReadTime::Seven => "7 min",
            ReadTime::Ten => "10 min",
            ReadTime::Fifteen => "15 min",
        }
    }
}

impl FromStr for ReadTime {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for ReadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label that is not part of an enumerated set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a recognised value")]
pub struct UnknownLabel(pub String);

/// Blog post as stored and as returned by the admin API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub title: String,
    pub excerpt: String,
    pub category: Category,
    /// Stored upload filename, or an absolute URL.
    pub image: String,
    /// Publication date, rendered as e.g. `October 19, 2026`.
    #[serde(serialize_with = "long_date")]
    pub date: DateTime<Utc>,
    pub read_time: ReadTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated post ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: String,
    pub category: Category,
    pub read_time: ReadTime,
    pub image: String,
}

/// Unvalidated create input, as read from the admin form.
#[derive(Debug, Clone, Default)]
pub struct BlogDraft {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub image: Option<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub image: Option<String>,
}

impl BlogPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.category.is_none()
            && self.read_time.is_none()
            && self.image.is_none()
    }

    /// Overlay this patch onto a stored post, producing a draft that still
    /// has to pass validation.
    pub fn overlay(self, post: &BlogPost) -> BlogDraft {
        BlogDraft {
            title: Some(self.title.unwrap_or_else(|| post.title.clone())),
            excerpt: Some(self.excerpt.unwrap_or_else(|| post.excerpt.clone())),
            category: Some(
                self.category
                    .unwrap_or_else(|| post.category.as_str().to_string()),
            ),
            // A blank read time means "unchanged"; the default applies on create only.
            read_time: Some(
                self.read_time
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| post.read_time.as_str().to_string()),
            ),
            image: Some(self.image.unwrap_or_else(|| post.image.clone())),
        }
    }
}

fn long_date<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%B %-d, %Y"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn post() -> BlogPost {
        let at = Utc.with_ymd_and_hms(2026, 10, 9, 8, 0, 0).unwrap();
        BlogPost {
            id: RecordId::generate(),
            title: "Title".into(),
            excerpt: "Excerpt".into(),
            category: Category::SocialMedia,
            image: "1-2.png".into(),
            date: at,
            read_time: ReadTime::Ten,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn labels_parse_from_their_display_form() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        for read_time in ReadTime::ALL {
            assert_eq!(read_time.as_str().parse::<ReadTime>(), Ok(read_time));
        }
        assert!("seo".parse::<Category>().is_err());
        assert!("4 min".parse::<ReadTime>().is_err());
    }

    #[test]
    fn serializes_with_public_field_names() {
        let json = serde_json::to_value(post()).unwrap();
        assert_eq!(json["category"], "Social Media");
        assert_eq!(json["readTime"], "10 min");
        assert_eq!(json["date"], "October 9, 2026");
        assert!(json["_id"].is_string());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn overlay_keeps_untouched_fields() {
        let stored = post();
        let draft = BlogPatch {
            title: Some("New".into()),
            ..BlogPatch::default()
        }
        .overlay(&stored);

        assert_eq!(draft.title.as_deref(), Some("New"));
        assert_eq!(draft.excerpt.as_deref(), Some("Excerpt"));
        assert_eq!(draft.category.as_deref(), Some("Social Media"));
        assert_eq!(draft.read_time.as_deref(), Some("10 min"));
        assert_eq!(draft.image.as_deref(), Some("1-2.png"));
    }

    #[test]
    fn overlay_ignores_blank_read_time() {
        let draft = BlogPatch {
            read_time: Some("  ".into()),
            ..BlogPatch::default()
        }
        .overlay(&post());

        assert_eq!(draft.read_time.as_deref(), Some("10 min"));
    }
}
