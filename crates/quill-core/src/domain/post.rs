use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_SLUG_LEN: usize = 255;
pub const MAX_AUTHOR_LEN: usize = 100;
pub const MAX_EXCERPT_LEN: usize = 500;

/// Post entity - a blog entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub tags: BTreeSet<String>,
    pub published: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a freshly inserted post. The store supplies the id.
    pub fn new(id: i64, fields: PostFields) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: fields.title,
            slug: fields.slug,
            content: fields.content,
            excerpt: fields.excerpt,
            author: fields.author,
            tags: fields.tags,
            published: fields.published,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field and bump `updated_at`.
    pub fn apply(&mut self, fields: PostFields) {
        self.title = fields.title;
        self.slug = fields.slug;
        self.content = fields.content;
        self.excerpt = fields.excerpt;
        self.author = fields.author;
        self.tags = fields.tags;
        self.published = fields.published;
        self.updated_at = Utc::now();
    }

    /// Tag membership, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }

    /// Turn the stored post back into a draft, keeping the current excerpt.
    pub fn to_draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            content: self.content.clone(),
            excerpt: Some(self.excerpt.clone()),
            author: self.author.clone(),
            tags: self.tags.iter().cloned().collect(),
            published: self.published,
        }
    }
}

/// Caller-supplied post contents, not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// Validated, normalized fields handed to the store on insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub tags: BTreeSet<String>,
    pub published: bool,
}

impl PostDraft {
    /// Validate the draft and normalize it into storable fields.
    ///
    /// All violations are reported together. When no excerpt is supplied one
    /// is derived from the first `excerpt_len` characters of the content.
    pub fn into_fields(self, excerpt_len: usize) -> Result<PostFields, DomainError> {
        let mut problems = Vec::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            problems.push("title is required".to_string());
        } else if title.chars().count() > MAX_TITLE_LEN {
            problems.push(format!("title must be at most {MAX_TITLE_LEN} characters"));
        }

        let slug = self.slug.trim().to_string();
        if let Err(reason) = check_slug(&slug) {
            problems.push(reason);
        }

        if self.content.trim().is_empty() {
            problems.push("content is required".to_string());
        }

        let author = self.author.trim().to_string();
        if author.is_empty() {
            problems.push("author is required".to_string());
        } else if author.chars().count() > MAX_AUTHOR_LEN {
            problems.push(format!("author must be at most {MAX_AUTHOR_LEN} characters"));
        }

        let excerpt = self
            .excerpt
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if let Some(excerpt) = &excerpt {
            if excerpt.chars().count() > MAX_EXCERPT_LEN {
                problems.push(format!(
                    "excerpt must be at most {MAX_EXCERPT_LEN} characters"
                ));
            }
        }

        if !problems.is_empty() {
            return Err(DomainError::Validation(problems.join("; ")));
        }

        let excerpt = excerpt.unwrap_or_else(|| derive_excerpt(&self.content, excerpt_len));
        let tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(PostFields {
            title,
            slug,
            content: self.content,
            excerpt,
            author,
            tags,
            published: self.published,
        })
    }
}

/// Partial update - only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl PostPatch {
    pub fn published(published: bool) -> Self {
        Self {
            published: Some(published),
            ..Self::default()
        }
    }

    /// Merge the patch onto an existing post.
    ///
    /// A new content without a new excerpt drops the old excerpt so that it
    /// gets derived again.
    pub fn merge_into(self, post: &Post) -> PostDraft {
        let mut draft = post.to_draft();
        if let Some(content) = self.content {
            draft.content = content;
            draft.excerpt = None;
        }
        if let Some(excerpt) = self.excerpt {
            draft.excerpt = Some(excerpt);
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(slug) = self.slug {
            draft.slug = slug;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(published) = self.published {
            draft.published = published;
        }
        draft
    }
}

/// Slugs are lowercase ASCII letters, digits, `-` and `_`, with no leading
/// or trailing hyphen.
fn check_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("slug is required".to_string());
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(format!("slug must be at most {MAX_SLUG_LEN} characters"));
    }
    let url_safe = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !url_safe || slug.starts_with('-') || slug.ends_with('-') {
        return Err(format!(
            "slug '{slug}' must contain only lowercase letters, digits, '-' and '_'"
        ));
    }
    Ok(())
}

fn derive_excerpt(content: &str, max_chars: usize) -> String {
    let content = content.trim();
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((cut, _)) => format!("{}...", content[..cut].trim_end()),
    }
}
