use serde::{Deserialize, Serialize};

use super::Post;

/// Criteria for selecting posts. Empty criteria match every post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring of the title or content.
    pub search: Option<String>,
    /// Author name, compared case-insensitively.
    pub author: Option<String>,
    /// Tag membership, compared case-insensitively.
    pub tag: Option<String>,
    pub published_only: bool,
}

impl PostFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self::default().with_search(Some(term.into()))
    }

    pub fn by_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Self::default()
        }
    }

    pub fn by_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Blank search terms are treated as no search at all.
    pub fn with_search(mut self, term: Option<String>) -> Self {
        self.search = term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.published_only && !post.published {
            return false;
        }
        if let Some(author) = &self.author {
            if post.author.to_lowercase() != author.to_lowercase() {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !post.has_tag(tag) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            return post.title.to_lowercase().contains(&term)
                || post.content.to_lowercase().contains(&term);
        }
        true
    }
}

/// One page of results plus the number of matches before pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostDraft, PostFields};

    fn post(title: &str, content: &str, author: &str, tags: &[&str], published: bool) -> Post {
        let fields: PostFields = PostDraft {
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            content: content.to_string(),
            excerpt: None,
            author: author.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published,
        }
        .into_fields(200)
        .unwrap();
        Post::new(1, fields)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let p = post("Anything", "at all", "X", &[], false);
        assert!(PostFilter::default().matches(&p));
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_content() {
        let in_title = post("Learning Python", "basics", "X", &[], true);
        let in_content = post("Scripting", "I like PYTHON a lot", "X", &[], true);
        let neither = post("Rust", "ownership", "X", &[], true);

        let filter = PostFilter::search("python");
        assert!(filter.matches(&in_title));
        assert!(filter.matches(&in_content));
        assert!(!filter.matches(&neither));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = PostFilter::default().with_search(Some("   ".to_string()));
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_author_tag_and_published_filters() {
        let p = post("Title", "body", "Alice", &["rust", "web"], false);

        assert!(PostFilter::by_author("Alice").matches(&p));
        assert!(PostFilter::by_author("alice").matches(&p));
        assert!(!PostFilter::by_author("Bob").matches(&p));
        assert!(PostFilter::by_tag("web").matches(&p));
        assert!(PostFilter::by_tag("WEB").matches(&p));
        assert!(!PostFilter::by_tag("go").matches(&p));

        let published_only = PostFilter {
            published_only: true,
            ..PostFilter::default()
        };
        assert!(!published_only.matches(&p));
    }
}
