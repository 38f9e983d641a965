use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Conversation
// =============================================================================

/// Speaker of a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Retrieval
// =============================================================================

/// A retrieved document fragment with its metadata.
///
/// `chunk` and `linked_url` are mandatory: an entry without a link cannot be
/// cited and makes the whole response unusable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk: String,
    #[serde(default)]
    pub relative_path: String,
    pub linked_url: String,
    #[serde(default)]
    pub category: String,
}

/// Sentinel label meaning "no category filter".
pub const ALL_CATEGORIES: &str = "ALL";

/// Category restriction applied to retrieval.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Build a filter from a user-facing label; `"ALL"` means unfiltered.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(label.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Category(c) => f.write_str(c),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CategoryFilter::from_label(s))
    }
}

/// Predicate sent with a search call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchFilter {
    /// `field == value`.
    Eq { field: String, value: String },
}

impl SearchFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        SearchFilter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wire form understood by the search service: `{"@eq": {field: value}}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SearchFilter::Eq { field, value } => {
                let mut inner = serde_json::Map::new();
                inner.insert(field.clone(), serde_json::Value::String(value.clone()));
                serde_json::json!({ "@eq": inner })
            }
        }
    }
}

impl Serialize for SearchFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Body of a search call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    pub limit: usize,
}
