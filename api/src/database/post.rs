use chrono::NaiveDate;

/// A news post loaded from the posts directory. Posts only ever live on
/// the filesystem, there is no database table for them.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    /// Filename derived slug, with any leading `YYYY-MM-DD-` prefix
    /// stripped.
    pub slug: String,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    /// Markdown body.
    pub content: String,
}
