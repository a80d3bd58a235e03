use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::frontmatter;
use crate::database::Post;

/// A platform games can be filtered by on the games index.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Platform {
    pub slug: String,
    pub label: String,
    pub icon: Option<String>,
}

/// A genre games can be filtered by on the games index.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Genre {
    pub slug: String,
    pub label: String,
}

/// Site-wide default rules, applied when a game does not override them.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DefaultRules {
    pub general_rules: Option<String>,
}

/// One entry in a game's moderation changelog.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    /// ISO date string. Entries are sorted newest first by string
    /// comparison.
    pub date: String,
    pub action: String,
    pub target: Option<String>,
    pub note: Option<String>,
    /// Runner id of the moderator who made the change.
    pub by: Option<String>,
}

/// News posts and config files, loaded from the data directory once at
/// startup. This content always comes from the filesystem, regardless
/// of which backend serves games and runs.
///
/// Missing or malformed files degrade to empty defaults with a log
/// line, a broken config file must not keep the server from starting.
#[derive(Debug, Default)]
pub struct SiteContent {
    posts: Vec<Post>,
    platforms: Vec<Platform>,
    genres: Vec<Genre>,
    default_rules: DefaultRules,
    history: HashMap<String, Vec<HistoryEntry>>,
}

impl SiteContent {
    pub async fn load(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();

        let (posts, platforms, genres, default_rules, history) = tokio::join!(
            load_posts(&data_dir),
            load_yaml::<Vec<Platform>>(data_dir.join("config").join("platforms.yml")),
            load_yaml::<Vec<Genre>>(data_dir.join("config").join("genres.yml")),
            load_yaml::<DefaultRules>(data_dir.join("config").join("default-rules.yml")),
            load_history(&data_dir),
        );

        Self {
            posts,
            platforms,
            genres,
            default_rules,
            history,
        }
    }

    /// Posts, newest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn default_general_rules(&self) -> Option<&str> {
        self.default_rules.general_rules.as_deref()
    }

    /// Moderation changelog for one game, newest first. Games without a
    /// history file have an empty changelog.
    pub fn history_for(&self, game_id: &str) -> &[HistoryEntry] {
        self.history.get(game_id).map(Vec::as_slice).unwrap_or_default()
    }
}

async fn load_posts(data_dir: &Path) -> Vec<Post> {
    let dir = data_dir.join("posts");

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::error!(dir = %dir.display(), error = %err, "failed to read posts directory");
            return Vec::new();
        }
    };

    let mut posts = Vec::new();

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if !name.ends_with(".md") || name == "README.md" {
            continue;
        }

        let path = entry.path();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(file = %path.display(), error = %err, "failed to read post");
                continue;
            }
        };

        let mut post: Post = frontmatter::parse(&raw, &path).decode(&path);
        post.slug = slug_from_filename(name);
        posts.push(post);
    }

    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

async fn load_yaml<T: DeserializeOwned + Default>(path: PathBuf) -> T {
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(file = %path.display(), "config file missing, using defaults");
            return T::default();
        }
        Err(err) => {
            tracing::error!(file = %path.display(), error = %err, "failed to read config file");
            return T::default();
        }
    };

    match serde_yaml::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(file = %path.display(), error = %err, "failed to parse config file");
            T::default()
        }
    }
}

async fn load_history(data_dir: &Path) -> HashMap<String, Vec<HistoryEntry>> {
    let dir = data_dir.join("config").join("history");

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return HashMap::new(),
        Err(err) => {
            tracing::error!(dir = %dir.display(), error = %err, "failed to read history directory");
            return HashMap::new();
        }
    };

    let mut history = HashMap::new();

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        let Some(game_id) = name.strip_suffix(".yml") else {
            continue;
        };

        let mut log: Vec<HistoryEntry> = load_yaml(entry.path()).await;
        log.sort_by(|a, b| b.date.cmp(&a.date));
        history.insert(game_id.to_owned(), log);
    }

    history
}

/// Posts are named `YYYY-MM-DD-title.md`, the slug is the title part.
/// Undated filenames are used as is.
fn slug_from_filename(name: &str) -> String {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    let bytes = stem.as_bytes();

    let dated = stem.len() > 11
        && bytes[..11]
            .iter()
            .enumerate()
            .all(|(i, b)| if matches!(i, 4 | 7 | 10) { *b == b'-' } else { b.is_ascii_digit() });

    if dated {
        stem[11..].to_owned()
    } else {
        stem.to_owned()
    }
}
