use async_trait::async_trait;
use uuid::Uuid;

use crate::database::{Achievement, Game, NewAchievement, NewRun, Run, Runner, Team};

pub(crate) mod frontmatter;
mod fs;
mod pg;
mod site;

pub use fs::FsSource;
pub use pg::PgSource;
pub use site::{Genre, HistoryEntry, Platform, SiteContent};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to access content file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode front matter: {0}")]
    Encode(#[from] serde_yaml::Error),
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

/// Site-wide totals shown on the home page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SiteCounts {
    pub game_count: i64,
    pub runner_count: i64,
    pub run_count: i64,
    pub achievement_count: i64,
    pub team_count: i64,
}

/// Read and submit access to the site's content, backed by either the
/// markdown tree or Postgres. Exactly one implementation is constructed
/// at startup.
///
/// Listing methods degrade on upstream failure: they log and return an
/// empty list so one bad backend call cannot take a page down. Point
/// lookups distinguish "not found" (`Ok(None)`) from upstream failure
/// (`Err`). Listings never include pending or rejected entries, those
/// are only reachable through the `pending_*` methods.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Publicly listed games, ordered by name.
    async fn games(&self) -> Vec<Game>;
    /// Every game including hidden fixtures, ordered by name.
    async fn all_games(&self) -> Vec<Game>;
    /// Publicly listed games with `Active` status, ordered by name.
    async fn active_games(&self) -> Vec<Game>;
    async fn game(&self, game_id: &str) -> Result<Option<Game>, ContentError>;

    /// Publicly listed runners, ordered by name.
    async fn runners(&self) -> Vec<Runner>;
    async fn runner(&self, runner_id: &str) -> Result<Option<Runner>, ContentError>;
    /// Looks a runner up by the auth provider user id linked to the
    /// profile.
    async fn runner_by_user_id(&self, user_id: Uuid) -> Result<Option<Runner>, ContentError>;

    /// Approved runs for one game, most recently submitted first.
    async fn runs_for_game(&self, game_id: &str) -> Vec<Run>;
    /// Approved runs for one runner, most recently completed first.
    async fn runs_for_runner(&self, runner_id: &str) -> Vec<Run>;
    /// Approved runs for one category of one game, most recently
    /// submitted first.
    async fn runs_for_category(&self, game_id: &str, category_slug: &str) -> Vec<Run>;
    /// The most recently submitted approved runs across all games.
    async fn recent_runs(&self, limit: usize) -> Vec<Run>;
    async fn run_count_for_game(&self, game_id: &str) -> i64;
    async fn run_count_for_runner(&self, runner_id: &str) -> i64;

    /// Approved achievement claims for one game.
    async fn achievements_for_game(&self, game_id: &str) -> Vec<Achievement>;
    /// Approved achievement claims for one runner.
    async fn achievements_for_runner(&self, runner_id: &str) -> Vec<Achievement>;

    /// All teams, ordered by name.
    async fn teams(&self) -> Vec<Team>;
    async fn team(&self, team_id: &str) -> Result<Option<Team>, ContentError>;

    /// Stores a run submission as pending.
    async fn submit_run(&self, run: NewRun) -> Result<(), ContentError>;
    /// Stores an achievement claim as pending. Returns `false` when a
    /// claim for the same (game, runner, achievement) triple already
    /// exists, in which case nothing is written.
    async fn submit_achievement(&self, achievement: NewAchievement) -> Result<bool, ContentError>;

    /// Runs awaiting moderation, most recently submitted first.
    async fn pending_runs(&self) -> Vec<Run>;
    /// Achievement claims awaiting moderation.
    async fn pending_achievements(&self) -> Vec<Achievement>;

    /// Site-wide totals. Games count only `Active` ones, runs and
    /// achievements count only approved ones.
    async fn counts(&self) -> SiteCounts;
}

/// Rejects identifiers that could escape the content directory when
/// used as path components.
fn safe_component(s: &str) -> bool {
    !s.is_empty() && !s.contains(['/', '\\']) && !s.starts_with('.')
}

fn check_id(s: &str) -> Result<(), ContentError> {
    if safe_component(s) {
        Ok(())
    } else {
        Err(ContentError::InvalidId(s.to_owned()))
    }
}
