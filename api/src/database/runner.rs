use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

/// Social links shown on a runner's profile.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunnerSocials {
    pub twitch: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub bluesky: Option<String>,
    pub discord: Option<String>,
    pub github: Option<String>,
    pub speedrun: Option<String>,
    pub website: Option<String>,
}

/// A run the runner chose to pin on their profile.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeaturedRun {
    pub game_id: String,
    pub category: String,
    pub note: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PersonalGoal {
    pub label: String,
    pub completed: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Contribution {
    pub label: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Runner {
    /// Stable slug identifying the runner, used in URLs and as the
    /// foreign key on runs and achievements.
    pub runner_id: String,
    /// Handle shown on leaderboards.
    pub runner_name: String,
    /// Optional longer name shown on the profile page.
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub joined_date: NaiveDate,
    pub pronouns: Option<String>,
    pub location: Option<String>,
    /// Free-form profile status. The value `test` marks fixture profiles
    /// that are kept off public listings.
    pub status: Option<String>,
    /// Hidden profiles are excluded from listings but still resolvable
    /// by id for auth purposes.
    pub hidden: Option<bool>,
    pub bio: Option<String>,
    pub accent_color: Option<String>,
    pub cover_position: Option<String>,
    pub banner: Option<String>,
    /// Grants access to the moderation endpoints.
    pub is_admin: Option<bool>,
    pub can_view_test_content: Option<bool>,
    pub socials: Json<RunnerSocials>,
    pub featured_runs: Option<Json<Vec<FeaturedRun>>>,
    pub personal_goals: Option<Json<Vec<PersonalGoal>>>,
    pub contributions: Option<Json<Vec<Contribution>>>,
    /// Auth provider user id this profile is linked to, if the runner
    /// has signed in.
    pub user_id: Option<Uuid>,
    /// Long-form profile body.
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Runner {
    /// Whether the profile shows up on public listings.
    pub fn is_listed(&self) -> bool {
        self.status.as_deref() != Some("test") && !self.hidden.unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }

    /// Name to display, falling back to the leaderboard handle.
    pub fn display(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.runner_name,
        }
    }
}
