use chrono::{DateTime, NaiveDate, Utc};

use super::RunStatus;

/// A runner's claim on one of a game's community achievement
/// definitions. At most one claim exists per (game, runner, achievement)
/// triple, duplicates are dropped on submission.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Achievement {
    pub game_id: String,
    pub runner_id: String,
    /// Slug of the achievement definition on the game.
    pub achievement_slug: String,
    pub date_completed: NaiveDate,
    pub proof_url: String,
    pub notes: Option<String>,
    pub status: RunStatus,
    /// Runner id of the moderator who verified the claim.
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// An achievement claim as accepted from clients.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NewAchievement {
    pub game_id: String,
    pub runner_id: String,
    pub achievement_slug: String,
    pub date_completed: NaiveDate,
    pub proof_url: String,
    pub notes: Option<String>,
}

impl NewAchievement {
    /// Turns the claim into a pending achievement.
    pub fn into_achievement(self) -> Achievement {
        Achievement {
            game_id: self.game_id,
            runner_id: self.runner_id,
            achievement_slug: self.achievement_slug,
            date_completed: self.date_completed,
            proof_url: self.proof_url,
            notes: self.notes,
            status: RunStatus::Pending,
            verified_by: None,
            verified_at: None,
        }
    }
}
