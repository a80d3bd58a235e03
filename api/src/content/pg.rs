use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ContentError, ContentSource, SiteCounts};
use crate::database::{Achievement, Game, NewAchievement, NewRun, Run, Runner, Team};

/// Content source backed by Postgres. Row shapes mirror the front
/// matter of the filesystem source, so both backends serve identical
/// payloads.
pub struct PgSource {
    db: Arc<sqlx::PgPool>,
}

impl PgSource {
    pub fn new(db: Arc<sqlx::PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentSource for PgSource {
    async fn games(&self) -> Vec<Game> {
        or_empty(
            sqlx::query_as("SELECT * FROM games ORDER BY game_name")
                .fetch_all(self.db.as_ref())
                .await,
            "games",
        )
    }

    async fn all_games(&self) -> Vec<Game> {
        self.games().await
    }

    async fn active_games(&self) -> Vec<Game> {
        or_empty(
            sqlx::query_as("SELECT * FROM games WHERE status = 'Active' ORDER BY game_name")
                .fetch_all(self.db.as_ref())
                .await,
            "active games",
        )
    }

    async fn game(&self, game_id: &str) -> Result<Option<Game>, ContentError> {
        Ok(sqlx::query_as("SELECT * FROM games WHERE game_id = $1")
            .bind(game_id)
            .fetch_optional(self.db.as_ref())
            .await?)
    }

    async fn runners(&self) -> Vec<Runner> {
        or_empty(
            sqlx::query_as("SELECT * FROM runners ORDER BY runner_name")
                .fetch_all(self.db.as_ref())
                .await,
            "runners",
        )
    }

    async fn runner(&self, runner_id: &str) -> Result<Option<Runner>, ContentError> {
        Ok(sqlx::query_as("SELECT * FROM runners WHERE runner_id = $1")
            .bind(runner_id)
            .fetch_optional(self.db.as_ref())
            .await?)
    }

    async fn runner_by_user_id(&self, user_id: Uuid) -> Result<Option<Runner>, ContentError> {
        Ok(sqlx::query_as("SELECT * FROM runners WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.db.as_ref())
            .await?)
    }

    async fn runs_for_game(&self, game_id: &str) -> Vec<Run> {
        or_empty(
            sqlx::query_as(
                "SELECT * FROM runs WHERE game_id = $1 AND status = 'approved' ORDER BY submitted_at DESC",
            )
            .bind(game_id)
            .fetch_all(self.db.as_ref())
            .await,
            "runs for game",
        )
    }

    async fn runs_for_runner(&self, runner_id: &str) -> Vec<Run> {
        or_empty(
            sqlx::query_as(
                "SELECT * FROM runs WHERE runner_id = $1 AND status = 'approved' ORDER BY date_completed DESC",
            )
            .bind(runner_id)
            .fetch_all(self.db.as_ref())
            .await,
            "runs for runner",
        )
    }

    async fn runs_for_category(&self, game_id: &str, category_slug: &str) -> Vec<Run> {
        or_empty(
            sqlx::query_as(
                "SELECT * FROM runs WHERE game_id = $1 AND category_slug = $2 AND status = 'approved' ORDER BY submitted_at DESC",
            )
            .bind(game_id)
            .bind(category_slug)
            .fetch_all(self.db.as_ref())
            .await,
            "runs for category",
        )
    }

    async fn recent_runs(&self, limit: usize) -> Vec<Run> {
        or_empty(
            sqlx::query_as("SELECT * FROM runs WHERE status = 'approved' ORDER BY submitted_at DESC LIMIT $1")
                .bind(limit as i64)
                .fetch_all(self.db.as_ref())
                .await,
            "recent runs",
        )
    }

    async fn run_count_for_game(&self, game_id: &str) -> i64 {
        or_zero(
            sqlx::query_scalar("SELECT COUNT(*) FROM runs WHERE game_id = $1 AND status = 'approved'")
                .bind(game_id)
                .fetch_one(self.db.as_ref())
                .await,
            "run count for game",
        )
    }

    async fn run_count_for_runner(&self, runner_id: &str) -> i64 {
        or_zero(
            sqlx::query_scalar("SELECT COUNT(*) FROM runs WHERE runner_id = $1 AND status = 'approved'")
                .bind(runner_id)
                .fetch_one(self.db.as_ref())
                .await,
            "run count for runner",
        )
    }

    async fn achievements_for_game(&self, game_id: &str) -> Vec<Achievement> {
        or_empty(
            sqlx::query_as(
                "SELECT * FROM achievements WHERE game_id = $1 AND status = 'approved' ORDER BY date_completed DESC",
            )
            .bind(game_id)
            .fetch_all(self.db.as_ref())
            .await,
            "achievements for game",
        )
    }

    async fn achievements_for_runner(&self, runner_id: &str) -> Vec<Achievement> {
        or_empty(
            sqlx::query_as(
                "SELECT * FROM achievements WHERE runner_id = $1 AND status = 'approved' ORDER BY date_completed DESC",
            )
            .bind(runner_id)
            .fetch_all(self.db.as_ref())
            .await,
            "achievements for runner",
        )
    }

    async fn teams(&self) -> Vec<Team> {
        or_empty(
            sqlx::query_as("SELECT * FROM teams ORDER BY name")
                .fetch_all(self.db.as_ref())
                .await,
            "teams",
        )
    }

    async fn team(&self, team_id: &str) -> Result<Option<Team>, ContentError> {
        Ok(sqlx::query_as("SELECT * FROM teams WHERE team_id = $1")
            .bind(team_id)
            .fetch_optional(self.db.as_ref())
            .await?)
    }

    async fn submit_run(&self, run: NewRun) -> Result<(), ContentError> {
        let run = run.into_run(Utc::now().date_naive());

        sqlx::query(
            r#"INSERT INTO runs (
                game_id, runner_id, category_slug, category, runner,
                standard_challenges, community_challenge, glitch_id, "character",
                restrictions, restriction_ids, time_primary, timing_method_primary,
                time_secondary, timing_method_secondary, date_completed, video_url,
                date_submitted, submitted_at, status, verified
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, NOW(), $19, $20)"#,
        )
        .bind(&run.game_id)
        .bind(&run.runner_id)
        .bind(&run.category_slug)
        .bind(&run.category)
        .bind(&run.runner)
        .bind(&run.standard_challenges)
        .bind(&run.community_challenge)
        .bind(&run.glitch_id)
        .bind(&run.character)
        .bind(&run.restrictions)
        .bind(&run.restriction_ids)
        .bind(&run.time_primary)
        .bind(&run.timing_method_primary)
        .bind(&run.time_secondary)
        .bind(&run.timing_method_secondary)
        .bind(run.date_completed)
        .bind(&run.video_url)
        .bind(run.date_submitted)
        .bind(run.status.as_str())
        .bind(run.verified)
        .execute(self.db.as_ref())
        .await?;

        Ok(())
    }

    async fn submit_achievement(&self, achievement: NewAchievement) -> Result<bool, ContentError> {
        let achievement = achievement.into_achievement();

        let result = sqlx::query(
            "INSERT INTO achievements (game_id, runner_id, achievement_slug, date_completed, proof_url, notes, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (game_id, runner_id, achievement_slug) DO NOTHING",
        )
        .bind(&achievement.game_id)
        .bind(&achievement.runner_id)
        .bind(&achievement.achievement_slug)
        .bind(achievement.date_completed)
        .bind(&achievement.proof_url)
        .bind(&achievement.notes)
        .bind(achievement.status.as_str())
        .execute(self.db.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pending_runs(&self) -> Vec<Run> {
        or_empty(
            sqlx::query_as("SELECT * FROM runs WHERE status = 'pending' ORDER BY submitted_at DESC")
                .fetch_all(self.db.as_ref())
                .await,
            "pending runs",
        )
    }

    async fn pending_achievements(&self) -> Vec<Achievement> {
        or_empty(
            sqlx::query_as("SELECT * FROM achievements WHERE status = 'pending' ORDER BY date_completed DESC")
                .fetch_all(self.db.as_ref())
                .await,
            "pending achievements",
        )
    }

    async fn counts(&self) -> SiteCounts {
        let (games, runners, runs, achievements, teams) = tokio::join!(
            sqlx::query_scalar("SELECT COUNT(*) FROM games WHERE status = 'Active'").fetch_one(self.db.as_ref()),
            sqlx::query_scalar("SELECT COUNT(*) FROM runners").fetch_one(self.db.as_ref()),
            sqlx::query_scalar("SELECT COUNT(*) FROM runs WHERE status = 'approved'").fetch_one(self.db.as_ref()),
            sqlx::query_scalar("SELECT COUNT(*) FROM achievements WHERE status = 'approved'")
                .fetch_one(self.db.as_ref()),
            sqlx::query_scalar("SELECT COUNT(*) FROM teams").fetch_one(self.db.as_ref()),
        );

        SiteCounts {
            game_count: or_zero(games, "game count"),
            runner_count: or_zero(runners, "runner count"),
            run_count: or_zero(runs, "run count"),
            achievement_count: or_zero(achievements, "achievement count"),
            team_count: or_zero(teams, "team count"),
        }
    }
}

fn or_empty<T>(result: Result<Vec<T>, sqlx::Error>, what: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(error = %err, "failed to fetch {}", what);
            Vec::new()
        }
    }
}

fn or_zero(result: Result<i64, sqlx::Error>, what: &str) -> i64 {
    match result {
        Ok(count) => count,
        Err(err) => {
            tracing::error!(error = %err, "failed to fetch {}", what);
            0
        }
    }
}
