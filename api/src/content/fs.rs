use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{check_id, frontmatter, ContentError, ContentSource, SiteCounts};
use crate::database::{Achievement, Game, GameStatus, NewAchievement, NewRun, Run, Runner, RunStatus, Team};

/// Content source backed by a tree of markdown files with YAML front
/// matter.
///
/// Layout under the data directory:
///
/// ```text
/// games/<game_id>.md
/// runners/<runner_id>.md
/// runs/<game_id>/**/*.md
/// achievements/*.md
/// teams/<team_id>.md
/// ```
///
/// Filenames starting with `_` are drafts and stay off public listings,
/// as does anything under a `runs/**/rejected/` directory.
pub struct FsSource {
    data_dir: PathBuf,
}

impl FsSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads every document in one flat collection directory. A missing
    /// directory is an empty collection. Unreadable files are skipped
    /// with a log line.
    async fn load_collection<T: DeserializeOwned + Default>(&self, collection: &str, include_hidden: bool) -> Vec<T> {
        let dir = self.data_dir.join(collection);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::error!(dir = %dir.display(), error = %err, "failed to read content directory");
                return Vec::new();
            }
        };

        let mut docs = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(dir = %dir.display(), error = %err, "failed to read content directory");
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            if !is_content_file(name) {
                continue;
            }

            if !include_hidden && name.starts_with('_') {
                continue;
            }

            if let Some(doc) = self.read_document(&entry.path()).await {
                docs.push(doc);
            }
        }

        docs
    }

    /// Walks the runs tree. Directories named `rejected` and dot
    /// directories are skipped entirely, as are `_` prefixed files.
    async fn load_runs(&self) -> Vec<Run> {
        let mut stack = vec![self.data_dir.join("runs")];
        let mut runs = Vec::new();

        while let Some(dir) = stack.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    tracing::error!(dir = %dir.display(), error = %err, "failed to read runs directory");
                    continue;
                }
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    continue;
                };

                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };

                if file_type.is_dir() {
                    if name == "rejected" || name.starts_with('.') {
                        continue;
                    }

                    stack.push(entry.path());
                } else if is_content_file(name) && !name.starts_with('_') {
                    if let Some(run) = self.read_document(&entry.path()).await {
                        runs.push(run);
                    }
                }
            }
        }

        runs
    }

    async fn approved_runs(&self) -> Vec<Run> {
        self.load_runs()
            .await
            .into_iter()
            .filter(|r| r.status == RunStatus::Approved)
            .collect()
    }

    async fn approved_achievements(&self) -> Vec<Achievement> {
        self.load_collection::<Achievement>("achievements", false)
            .await
            .into_iter()
            .filter(|a| a.status == RunStatus::Approved)
            .collect()
    }

    async fn read_document<T: DeserializeOwned + Default>(&self, path: &Path) -> Option<T> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(file = %path.display(), error = %err, "failed to read content file");
                return None;
            }
        };

        Some(frontmatter::parse(&raw, path).decode(path))
    }
}

#[async_trait]
impl ContentSource for FsSource {
    async fn games(&self) -> Vec<Game> {
        let mut games = self.load_collection::<Game>("games", false).await;
        games.sort_by(|a, b| a.game_name.cmp(&b.game_name));
        games
    }

    async fn all_games(&self) -> Vec<Game> {
        let mut games = self.load_collection::<Game>("games", true).await;
        games.sort_by(|a, b| a.game_name.cmp(&b.game_name));
        games
    }

    async fn active_games(&self) -> Vec<Game> {
        self.games()
            .await
            .into_iter()
            .filter(|g| g.status == GameStatus::Active)
            .collect()
    }

    async fn game(&self, game_id: &str) -> Result<Option<Game>, ContentError> {
        Ok(self.games().await.into_iter().find(|g| g.game_id == game_id))
    }

    async fn runners(&self) -> Vec<Runner> {
        let mut runners = self.load_collection::<Runner>("runners", false).await;
        runners.sort_by(|a, b| a.runner_name.cmp(&b.runner_name));
        runners
    }

    async fn runner(&self, runner_id: &str) -> Result<Option<Runner>, ContentError> {
        Ok(self.runners().await.into_iter().find(|r| r.runner_id == runner_id))
    }

    async fn runner_by_user_id(&self, user_id: Uuid) -> Result<Option<Runner>, ContentError> {
        Ok(self
            .load_collection::<Runner>("runners", true)
            .await
            .into_iter()
            .find(|r| r.user_id == Some(user_id)))
    }

    async fn runs_for_game(&self, game_id: &str) -> Vec<Run> {
        let mut runs: Vec<_> = self
            .approved_runs()
            .await
            .into_iter()
            .filter(|r| r.game_id == game_id)
            .collect();
        runs.sort_by(|a, b| b.date_submitted.cmp(&a.date_submitted));
        runs
    }

    async fn runs_for_runner(&self, runner_id: &str) -> Vec<Run> {
        let mut runs: Vec<_> = self
            .approved_runs()
            .await
            .into_iter()
            .filter(|r| r.runner_id == runner_id)
            .collect();
        runs.sort_by(|a, b| b.date_completed.cmp(&a.date_completed));
        runs
    }

    async fn runs_for_category(&self, game_id: &str, category_slug: &str) -> Vec<Run> {
        let mut runs: Vec<_> = self
            .approved_runs()
            .await
            .into_iter()
            .filter(|r| r.game_id == game_id && r.category_slug == category_slug)
            .collect();
        runs.sort_by(|a, b| b.date_submitted.cmp(&a.date_submitted));
        runs
    }

    async fn recent_runs(&self, limit: usize) -> Vec<Run> {
        let mut runs = self.approved_runs().await;
        runs.sort_by(|a, b| b.date_submitted.cmp(&a.date_submitted));
        runs.truncate(limit);
        runs
    }

    async fn run_count_for_game(&self, game_id: &str) -> i64 {
        self.approved_runs().await.iter().filter(|r| r.game_id == game_id).count() as i64
    }

    async fn run_count_for_runner(&self, runner_id: &str) -> i64 {
        self.approved_runs().await.iter().filter(|r| r.runner_id == runner_id).count() as i64
    }

    async fn achievements_for_game(&self, game_id: &str) -> Vec<Achievement> {
        self.approved_achievements()
            .await
            .into_iter()
            .filter(|a| a.game_id == game_id)
            .collect()
    }

    async fn achievements_for_runner(&self, runner_id: &str) -> Vec<Achievement> {
        self.approved_achievements()
            .await
            .into_iter()
            .filter(|a| a.runner_id == runner_id)
            .collect()
    }

    async fn teams(&self) -> Vec<Team> {
        let mut teams = self.load_collection::<Team>("teams", false).await;
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        teams
    }

    async fn team(&self, team_id: &str) -> Result<Option<Team>, ContentError> {
        Ok(self.teams().await.into_iter().find(|t| t.team_id == team_id))
    }

    async fn submit_run(&self, run: NewRun) -> Result<(), ContentError> {
        check_id(&run.game_id)?;
        check_id(&run.runner_id)?;
        check_id(&run.category_slug)?;

        let run = run.into_run(Utc::now().date_naive());

        let dir = self.data_dir.join("runs").join(&run.game_id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!(
            "{}-{}-{}.md",
            run.runner_id,
            run.category_slug,
            Utc::now().timestamp_millis()
        ));
        tokio::fs::write(&path, frontmatter::render(&run)?).await?;

        tracing::info!(file = %path.display(), "stored run submission");

        Ok(())
    }

    async fn submit_achievement(&self, achievement: NewAchievement) -> Result<bool, ContentError> {
        check_id(&achievement.game_id)?;
        check_id(&achievement.runner_id)?;
        check_id(&achievement.achievement_slug)?;

        let existing = self.load_collection::<Achievement>("achievements", true).await;
        if existing.iter().any(|a| {
            a.game_id == achievement.game_id
                && a.runner_id == achievement.runner_id
                && a.achievement_slug == achievement.achievement_slug
        }) {
            return Ok(false);
        }

        let achievement = achievement.into_achievement();

        let dir = self.data_dir.join("achievements");
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!(
            "{}-{}-{}.md",
            achievement.game_id, achievement.runner_id, achievement.achievement_slug
        ));
        tokio::fs::write(&path, frontmatter::render(&achievement)?).await?;

        tracing::info!(file = %path.display(), "stored achievement claim");

        Ok(true)
    }

    async fn pending_runs(&self) -> Vec<Run> {
        let mut runs: Vec<_> = self
            .load_runs()
            .await
            .into_iter()
            .filter(|r| r.status == RunStatus::Pending)
            .collect();
        runs.sort_by(|a, b| b.date_submitted.cmp(&a.date_submitted));
        runs
    }

    async fn pending_achievements(&self) -> Vec<Achievement> {
        self.load_collection::<Achievement>("achievements", true)
            .await
            .into_iter()
            .filter(|a| a.status == RunStatus::Pending)
            .collect()
    }

    async fn counts(&self) -> SiteCounts {
        let (games, runners, runs, achievements, teams) = tokio::join!(
            self.active_games(),
            self.runners(),
            self.approved_runs(),
            self.approved_achievements(),
            self.teams(),
        );

        SiteCounts {
            game_count: games.len() as i64,
            runner_count: runners.len() as i64,
            run_count: runs.len() as i64,
            achievement_count: achievements.len() as i64,
            team_count: teams.len() as i64,
        }
    }
}

/// Markdown files only, and never the directory's README.
fn is_content_file(name: &str) -> bool {
    name.ends_with(".md") && name != "README.md"
}
