use chrono::NaiveDate;

/// Moderation state of a submitted run or achievement claim.
///
/// Only approved entries are ever served on public listings. Stored as
/// lowercase text, matching the values carried in front matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("unknown run status: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for RunStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for RunStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'_>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'_, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Run {
    /// Game the run belongs to.
    pub game_id: String,
    /// Runner who performed the run.
    pub runner_id: String,
    /// Category the run was submitted under. Must resolve through the
    /// game's category definitions.
    pub category_slug: String,
    /// Display label of the category at submission time.
    pub category: String,
    /// Display name of the runner at submission time.
    pub runner: String,
    /// Standard challenge modifier ids applied to the run.
    pub standard_challenges: Vec<String>,
    /// Community challenge label, for player-made runs.
    pub community_challenge: Option<String>,
    /// Glitch ruleset the run was performed under.
    pub glitch_id: Option<String>,
    pub character: Option<String>,
    pub restrictions: Option<Vec<String>>,
    pub restriction_ids: Option<Vec<String>>,
    pub time_primary: String,
    pub timing_method_primary: String,
    pub time_secondary: Option<String>,
    pub timing_method_secondary: Option<String>,
    pub date_completed: NaiveDate,
    pub date_submitted: NaiveDate,
    pub video_url: String,
    pub status: RunStatus,
    pub verified: bool,
    /// Runner id of the moderator who verified the run.
    pub verified_by: Option<String>,
}

/// A run submission as accepted from clients. Moderation fields are not
/// part of the payload, they are forced server side.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NewRun {
    pub game_id: String,
    pub runner_id: String,
    pub category_slug: String,
    pub category: String,
    pub runner: String,
    pub standard_challenges: Vec<String>,
    pub community_challenge: Option<String>,
    pub glitch_id: Option<String>,
    pub character: Option<String>,
    pub restrictions: Option<Vec<String>>,
    pub restriction_ids: Option<Vec<String>>,
    pub time_primary: String,
    pub timing_method_primary: String,
    pub time_secondary: Option<String>,
    pub timing_method_secondary: Option<String>,
    pub date_completed: NaiveDate,
    pub video_url: String,
}

impl NewRun {
    /// Turns the submission into a pending, unverified run.
    pub fn into_run(self, date_submitted: NaiveDate) -> Run {
        Run {
            game_id: self.game_id,
            runner_id: self.runner_id,
            category_slug: self.category_slug,
            category: self.category,
            runner: self.runner,
            standard_challenges: self.standard_challenges,
            community_challenge: self.community_challenge,
            glitch_id: self.glitch_id,
            character: self.character,
            restrictions: self.restrictions,
            restriction_ids: self.restriction_ids,
            time_primary: self.time_primary,
            timing_method_primary: self.timing_method_primary,
            time_secondary: self.time_secondary,
            timing_method_secondary: self.timing_method_secondary,
            date_completed: self.date_completed,
            date_submitted,
            video_url: self.video_url,
            status: RunStatus::Pending,
            verified: false,
            verified_by: None,
        }
    }
}
