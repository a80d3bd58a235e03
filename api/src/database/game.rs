use chrono::{DateTime, Utc};
use sqlx::types::Json;

/// Lifecycle state of a game on the site.
///
/// Stored as plain text so the column stays readable in psql and the
/// filesystem front matter can carry the same values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "Coming Soon")]
    ComingSoon,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::ComingSoon => "Coming Soon",
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            "Coming Soon" => Ok(Self::ComingSoon),
            _ => Err(format!("unknown game status: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for GameStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for GameStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'_>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'_, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

/// A category in the full-runs tier. Flat, no nesting.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FullRunCategory {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub rules: Option<Vec<String>>,
}

/// A leaf challenge inside a mini-challenge group.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MiniChallengeChild {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
}

/// A group in the mini-challenges tier. The group itself is addressable
/// as a category, and so is each of its children.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MiniChallengeGroup {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub children: Vec<MiniChallengeChild>,
}

/// A category in the player-made tier. Flat, no nesting.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerMadeChallenge {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub author: Option<String>,
}

/// Configuration for the optional character column on leaderboards.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterColumn {
    pub enabled: bool,
    pub label: Option<String>,
}

/// A selectable character for games that track one per run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterOption {
    pub id: String,
    pub label: String,
}

/// A community achievement defined by the game's moderators. Runners
/// submit claims against these definitions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CommunityAchievementDef {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Credit line for people who contributed to a game's page.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameCredit {
    pub name: String,
    pub role: Option<String>,
    pub url: Option<String>,
}

/// Which tabs the game page renders.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameTabs {
    pub full_runs: bool,
    pub mini_challenges: bool,
    pub player_made: bool,
    pub achievements: bool,
    pub history: bool,
}

/// A standard challenge modifier that runs can be tagged with.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChallengeType {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

/// A restriction modifier that runs can be tagged with.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Restriction {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

/// A glitch ruleset runs are classified under.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlitchCategory {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Game {
    /// Stable slug identifying the game, used in URLs and as the foreign
    /// key on runs and achievements.
    pub game_id: String,
    /// Display name.
    pub game_name: String,
    /// Alternative names used by search.
    pub game_name_aliases: Option<Vec<String>>,
    /// Lifecycle state. Only `Active` games appear on public listings.
    pub status: GameStatus,
    /// Runner ids of the moderators who review submissions for this game.
    pub reviewers: Vec<String>,
    /// Set on modded variants of a base game.
    pub is_modded: Option<bool>,
    /// `game_id` of the base game when this is a modded variant.
    pub base_game: Option<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    /// Which tabs the game page renders.
    pub tabs: Json<GameTabs>,
    /// Rules text that applies to every category of this game.
    pub general_rules: String,
    /// Standard challenge modifiers runs can be tagged with.
    pub challenges_data: Json<Vec<ChallengeType>>,
    /// Restriction modifiers runs can be tagged with.
    pub restrictions_data: Option<Json<Vec<Restriction>>>,
    /// Glitch rulesets runs are classified under.
    pub glitches_data: Option<Json<Vec<GlitchCategory>>>,
    /// Full-runs tier category definitions, in declaration order.
    pub full_runs: Json<Vec<FullRunCategory>>,
    /// Mini-challenges tier group definitions, in declaration order.
    pub mini_challenges: Json<Vec<MiniChallengeGroup>>,
    /// Player-made tier category definitions, in declaration order.
    pub player_made: Json<Vec<PlayerMadeChallenge>>,
    /// Character column configuration for leaderboards.
    pub character_column: Option<Json<CharacterColumn>>,
    /// Selectable characters when the character column is enabled.
    pub characters_data: Option<Json<Vec<CharacterOption>>>,
    /// Default timing method label shown on leaderboards.
    pub timing_method: String,
    /// Community achievement definitions runners can claim.
    pub community_achievements: Option<Json<Vec<CommunityAchievementDef>>>,
    pub credits: Option<Json<Vec<GameCredit>>>,
    pub cover: Option<String>,
    pub cover_position: Option<String>,
    /// Long-form page body rendered below the leaderboards.
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn is_modded(&self) -> bool {
        self.is_modded.unwrap_or(false)
    }
}
