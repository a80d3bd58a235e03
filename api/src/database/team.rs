use sqlx::types::Json;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TeamSocials {
    pub twitch: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub bluesky: Option<String>,
    pub discord: Option<String>,
    pub website: Option<String>,
}

/// Team roster entry. `name` is a denormalized display name, the team
/// page falls back to the linked runner profile when it is empty.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub runner_id: String,
    pub name: String,
    pub role: Option<String>,
}

/// A team-level achievement, free-form rather than tied to a game's
/// achievement definitions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TeamAchievement {
    pub label: String,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Team {
    /// Stable slug identifying the team, used in URLs.
    pub team_id: String,
    pub name: String,
    pub tagline: Option<String>,
    pub logo: Option<String>,
    pub socials: Option<Json<TeamSocials>>,
    /// Game ids the team plays, resolved to full games on the team page.
    pub games: Option<Vec<String>>,
    pub members: Option<Json<Vec<TeamMember>>>,
    pub achievements: Option<Json<Vec<TeamAchievement>>>,
    /// Long-form team page body.
    pub content: Option<String>,
}
