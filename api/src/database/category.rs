use super::{Game, MiniChallengeGroup};

/// The three leaderboard tiers every game's categories are split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CategoryTier {
    #[serde(rename = "full-runs")]
    FullRuns,
    #[serde(rename = "mini-challenges")]
    MiniChallenges,
    #[serde(rename = "player-made")]
    PlayerMade,
}

impl CategoryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullRuns => "full-runs",
            Self::MiniChallenges => "mini-challenges",
            Self::PlayerMade => "player-made",
        }
    }
}

impl std::str::FromStr for CategoryTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-runs" => Ok(Self::FullRuns),
            "mini-challenges" => Ok(Self::MiniChallenges),
            "player-made" => Ok(Self::PlayerMade),
            _ => Err(format!("unknown category tier: {}", s)),
        }
    }
}

impl std::fmt::Display for CategoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved category, flattened to a single shape regardless of which
/// tier it came from. Children of a mini-challenge group carry the
/// group's slug and label in `parent_group` / `parent_group_label`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategoryInfo {
    pub slug: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tier: CategoryTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_group_label: Option<String>,
}

impl Game {
    /// Resolves a category by tier and slug.
    ///
    /// Mini-challenge groups are checked in declaration order, each
    /// group's own slug before its children. Returns `None` for unknown
    /// tiers and unknown slugs, never an error.
    pub fn find_category(&self, tier: &str, slug: &str) -> Option<CategoryInfo> {
        let tier: CategoryTier = tier.parse().ok()?;

        match tier {
            CategoryTier::FullRuns => self.full_runs.iter().find(|c| c.slug == slug).map(|c| CategoryInfo {
                slug: c.slug.clone(),
                label: c.label.clone(),
                description: c.description.clone(),
                tier,
                parent_group: None,
                parent_group_label: None,
            }),
            CategoryTier::MiniChallenges => {
                for group in self.mini_challenges.iter() {
                    if group.slug == slug {
                        return Some(group_info(group));
                    }

                    if let Some(child) = group.children.iter().find(|c| c.slug == slug) {
                        return Some(CategoryInfo {
                            slug: child.slug.clone(),
                            label: child.label.clone(),
                            description: child.description.clone(),
                            tier,
                            parent_group: Some(group.slug.clone()),
                            parent_group_label: Some(group.label.clone()),
                        });
                    }
                }

                None
            }
            CategoryTier::PlayerMade => self.player_made.iter().find(|c| c.slug == slug).map(|c| CategoryInfo {
                slug: c.slug.clone(),
                label: c.label.clone(),
                description: c.description.clone(),
                tier,
                parent_group: None,
                parent_group_label: None,
            }),
        }
    }

    /// Every addressable category of the game, in tier order and
    /// declaration order within each tier. Mini-challenge groups appear
    /// before their children.
    pub fn all_categories(&self) -> Vec<CategoryInfo> {
        let mut categories = Vec::new();

        for c in self.full_runs.iter() {
            categories.push(CategoryInfo {
                slug: c.slug.clone(),
                label: c.label.clone(),
                description: c.description.clone(),
                tier: CategoryTier::FullRuns,
                parent_group: None,
                parent_group_label: None,
            });
        }

        for group in self.mini_challenges.iter() {
            categories.push(group_info(group));

            for child in &group.children {
                categories.push(CategoryInfo {
                    slug: child.slug.clone(),
                    label: child.label.clone(),
                    description: child.description.clone(),
                    tier: CategoryTier::MiniChallenges,
                    parent_group: Some(group.slug.clone()),
                    parent_group_label: Some(group.label.clone()),
                });
            }
        }

        for c in self.player_made.iter() {
            categories.push(CategoryInfo {
                slug: c.slug.clone(),
                label: c.label.clone(),
                description: c.description.clone(),
                tier: CategoryTier::PlayerMade,
                parent_group: None,
                parent_group_label: None,
            });
        }

        categories
    }

    /// Whether a slug resolves to a category in any tier.
    pub fn has_category(&self, slug: &str) -> bool {
        self.find_category("full-runs", slug).is_some()
            || self.find_category("mini-challenges", slug).is_some()
            || self.find_category("player-made", slug).is_some()
    }
}

fn group_info(group: &MiniChallengeGroup) -> CategoryInfo {
    CategoryInfo {
        slug: group.slug.clone(),
        label: group.label.clone(),
        description: group.description.clone(),
        tier: CategoryTier::MiniChallenges,
        parent_group: None,
        parent_group_label: None,
    }
}
