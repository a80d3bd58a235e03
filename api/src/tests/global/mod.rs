use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::context::{Context, Handler};
use hmac::{Hmac, Mac};
use jwt::{Claims, RegisteredClaims, SignWithKey};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::{AppConfig, AuthConfig};
use crate::content::{ContentSource, FsSource, SiteContent};
use crate::global::GlobalState;

/// Auth provider user id the `knightslayer` fixture profile is linked
/// to.
pub const ADMIN_USER_ID: &str = "0d9c80a2-5f24-4c39-9cee-6b5a78d1a5f3";

pub async fn mock_global_state(config: AppConfig) -> (Arc<GlobalState>, Handler) {
    let (ctx, handler) = Context::new();

    let content: Box<dyn ContentSource> = Box::new(FsSource::new(&config.content.data_dir));
    let site = SiteContent::load(&config.content.data_dir).await;

    let global = Arc::new(GlobalState::new(config, content, site, ctx));

    (global, handler)
}

pub fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().expect("fixture path has no parent")).expect("failed to create fixture dir");
    std::fs::write(path, contents).expect("failed to write fixture");
}

/// Signs an access token the way the auth provider would.
pub fn mint_access_token(
    config: &AuthConfig,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> String {
    let key = Hmac::<Sha256>::new_from_slice(config.jwt_secret.as_bytes()).expect("failed to build signing key");

    let mut claims = Claims::new(RegisteredClaims {
        issuer: Some(config.jwt_issuer.clone()),
        subject: Some(user_id.to_string()),
        audience: None,
        expiration: Some(expires_at.timestamp() as u64),
        not_before: None,
        issued_at: Some(issued_at.timestamp() as u64),
        json_web_token_id: None,
    });
    claims
        .private
        .insert("email".to_owned(), serde_json::Value::String("runner@example.com".to_owned()));

    claims.sign_with_key(&key).expect("failed to sign token")
}

/// A small but complete content tree: two listed games and a draft, three
/// runners (one hidden), approved and pending runs, an achievement claim,
/// a team, two posts and the config files.
pub fn seed_data(dir: &Path) {
    write_file(
        dir,
        "games/hollow-knight.md",
        r#"---
game_id: hollow-knight
game_name: Hollow Knight
status: Active
reviewers:
  - knightslayer
genres:
  - metroidvania
platforms:
  - pc
timing_method: igt
general_rules: No cheat engine.
tabs:
  full_runs: true
  mini_challenges: true
  player_made: true
  achievements: true
  history: true
challenges_data:
  - id: hitless
    label: Hitless
full_runs:
  - slug: any-percent
    label: Any%
  - slug: true-ending
    label: True Ending
mini_challenges:
  - slug: pantheons
    label: Pantheons
    children:
      - slug: p5-hitless
        label: P5 Hitless
player_made:
  - slug: sl-floor
    label: Steel Soul Low%
    author: knightslayer
community_achievements:
  - slug: steel-soul
    label: Steel Soul
---
Hollow Knight is a challenge running staple.
"#,
    );

    write_file(
        dir,
        "games/silksong.md",
        r#"---
game_id: silksong
game_name: Silksong
status: Coming Soon
---
"#,
    );

    write_file(
        dir,
        "games/_wip-game.md",
        r#"---
game_id: wip-game
game_name: Work In Progress
status: Active
---
"#,
    );

    write_file(
        dir,
        "runners/knightslayer.md",
        &format!(
            r#"---
runner_id: knightslayer
runner_name: KnightSlayer
display_name: Knight Slayer
joined_date: 2023-01-15
pronouns: they/them
is_admin: true
user_id: {ADMIN_USER_ID}
socials:
  twitch: knightslayer
---
Longtime hitless runner.
"#
        ),
    );

    write_file(
        dir,
        "runners/ghostrunner.md",
        r#"---
runner_id: ghostrunner
runner_name: GhostRunner
joined_date: 2023-06-01
---
"#,
    );

    write_file(
        dir,
        "runners/shade.md",
        r#"---
runner_id: shade
runner_name: Shade
joined_date: 2024-02-02
hidden: true
---
"#,
    );

    write_file(
        dir,
        "runs/hollow-knight/knightslayer-any-percent-1.md",
        r#"---
game_id: hollow-knight
runner_id: knightslayer
category_slug: any-percent
category: Any%
runner: Knight Slayer
time_primary: "33:07"
timing_method_primary: igt
date_completed: 2024-02-20
date_submitted: 2024-03-01
video_url: https://youtu.be/run1
status: approved
verified: true
verified_by: ghostrunner
---
"#,
    );

    write_file(
        dir,
        "runs/hollow-knight/ghostrunner-p5-hitless-1.md",
        r#"---
game_id: hollow-knight
runner_id: ghostrunner
category_slug: p5-hitless
category: P5 Hitless
runner: GhostRunner
time_primary: "58:40"
timing_method_primary: igt
date_completed: 2024-03-28
date_submitted: 2024-04-01
video_url: https://youtu.be/run2
status: approved
verified: true
verified_by: knightslayer
---
"#,
    );

    write_file(
        dir,
        "runs/hollow-knight/knightslayer-true-ending-1.md",
        r#"---
game_id: hollow-knight
runner_id: knightslayer
category_slug: true-ending
category: True Ending
runner: Knight Slayer
time_primary: "41:12"
timing_method_primary: igt
date_completed: 2024-05-01
date_submitted: 2024-05-05
video_url: https://youtu.be/run3
status: pending
---
"#,
    );

    write_file(
        dir,
        "runs/hollow-knight/rejected/old-any-percent.md",
        r#"---
game_id: hollow-knight
runner_id: ghostrunner
category_slug: any-percent
category: Any%
runner: GhostRunner
time_primary: "50:00"
timing_method_primary: igt
date_completed: 2023-01-01
date_submitted: 2023-01-02
video_url: https://youtu.be/run0
status: approved
---
"#,
    );

    write_file(
        dir,
        "achievements/hollow-knight-knightslayer-steel-soul.md",
        r#"---
game_id: hollow-knight
runner_id: knightslayer
achievement_slug: steel-soul
date_completed: 2024-04-10
proof_url: https://youtu.be/proof1
status: approved
verified_by: ghostrunner
---
"#,
    );

    write_file(
        dir,
        "teams/team-cherry.md",
        r#"---
team_id: team-cherry
name: Team Cherry
tagline: Soul mates
games:
  - hollow-knight
members:
  - runner_id: knightslayer
    role: captain
  - runner_id: wanderer
    name: Wandering Soul
---
We run everything Hallownest has to offer.
"#,
    );

    write_file(
        dir,
        "posts/2024-01-10-welcome.md",
        r#"---
title: Welcome
date: 2024-01-10
author: KnightSlayer
description: The site is live.
---
Welcome to the Challenge Run Community site.
"#,
    );

    write_file(
        dir,
        "posts/2024-05-05-spring-update.md",
        r#"---
title: Spring Update
date: 2024-05-05
excerpt: Spring cleaning.
---
New categories across the board.
"#,
    );

    write_file(
        dir,
        "config/platforms.yml",
        r#"- slug: pc
  label: PC
- slug: switch
  label: Switch
"#,
    );

    write_file(
        dir,
        "config/genres.yml",
        r#"- slug: metroidvania
  label: Metroidvania
"#,
    );

    write_file(
        dir,
        "config/default-rules.yml",
        r#"general_rules: Emulators must be declared.
"#,
    );

    write_file(
        dir,
        "config/history/hollow-knight.yml",
        r#"- date: 2024-01-05
  action: added-category
  target: any-percent
  by: knightslayer
- date: 2024-03-02
  action: rule-change
  note: Clarified bindings.
  by: knightslayer
"#,
    );
}
