use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::context::Handler;
use reqwest::StatusCode;
use serial_test::serial;
use uuid::Uuid;

use crate::api;
use crate::config::AppConfig;
use crate::global::GlobalState;
use crate::tests::global::{mint_access_token, mock_global_state, seed_data, ADMIN_USER_ID};

struct TestServer {
    global: Arc<GlobalState>,
    handler: Handler,
    server: tokio::task::JoinHandle<anyhow::Result<()>>,
    client: reqwest::Client,
    base: String,
}

impl TestServer {
    async fn spawn(data_dir: &Path) -> Self {
        let port = portpicker::pick_unused_port().expect("failed to pick a port");

        let mut config = AppConfig::default();
        config.api.bind_address = format!("127.0.0.1:{}", port)
            .parse()
            .expect("failed to parse bind address");
        config.content.data_dir = data_dir.to_string_lossy().into_owned();
        config.auth.jwt_secret = "test-secret".to_owned();

        let (global, handler) = mock_global_state(config).await;

        let server = tokio::spawn(api::run(global.clone()));
        tokio::time::sleep(Duration::from_millis(300)).await;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build client");

        Self {
            global,
            handler,
            server,
            client,
            base: format!("http://127.0.0.1:{}", port),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// A live access token for a user id, paired with a placeholder
    /// refresh token the way the browser would send it.
    fn session_cookie(&self, user_id: Uuid) -> String {
        let auth = &self.global.config.auth;
        let token = mint_access_token(
            auth,
            user_id,
            Utc::now() - chrono::Duration::minutes(1),
            Utc::now() + chrono::Duration::hours(1),
        );

        format!("{}={}; {}=test-refresh", auth.access_cookie, token, auth.refresh_cookie)
    }

    async fn get_json(&self, path: &str, expected: StatusCode) -> serde_json::Value {
        let response = self.client.get(self.url(path)).send().await.expect("request failed");
        assert_eq!(response.status(), expected, "unexpected status for {}", path);
        response.json().await.expect("invalid json")
    }

    async fn shutdown(self) {
        let TestServer {
            global,
            handler,
            server,
            client,
            base: _,
        } = self;

        drop(client);
        drop(global);
        handler.cancel().await;
        server.await.expect("server task panicked").expect("server failed");
    }
}

fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

#[serial]
#[tokio::test]
async fn test_serve_content_routes() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    seed_data(dir.path());

    let server = TestServer::spawn(dir.path()).await;

    let health = server.client.get(server.url("/v1/health")).send().await.expect("request failed");
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(
        health.headers().get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let body: serde_json::Value = health.json().await.expect("invalid json");
    assert_eq!(body["status"], "ok");

    let home = server.get_json("/v1/home", StatusCode::OK).await;
    assert_eq!(home["games"].as_array().expect("not an array").len(), 1);
    assert_eq!(home["recent_runs"][0]["category_slug"], "p5-hitless");
    assert_eq!(home["stats"]["game_count"], 1);
    assert_eq!(home["stats"]["run_count"], 2);
    assert_eq!(home["stats"]["post_count"], 2);
    assert_eq!(home["teams"].as_array().expect("not an array").len(), 1);

    let index = server.get_json("/v1/games", StatusCode::OK).await;
    let games = index["games"].as_array().expect("not an array");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["game_id"], "hollow-knight");
    assert_eq!(games[0]["run_count"], 2);
    assert_eq!(index["platforms"].as_array().expect("not an array").len(), 2);
    assert_eq!(index["genres"][0]["slug"], "metroidvania");

    let game = server.get_json("/v1/games/hollow-knight", StatusCode::OK).await;
    assert_eq!(game["game"]["game_name"], "Hollow Knight");
    assert_eq!(game["categories"].as_array().expect("not an array").len(), 5);
    assert_eq!(game["runs"].as_array().expect("not an array").len(), 2);
    assert_eq!(game["runs"][0]["category_slug"], "p5-hitless");
    assert_eq!(game["total_run_count"], 2);
    assert_eq!(game["run_count_by_category"]["any-percent"], 1);
    assert_eq!(game["run_count_by_category"]["true-ending"], 0);
    assert_eq!(game["runner_map"]["knightslayer"]["display_name"], "Knight Slayer");
    assert_eq!(game["achievements"].as_array().expect("not an array").len(), 1);
    assert_eq!(game["default_general_rules"], "Emulators must be declared.");
    assert!(game["base_game"].is_null());

    // Not active, still has a page.
    server.get_json("/v1/games/silksong", StatusCode::OK).await;

    let missing = server.get_json("/v1/games/nope", StatusCode::NOT_FOUND).await;
    assert_eq!(missing["message"], "Game not found");
    assert_eq!(missing["success"], false);

    let categories = server.get_json("/v1/games/hollow-knight/categories", StatusCode::OK).await;
    assert_eq!(categories["categories"][2]["slug"], "pantheons");

    let board = server
        .get_json("/v1/games/hollow-knight/runs/mini-challenges/p5-hitless", StatusCode::OK)
        .await;
    assert_eq!(board["category"]["parent_group"], "pantheons");
    assert_eq!(board["category"]["parent_group_label"], "Pantheons");
    assert_eq!(board["runs"].as_array().expect("not an array").len(), 1);

    let bad_tier = server
        .get_json("/v1/games/hollow-knight/runs/bosses/p5-hitless", StatusCode::NOT_FOUND)
        .await;
    assert_eq!(bad_tier["message"], "Category not found");

    server
        .get_json("/v1/games/hollow-knight/runs/full-runs/p5-hitless", StatusCode::NOT_FOUND)
        .await;

    let history = server.get_json("/v1/games/hollow-knight/history", StatusCode::OK).await;
    assert_eq!(history["history"].as_array().expect("not an array").len(), 2);
    assert_eq!(history["history"][0]["date"], "2024-03-02");

    let runners = server.get_json("/v1/runners", StatusCode::OK).await;
    let listed = runners["runners"].as_array().expect("not an array");
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r["runner_id"] != "shade"));
    assert!(listed.iter().any(|r| r["runner_id"] == "knightslayer" && r["run_count"] == 1));

    let profile = server.get_json("/v1/runners/knightslayer", StatusCode::OK).await;
    assert_eq!(profile["runner"]["runner_name"], "KnightSlayer");
    assert_eq!(profile["runs"].as_array().expect("not an array").len(), 1);
    assert_eq!(profile["achievements"].as_array().expect("not an array").len(), 1);
    let groups = profile["game_groups"].as_array().expect("not an array");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["game"]["game_id"], "hollow-knight");

    // Hidden profiles are not listed but stay resolvable.
    let hidden = server.get_json("/v1/runners/shade", StatusCode::OK).await;
    assert_eq!(hidden["runner"]["runner_id"], "shade");

    let missing = server.get_json("/v1/runners/nope", StatusCode::NOT_FOUND).await;
    assert_eq!(missing["message"], "Runner not found");

    let teams = server.get_json("/v1/teams", StatusCode::OK).await;
    assert_eq!(teams["teams"].as_array().expect("not an array").len(), 1);

    let team = server.get_json("/v1/teams/team-cherry", StatusCode::OK).await;
    assert_eq!(team["games"][0]["game_id"], "hollow-knight");
    let members = team["members"].as_array().expect("not an array");
    assert_eq!(members[0]["name"], "Knight Slayer");
    assert_eq!(members[0]["has_profile"], true);
    assert_eq!(members[0]["role"], "captain");
    assert_eq!(members[1]["name"], "Wandering Soul");
    assert_eq!(members[1]["has_profile"], false);

    let search = server.get_json("/v1/search", StatusCode::OK).await;
    let entries = search["entries"].as_array().expect("not an array");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().any(|e| e["type"] == "game" && e["url"] == "/games/hollow-knight"));
    assert!(entries.iter().all(|e| e["id"] != "shade"));

    let posts = server.get_json("/v1/posts", StatusCode::OK).await;
    assert_eq!(posts["posts"][0]["slug"], "spring-update");
    assert_eq!(posts["posts"][1]["slug"], "welcome");

    let post = server.get_json("/v1/posts/welcome", StatusCode::OK).await;
    assert_eq!(post["post"]["title"], "Welcome");

    let missing = server.get_json("/v1/posts/nope", StatusCode::NOT_FOUND).await;
    assert_eq!(missing["message"], "Post not found");

    let feed = server.client.get(server.url("/feed.xml")).send().await.expect("request failed");
    assert_eq!(feed.status(), StatusCode::OK);
    assert_eq!(
        feed.headers().get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/xml")
    );
    let xml = feed.text().await.expect("invalid body");
    assert!(xml.contains("<title><![CDATA[Spring Update]]></title>"));
    assert!(xml.contains("/news/welcome"));

    let sitemap = server.client.get(server.url("/sitemap.xml")).send().await.expect("request failed");
    assert_eq!(sitemap.status(), StatusCode::OK);
    let xml = sitemap.text().await.expect("invalid body");
    assert!(xml.contains("/games/hollow-knight"));
    assert!(xml.contains("/runners/knightslayer"));
    assert!(!xml.contains("shade"));

    let missing = server.get_json("/v1/nope", StatusCode::NOT_FOUND).await;
    assert_eq!(missing["message"], "Not Found");
    assert_eq!(missing["success"], false);

    server.shutdown().await;
}

#[serial]
#[tokio::test]
async fn test_serve_auth_routes() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    seed_data(dir.path());

    let server = TestServer::spawn(dir.path()).await;
    let auth = server.global.config.auth.clone();
    let user_id: Uuid = ADMIN_USER_ID.parse().expect("bad fixture uuid");

    // Anonymous requests carry no session.
    let session = server.get_json("/v1/session", StatusCode::OK).await;
    assert!(session["session"].is_null());

    // A stray OAuth code on the site root bounces to the callback.
    let redirect = server
        .client
        .get(server.url("/?code=abc123&state=ready"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(redirect.status(), StatusCode::FOUND);
    assert_eq!(
        redirect.headers().get(reqwest::header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/v1/auth/callback?code=abc123&state=ready")
    );

    // With session cookies present the root is left alone.
    let not_redirected = server
        .client
        .get(server.url("/?code=abc123"))
        .header(reqwest::header::COOKIE, server.session_cookie(user_id))
        .send()
        .await
        .expect("request failed");
    assert_eq!(not_redirected.status(), StatusCode::NOT_FOUND);

    // Completing a sign in sets both session cookies.
    let token = mint_access_token(
        &auth,
        user_id,
        Utc::now() - chrono::Duration::minutes(1),
        Utc::now() + chrono::Duration::hours(1),
    );
    let callback = server
        .client
        .post(server.url("/v1/auth/callback"))
        .json(&serde_json::json!({ "access_token": token, "refresh_token": "provider-refresh" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(callback.status(), StatusCode::OK);
    let cookies = set_cookies(&callback);
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("crc-access-token="));
    assert!(cookies[0].contains("Max-Age=3600"));
    assert!(cookies[1].starts_with("crc-refresh-token=provider-refresh"));
    assert!(cookies[1].contains("Max-Age=2592000"));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly") && c.contains("SameSite=Lax")));

    let missing = server
        .client
        .post(server.url("/v1/auth/callback"))
        .json(&serde_json::json!({ "access_token": token }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing.json().await.expect("invalid json");
    assert_eq!(body["message"], "Missing tokens");

    let invalid = server
        .client
        .post(server.url("/v1/auth/callback"))
        .json(&serde_json::json!({ "access_token": "garbage", "refresh_token": "r" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = invalid.json().await.expect("invalid json");
    assert_eq!(body["message"], "Invalid tokens");

    // The cookies restore a session on later requests.
    let session = server
        .client
        .get(server.url("/v1/session"))
        .header(reqwest::header::COOKIE, server.session_cookie(user_id))
        .send()
        .await
        .expect("request failed");
    let body: serde_json::Value = session.json().await.expect("invalid json");
    assert_eq!(body["session"]["user_id"], ADMIN_USER_ID);
    assert_eq!(body["session"]["email"], "runner@example.com");

    let signout = server
        .client
        .post(server.url("/v1/auth/signout"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(signout.status(), StatusCode::OK);
    let cookies = set_cookies(&signout);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

    server.shutdown().await;
}

#[serial]
#[tokio::test]
async fn test_serve_submission_routes() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    seed_data(dir.path());

    let server = TestServer::spawn(dir.path()).await;
    let admin_cookie = server.session_cookie(ADMIN_USER_ID.parse().expect("bad fixture uuid"));
    let unlinked_cookie = server.session_cookie(Uuid::new_v4());

    let submission = serde_json::json!({
        "game_id": "hollow-knight",
        "category_slug": "any-percent",
        "category": "Any%",
        "time_primary": "31:55",
        "timing_method_primary": "igt",
        "date_completed": "2024-06-01",
        "video_url": "https://youtu.be/new-run",
    });

    // Submissions need a signed in runner.
    let anonymous = server
        .client
        .post(server.url("/v1/runs"))
        .json(&submission)
        .send()
        .await
        .expect("request failed");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = anonymous.json().await.expect("invalid json");
    assert_eq!(body["message"], "Not signed in");

    // A session without a linked runner profile cannot submit.
    let unlinked = server
        .client
        .post(server.url("/v1/runs"))
        .header(reqwest::header::COOKIE, &unlinked_cookie)
        .json(&submission)
        .send()
        .await
        .expect("request failed");
    assert_eq!(unlinked.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = unlinked.json().await.expect("invalid json");
    assert_eq!(body["message"], "No runner profile");

    let garbage = server
        .client
        .post(server.url("/v1/runs"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .body("not json")
        .send()
        .await
        .expect("request failed");
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);

    let unknown_game = server
        .client
        .post(server.url("/v1/runs"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .json(&serde_json::json!({ "game_id": "nope", "category_slug": "any-percent" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(unknown_game.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = unknown_game.json().await.expect("invalid json");
    assert_eq!(body["message"], "Unknown game");

    let unknown_category = server
        .client
        .post(server.url("/v1/runs"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .json(&serde_json::json!({ "game_id": "hollow-knight", "category_slug": "nope" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(unknown_category.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = unknown_category.json().await.expect("invalid json");
    assert_eq!(body["message"], "Unknown category");

    let accepted = server
        .client
        .post(server.url("/v1/runs"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .json(&submission)
        .send()
        .await
        .expect("request failed");
    assert_eq!(accepted.status(), StatusCode::OK);
    let body: serde_json::Value = accepted.json().await.expect("invalid json");
    assert_eq!(body["ok"], true);

    // The new submission joins the seeded pending run in the queue,
    // filed under the signed in runner.
    let pending = server
        .client
        .get(server.url("/v1/admin/runs"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .send()
        .await
        .expect("request failed");
    assert_eq!(pending.status(), StatusCode::OK);
    let body: serde_json::Value = pending.json().await.expect("invalid json");
    let runs = body["runs"].as_array().expect("not an array");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["runner_id"], "knightslayer");
    assert_eq!(runs[0]["video_url"], "https://youtu.be/new-run");
    assert_eq!(runs[0]["status"], "pending");

    // And it stays off the public leaderboard.
    let board = server
        .get_json("/v1/games/hollow-knight/runs/full-runs/any-percent", StatusCode::OK)
        .await;
    assert_eq!(board["runs"].as_array().expect("not an array").len(), 1);

    // The seeded claim already covers this triple, so the repeat is a
    // no-op.
    let duplicate = server
        .client
        .post(server.url("/v1/achievements"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .json(&serde_json::json!({
            "game_id": "hollow-knight",
            "achievement_slug": "steel-soul",
            "date_completed": "2024-06-01",
            "proof_url": "https://youtu.be/proof2",
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(duplicate.status(), StatusCode::OK);
    let body: serde_json::Value = duplicate.json().await.expect("invalid json");
    assert_eq!(body["ok"], true);
    assert_eq!(body["inserted"], false);

    let unknown_achievement = server
        .client
        .post(server.url("/v1/achievements"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .json(&serde_json::json!({
            "game_id": "hollow-knight",
            "achievement_slug": "nope",
            "date_completed": "2024-06-01",
            "proof_url": "https://youtu.be/proof3",
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(unknown_achievement.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = unknown_achievement.json().await.expect("invalid json");
    assert_eq!(body["message"], "Unknown achievement");

    // Moderation endpoints: 401 signed out, 403 without the admin flag.
    let signed_out = server.get_json("/v1/admin/games", StatusCode::UNAUTHORIZED).await;
    assert_eq!(signed_out["message"], "Not signed in");

    let not_admin = server
        .client
        .get(server.url("/v1/admin/games"))
        .header(reqwest::header::COOKIE, &unlinked_cookie)
        .send()
        .await
        .expect("request failed");
    assert_eq!(not_admin.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = not_admin.json().await.expect("invalid json");
    assert_eq!(body["message"], "Admin access required");

    // Admins see drafts.
    let all_games = server
        .client
        .get(server.url("/v1/admin/games"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .send()
        .await
        .expect("request failed");
    let body: serde_json::Value = all_games.json().await.expect("invalid json");
    let games = body["games"].as_array().expect("not an array");
    assert_eq!(games.len(), 3);
    assert!(games.iter().any(|g| g["game_id"] == "wip-game"));

    let claims = server
        .client
        .get(server.url("/v1/admin/achievements"))
        .header(reqwest::header::COOKIE, &admin_cookie)
        .send()
        .await
        .expect("request failed");
    let body: serde_json::Value = claims.json().await.expect("invalid json");
    assert!(body["achievements"].as_array().expect("not an array").is_empty());

    server.shutdown().await;
}
