use hyper::{Body, Request, Response};

use super::error::Result;
use super::ext::RequestExt as _;
use super::feed::xml_response;
use crate::database::{Game, Post, Runner, Team};

const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("", "1.0", "daily"),
    ("/games", "0.9", "daily"),
    ("/runners", "0.8", "weekly"),
    ("/teams", "0.7", "weekly"),
    ("/news", "0.7", "weekly"),
    ("/search", "0.5", "monthly"),
    ("/submit", "0.4", "monthly"),
    ("/submit-game", "0.4", "monthly"),
    ("/rules", "0.5", "monthly"),
    ("/guidelines", "0.5", "monthly"),
    ("/glossary", "0.5", "monthly"),
    ("/support", "0.4", "monthly"),
    ("/legal/terms", "0.3", "yearly"),
    ("/legal/privacy", "0.3", "yearly"),
    ("/legal/cookies", "0.3", "yearly"),
];

/// Sitemap covering the static pages plus every game (with its runs and
/// rules subpages), listed runner, team and post.
pub async fn serve(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let (games, runners, teams) = tokio::join!(
        global.content.active_games(),
        global.content.runners(),
        global.content.teams(),
    );

    let xml = render(&global.config.site_url, &games, &runners, &teams, global.site.posts());

    Ok(xml_response(xml))
}

pub fn render(site_url: &str, games: &[Game], runners: &[Runner], teams: &[Team], posts: &[Post]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for (path, priority, changefreq) in STATIC_PAGES {
        push_url(&mut xml, &format!("{}{}", site_url, path), priority, changefreq, None);
    }

    for game in games {
        let lastmod = game.updated_at.map(|at| at.format("%Y-%m-%d").to_string());
        let base = format!("{}/games/{}", site_url, game.game_id);

        push_url(&mut xml, &base, "0.8", "weekly", lastmod.clone());
        push_url(&mut xml, &format!("{}/runs", base), "0.8", "daily", lastmod.clone());
        push_url(&mut xml, &format!("{}/rules", base), "0.6", "monthly", lastmod);
    }

    for runner in runners.iter().filter(|r| r.is_listed()) {
        let lastmod = runner.updated_at.map(|at| at.format("%Y-%m-%d").to_string());
        push_url(
            &mut xml,
            &format!("{}/runners/{}", site_url, runner.runner_id),
            "0.6",
            "weekly",
            lastmod,
        );
    }

    for team in teams {
        push_url(&mut xml, &format!("{}/teams/{}", site_url, team.team_id), "0.5", "monthly", None);
    }

    for post in posts {
        push_url(
            &mut xml,
            &format!("{}/news/{}", site_url, post.slug),
            "0.6",
            "monthly",
            Some(post.date.format("%Y-%m-%d").to_string()),
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, priority: &str, changefreq: &str, lastmod: Option<String>) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", loc));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
    xml.push_str(&format!("    <priority>{}</priority>\n", priority));

    if let Some(lastmod) = lastmod {
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
    }

    xml.push_str("  </url>\n");
}
