use crate::api::sitemap;
use crate::database::{Game, Post, Runner, Team};

#[test]
fn test_sitemap_sections() {
    let games = vec![Game {
        game_id: "hollow-knight".to_owned(),
        game_name: "Hollow Knight".to_owned(),
        updated_at: Some("2024-05-01T12:00:00Z".parse().expect("bad timestamp")),
        ..Default::default()
    }];

    let runners = vec![
        Runner {
            runner_id: "knightslayer".to_owned(),
            runner_name: "KnightSlayer".to_owned(),
            updated_at: Some("2024-04-20T08:00:00Z".parse().expect("bad timestamp")),
            ..Default::default()
        },
        Runner {
            runner_id: "shade".to_owned(),
            runner_name: "Shade".to_owned(),
            hidden: Some(true),
            ..Default::default()
        },
        Runner {
            runner_id: "fixture".to_owned(),
            runner_name: "Fixture".to_owned(),
            status: Some("test".to_owned()),
            ..Default::default()
        },
    ];

    let teams = vec![Team {
        team_id: "team-cherry".to_owned(),
        name: "Team Cherry".to_owned(),
        ..Default::default()
    }];

    let posts = vec![Post {
        title: "Welcome".to_owned(),
        slug: "welcome".to_owned(),
        date: "2024-01-10".parse().expect("bad date"),
        ..Default::default()
    }];

    let xml = sitemap::render("https://crc.example", &games, &runners, &teams, &posts);

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
    assert!(xml.ends_with("</urlset>\n"));

    // Static pages.
    assert!(xml.contains("<loc>https://crc.example</loc>"));
    assert!(xml.contains("<loc>https://crc.example/games</loc>"));
    assert!(xml.contains("<loc>https://crc.example/submit</loc>"));
    assert!(xml.contains("<loc>https://crc.example/legal/privacy</loc>"));

    // Each game gets its page plus the runs and rules subpages, all
    // stamped with the game's update date.
    assert!(xml.contains("<loc>https://crc.example/games/hollow-knight</loc>"));
    assert!(xml.contains("<loc>https://crc.example/games/hollow-knight/runs</loc>"));
    assert!(xml.contains("<loc>https://crc.example/games/hollow-knight/rules</loc>"));
    assert_eq!(xml.matches("<lastmod>2024-05-01</lastmod>").count(), 3);

    assert!(xml.contains("<changefreq>daily</changefreq>"));
    assert!(xml.contains("<priority>1.0</priority>"));

    // Hidden and fixture profiles stay out of the sitemap.
    assert!(xml.contains("<loc>https://crc.example/runners/knightslayer</loc>"));
    assert!(xml.contains("<lastmod>2024-04-20</lastmod>"));
    assert!(!xml.contains("shade"));
    assert!(!xml.contains("fixture"));

    assert!(xml.contains("<loc>https://crc.example/teams/team-cherry</loc>"));

    assert!(xml.contains("<loc>https://crc.example/news/welcome</loc>"));
    assert!(xml.contains("<lastmod>2024-01-10</lastmod>"));
}

#[test]
fn test_sitemap_empty_content() {
    let xml = sitemap::render("https://crc.example", &[], &[], &[], &[]);

    // Still a valid sitemap with the static pages.
    assert_eq!(xml.matches("<url>").count(), 15);
}
