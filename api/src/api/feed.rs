use chrono::NaiveTime;
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};

use super::error::Result;
use super::ext::RequestExt as _;
use crate::database::Post;

/// RSS feed of the 20 newest posts.
pub async fn serve(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let xml = render(&global.config.site_url, global.site.posts());

    Ok(xml_response(xml))
}

pub fn render(site_url: &str, posts: &[Post]) -> String {
    let mut items = String::new();

    for post in posts.iter().take(20) {
        let link = format!("{}/news/{}", site_url, post.slug);
        let pub_date = post.date.and_time(NaiveTime::MIN).and_utc().to_rfc2822();

        let excerpt = post
            .excerpt
            .clone()
            .or_else(|| post.description.clone())
            .unwrap_or_else(|| strip_markup(&post.content, 200));

        items.push_str("    <item>\n");
        items.push_str(&format!("      <title><![CDATA[{}]]></title>\n", post.title));
        items.push_str(&format!("      <link>{}</link>\n", link));
        items.push_str(&format!("      <guid isPermaLink=\"true\">{}</guid>\n", link));
        items.push_str(&format!("      <pubDate>{}</pubDate>\n", pub_date));

        if !excerpt.is_empty() {
            items.push_str(&format!("      <description><![CDATA[{}]]></description>\n", excerpt));
        }

        if let Some(author) = &post.author {
            items.push_str(&format!("      <author><![CDATA[{}]]></author>\n", author));
        }

        items.push_str("    </item>\n");
    }

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n");
    xml.push_str("  <channel>\n");
    xml.push_str("    <title>Challenge Run Community</title>\n");
    xml.push_str(&format!("    <link>{}</link>\n", site_url));
    xml.push_str("    <description>News and updates from the Challenge Run Community</description>\n");
    xml.push_str("    <language>en</language>\n");
    xml.push_str(&items);
    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

pub(super) fn xml_response(xml: String) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/xml")
        .header(CACHE_CONTROL, "max-age=3600")
        .body(Body::from(xml))
        .expect("failed to build response")
}

/// Rough plain-text rendering of a markdown body for feed descriptions.
/// Drops HTML tags and markdown syntax characters, then cuts at the
/// limit.
fn strip_markup(content: &str, limit: usize) -> String {
    let mut out = String::with_capacity(limit);
    let mut count = 0;
    let mut in_tag = false;

    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            '#' | '*' | '_' | '`' | '~' => {}
            c if !in_tag => {
                out.push(c);
                count += 1;

                if count >= limit {
                    break;
                }
            }
            _ => {}
        }
    }

    out.trim().to_owned()
}
