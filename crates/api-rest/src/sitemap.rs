//! `sitemap.xml` and `robots.txt`.

use crate::AppState;
use axum::{extract::State, http::header, response::IntoResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use nexus_gateway::StorySummary;
use maud::{html, PreEscaped};

/// One `<url>` entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: &'static str,
    pub priority: f32,
}

/// The site root followed by every listed story that is a standalone page.
///
/// `home` is the root itself and `settings*` stories hold configuration, so both are skipped.
pub fn sitemap_entries(
    site_url: &str,
    now: DateTime<Utc>,
    stories: &[StorySummary],
) -> Vec<SitemapEntry> {
    let root = SitemapEntry {
        loc: site_url.to_string(),
        lastmod: Some(now),
        changefreq: "weekly",
        priority: 1.0,
    };

    std::iter::once(root)
        .chain(
            stories
                .iter()
                .filter(|s| s.full_slug != "home" && !s.full_slug.starts_with("settings"))
                .map(|s| SitemapEntry {
                    loc: format!("{site_url}/{}", s.full_slug),
                    lastmod: s.published_at,
                    changefreq: "weekly",
                    priority: 0.8,
                }),
        )
        .collect()
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Renders the `<urlset>` document. Locations are escaped by maud.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    html! {
        (PreEscaped(XML_DECLARATION))
        urlset xmlns=(SITEMAP_NS) {
            @for entry in entries {
                url {
                    loc { (entry.loc) }
                    @if let Some(modified) = entry.lastmod {
                        lastmod { (modified.to_rfc3339_opts(SecondsFormat::Secs, true)) }
                    }
                    changefreq { (entry.changefreq) }
                    priority { (format!("{:.1}", entry.priority)) }
                }
            }
        }
    }
    .into_string()
}

pub fn render_robots(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\nDisallow: /api/draft/\nDisallow: /api/webhooks/\n\nSitemap: {site_url}/sitemap.xml\n"
    )
}

#[utoipa::path(
    get,
    path = "/sitemap.xml",
    responses(
        (status = 200, description = "XML sitemap", content_type = "application/xml", body = String)
    )
)]
/// Lists every published page. If the CMS listing fails only the site root is returned.
#[axum::debug_handler]
pub async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    // The listing failure is already logged by the content service.
    let stories = state.content.list_page_stories().await.unwrap_or_default();
    let entries = sitemap_entries(state.cfg.site_url(), Utc::now(), &stories);

    (
        [(header::CONTENT_TYPE, "application/xml")],
        render_sitemap(&entries),
    )
}

#[utoipa::path(
    get,
    path = "/robots.txt",
    responses(
        (status = 200, description = "Crawler rules", content_type = "text/plain", body = String)
    )
)]
#[axum::debug_handler]
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(state.cfg.site_url()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;
    use crate::test_support::{app, body_bytes, state_for, unreachable_cms};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use nexus_schema::FallbackPolicy;
    use tower::ServiceExt;

    fn summary(full_slug: &str, published_at: Option<&str>) -> StorySummary {
        StorySummary {
            id: 1,
            name: full_slug.into(),
            slug: full_slug.into(),
            full_slug: full_slug.into(),
            published_at: published_at.map(|t| t.parse().expect("timestamp")),
            is_startpage: false,
        }
    }

    #[test]
    fn home_and_settings_stories_are_excluded() {
        let now: DateTime<Utc> = "2025-03-01T00:00:00Z".parse().expect("now");
        let stories = vec![
            summary("home", None),
            summary("settings", None),
            summary("settings/footer", None),
            summary("pipeline", Some("2025-02-01T08:00:00Z")),
            summary("about/investors", None),
        ];

        let entries = sitemap_entries("https://nexusbio.com", now, &stories);
        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "https://nexusbio.com",
                "https://nexusbio.com/pipeline",
                "https://nexusbio.com/about/investors"
            ]
        );
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[0].lastmod, Some(now));
        assert_eq!(entries[1].priority, 0.8);
        assert_eq!(entries[1].lastmod, stories[3].published_at);
        assert_eq!(entries[2].lastmod, None);
    }

    #[test]
    fn rendered_sitemap_escapes_locations() {
        let xml = render_sitemap(&[SitemapEntry {
            loc: "https://nexusbio.com/r&d".into(),
            lastmod: None,
            changefreq: "weekly",
            priority: 0.8,
        }]);
        assert!(xml.contains("<loc>https://nexusbio.com/r&amp;d</loc>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(!xml.contains("<lastmod>"));
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
    }

    #[tokio::test]
    async fn sitemap_route_lists_cms_pages() {
        let response = app()
            .await
            .oneshot(Request::get("/sitemap.xml").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml"
        );

        let xml = String::from_utf8(body_bytes(response).await).expect("utf-8");
        assert!(xml.contains("<loc>https://nexusbio.example/pipeline</loc>"));
        assert!(xml.contains("<lastmod>2025-02-01T08:00:00Z</lastmod>"));
        assert!(xml.contains("<loc>https://nexusbio.example/about/investors</loc>"));
        assert!(!xml.contains("settings-legacy"));
        assert!(!xml.contains("https://nexusbio.example/home"));
    }

    #[tokio::test]
    async fn sitemap_falls_back_to_root_when_cms_is_down() {
        let app = router(state_for(&unreachable_cms().await, FallbackPolicy::Lenient));
        let response = app
            .oneshot(Request::get("/sitemap.xml").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let xml = String::from_utf8(body_bytes(response).await).expect("utf-8");
        assert_eq!(xml.matches("<url>").count(), 1);
        assert!(xml.contains("<loc>https://nexusbio.example</loc>"));
    }

    #[test]
    fn robots_points_at_the_sitemap() {
        let robots = render_robots("https://nexusbio.com");
        assert!(robots.contains("Disallow: /api/\n"));
        assert!(robots.ends_with("Sitemap: https://nexusbio.com/sitemap.xml\n"));
    }
}
