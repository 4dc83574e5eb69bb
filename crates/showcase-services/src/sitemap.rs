//! sitemap.xml and robots.txt
//!
//! The sitemap is rebuilt wholesale on every structural change: one entry per
//! static page plus one per division.

use chrono::{DateTime, NaiveDate, Utc};
use showcase_core::constants::{CACHE_KEY_SITEMAP, DIVISION_PAGE_PREFIX};
use showcase_core::models::Division;
use showcase_core::AppError;
use showcase_db::ContentRepository;
use showcase_infra::Cache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Static pages: (path, changefreq, priority)
const STATIC_PAGES: [(&str, &str, &str); 5] = [
    ("/", "daily", "1.0"),
    ("/about", "monthly", "0.8"),
    (DIVISION_PAGE_PREFIX, "weekly", "0.9"),
    ("/milestones", "monthly", "0.6"),
    ("/contact", "yearly", "0.5"),
];

const DIVISION_CHANGEFREQ: &str = "weekly";
const DIVISION_PRIORITY: &str = "0.8";

pub struct SitemapGenerator {
    content: Arc<dyn ContentRepository>,
    cache: Arc<dyn Cache>,
    base_url: String,
    output_path: PathBuf,
    cache_ttl: Duration,
}

impl SitemapGenerator {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        cache: Arc<dyn Cache>,
        base_url: impl Into<String>,
        output_path: impl Into<PathBuf>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            content,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            output_path: output_path.into(),
            cache_ttl,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Current sitemap XML built from the divisions in the database.
    pub async fn build(&self) -> Result<String, AppError> {
        let divisions = self.content.list_divisions().await?;
        Ok(render_sitemap(&self.base_url, &divisions, Utc::now()))
    }

    /// Rebuild the sitemap, replace the file on disk and refresh `sitemap:xml`.
    #[tracing::instrument(skip(self), fields(path = %self.output_path.display()))]
    pub async fn regenerate(&self) -> Result<String, AppError> {
        let xml = self.build().await?;
        write_atomic(&self.output_path, xml.as_bytes()).await?;

        if let Err(e) = self
            .cache
            .set(CACHE_KEY_SITEMAP, xml.clone(), self.cache_ttl)
            .await
        {
            tracing::warn!(error = %e, "Failed to cache sitemap");
        }

        tracing::info!(bytes = xml.len(), "Sitemap regenerated");
        Ok(xml)
    }
}

pub fn render_sitemap(base_url: &str, divisions: &[Division], generated_at: DateTime<Utc>) -> String {
    let today = generated_at.date_naive();
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for (path, changefreq, priority) in STATIC_PAGES {
        push_url(&mut xml, &format!("{}{}", base_url, path), today, changefreq, priority);
    }

    for division in divisions {
        push_url(
            &mut xml,
            &format!("{}{}/{}", base_url, DIVISION_PAGE_PREFIX, division.slug),
            division.updated_at.date_naive(),
            DIVISION_CHANGEFREQ,
            DIVISION_PRIORITY,
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: NaiveDate, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(loc)));
    xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod.format("%Y-%m-%d")));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
    xml.push_str(&format!("    <priority>{}</priority>\n", priority));
    xml.push_str("  </url>\n");
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// robots.txt for the public site.
pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api/admin\n\nSitemap: {}/sitemap.xml\n",
        base_url.trim_end_matches('/')
    )
}

/// Write to a sibling temp file, then rename over the target so readers never
/// see a half-written file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("sitemap.xml");
    let tmp = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use showcase_db::{DivisionRecord, InMemoryContentRepository};
    use showcase_infra::InMemoryCache;

    fn division(slug: &str, updated_at: DateTime<Utc>) -> Division {
        Division {
            id: Uuid::new_v4(),
            name: slug.to_string(),
            slug: slug.to_string(),
            summary: None,
            description: None,
            position: 0,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn test_render_lists_static_pages_and_divisions() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 0).unwrap();
        let xml = render_sitemap("https://example.com", &[division("mining", at)], at);

        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/contact</loc>"));
        assert!(xml.contains("<loc>https://example.com/line-of-business/mining</loc>"));
        assert!(xml.contains("<lastmod>2026-03-14</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), STATIC_PAGES.len() + 1);
    }

    #[test]
    fn test_locations_are_escaped() {
        let at = Utc::now();
        let xml = render_sitemap("https://example.com/?a=1&b=2", &[], at);
        assert!(xml.contains("https://example.com/?a=1&amp;b=2"));
    }

    #[test]
    fn test_robots_points_at_sitemap() {
        let robots = robots_txt("https://example.com/");
        assert!(robots.contains("Disallow: /admin\n"));
        assert!(robots.contains("Disallow: /api/admin\n"));
        assert!(robots.ends_with("Sitemap: https://example.com/sitemap.xml\n"));
    }

    #[tokio::test]
    async fn test_regenerate_writes_file_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let content = Arc::new(InMemoryContentRepository::new());
        let cache = Arc::new(InMemoryCache::new(16));
        content
            .insert_division(DivisionRecord {
                name: "Energy".to_string(),
                slug: "energy".to_string(),
                summary: None,
                description: None,
                position: 0,
            })
            .await
            .unwrap();

        let generator = SitemapGenerator::new(
            content,
            cache.clone(),
            "https://example.com",
            dir.path().join("public/sitemap.xml"),
            Duration::from_secs(60),
        );
        let xml = generator.regenerate().await.unwrap();

        let on_disk = std::fs::read_to_string(generator.output_path()).unwrap();
        assert_eq!(on_disk, xml);
        assert!(cache.contains(CACHE_KEY_SITEMAP));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("public"))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
