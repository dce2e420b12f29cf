//! HTML helpers: anchor extraction, domain matching and meta tags.

use scraper::{Html, Selector};
use url::Url;

/// Absolute http(s) links of every `a[href]` in document order.
///
/// Relative hrefs are resolved against `base_url`. Fragment-only and
/// non-navigable hrefs (`javascript:`, `mailto:`, `tel:`, `data:`) are skipped.
/// Duplicates are kept.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };
    let anchor_selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for element in document.select(&anchor_selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
        {
            continue;
        }

        let resolved = match base.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        links.push(resolved.to_string());
    }

    links
}

/// Second-level suffixes under which registrations sit one label deeper.
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "com.au", "net.au", "org.au", "co.nz", "co.za", "com.br",
    "co.jp", "co.in", "com.mx",
];

/// `help.instagram.com` → `instagram.com`, `shop.example.co.uk` → `example.co.uk`.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 3 {
        return host;
    }

    let suffix = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_PART_SUFFIXES.contains(&suffix.as_str()) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

/// Whether `host` is `domain` or one of its subdomains.
pub fn host_within(host: &str, domain: &str) -> bool {
    let host = host.to_lowercase();
    let domain = domain.trim_start_matches('.').to_lowercase();
    !domain.is_empty() && (host == domain || host.ends_with(&format!(".{}", domain)))
}

/// Open Graph data and `<title>` of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Read `og:title`, `og:description` and `og:image`, falling back to
/// `<title>` and `meta[name=description]`.
pub fn extract_meta(html: &str) -> PageMeta {
    let document = Html::parse_document(html);

    let meta_content = |selector: &str| -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty())
    };

    let title = meta_content(r#"meta[property="og:title"]"#).or_else(|| {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });
    let description = meta_content(r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(r#"meta[name="description"]"#));
    let image = meta_content(r#"meta[property="og:image"]"#);

    PageMeta {
        title,
        description,
        image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_resolves_relative() {
        let html = r#"
            <a href="/about">About</a>
            <a href="https://onlyfans.com/alice">OF</a>
            <a href="next">Next</a>
        "#;
        let links = extract_links(html, "https://linktr.ee/alice/");
        assert_eq!(
            links,
            vec![
                "https://linktr.ee/about",
                "https://onlyfans.com/alice",
                "https://linktr.ee/alice/next",
            ]
        );
    }

    #[test]
    fn test_extract_links_skips_non_navigable() {
        let html = r##"
            <a href="#top">Top</a>
            <a href="mailto:me@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="tel:123">Call</a>
            <a href="ftp://files.example.com/x">FTP</a>
            <a>No href</a>
            <a href="https://example.com/ok">OK</a>
        "##;
        assert_eq!(
            extract_links(html, "https://example.com/"),
            vec!["https://example.com/ok"]
        );
    }

    #[test]
    fn test_extract_links_keeps_duplicates_and_order() {
        let html = r#"<a href="https://a.example/">1</a><a href="https://b.example/">2</a><a href="https://a.example/">3</a>"#;
        assert_eq!(
            extract_links(html, "https://x.example/"),
            vec!["https://a.example/", "https://b.example/", "https://a.example/"]
        );
    }

    #[test]
    fn test_extract_links_bad_base() {
        assert!(extract_links(r#"<a href="/x">x</a>"#, "not a url").is_empty());
    }

    #[test]
    fn test_extract_meta() {
        let html = r#"
            <html><head>
              <title>Fallback</title>
              <meta property="og:title" content="Jane Doe (@jane) • Instagram photos and videos">
              <meta property="og:description" content="Exclusive content 🔥">
              <meta property="og:image" content="https://cdn.example/jane.jpg">
            </head></html>
        "#;
        let meta = extract_meta(html);
        assert_eq!(
            meta.title.as_deref(),
            Some("Jane Doe (@jane) • Instagram photos and videos")
        );
        assert_eq!(meta.description.as_deref(), Some("Exclusive content 🔥"));
        assert_eq!(meta.image.as_deref(), Some("https://cdn.example/jane.jpg"));
    }

    #[test]
    fn test_extract_meta_fallbacks() {
        let html = r#"<html><head><title> Plain </title><meta name="description" content="bio"></head></html>"#;
        let meta = extract_meta(html);
        assert_eq!(meta.title.as_deref(), Some("Plain"));
        assert_eq!(meta.description.as_deref(), Some("bio"));
        assert_eq!(meta.image, None);
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("help.instagram.com"), "instagram.com");
        assert_eq!(registrable_domain("www.instagram.com"), "instagram.com");
        assert_eq!(registrable_domain("instagram.com"), "instagram.com");
        assert_eq!(registrable_domain("Shop.Example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }

    #[test]
    fn test_host_within() {
        assert!(host_within("developers.facebook.com", "facebook.com"));
        assert!(host_within("facebook.com", "facebook.com"));
        assert!(!host_within("notfacebook.com", "facebook.com"));
        assert!(!host_within("facebook.com", ""));
    }
}
