//! Route parsing for deep links.
//!
//! The routing collaborator owns history and URL construction; this module
//! only reads a path (or full URL) into a [`Route`] and extracts the external
//! category value from it.

use url::Url;

/// Base used to resolve bare paths like `/explore?category=viral`.
const LINK_BASE: &str = "https://nami.video/";

/// Pages of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Explore feed, optionally focused on a category via `?category=`.
    Explore { category: Option<String> },
    Video { id: Option<u64> },
    Edit,
    Tools { tool: Option<String> },
    Category { slug: String },
    Remix { title: Option<String> },
    Account,
    NotFound,
}

impl Route {
    /// Parse a path or absolute URL. Unparseable input maps to `NotFound`.
    pub fn parse(link: &str) -> Self {
        let base = match Url::parse(LINK_BASE) {
            Ok(base) => base,
            Err(_) => return Self::NotFound,
        };
        let url = match base.join(link.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(link = %link, error = %e, "Unparseable deep link");
                return Self::NotFound;
            }
        };

        let query = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] | ["explore"] => Self::Explore {
                category: query("category"),
            },
            ["video"] => Self::Video { id: None },
            ["video", id] => match id.parse() {
                Ok(id) => Self::Video { id: Some(id) },
                Err(_) => Self::NotFound,
            },
            ["edit"] => Self::Edit,
            ["tools"] => Self::Tools { tool: None },
            ["tools", tool] => Self::Tools {
                tool: Some((*tool).to_string()),
            },
            ["category", slug] => Self::Category {
                slug: (*slug).to_string(),
            },
            ["remix"] => Self::Remix {
                title: query("title"),
            },
            ["account"] => Self::Account,
            _ => Self::NotFound,
        }
    }

    /// Category injected by this route, if any.
    pub fn external_category(&self) -> Option<&str> {
        match self {
            Self::Explore { category } => category.as_deref(),
            Self::Category { slug } => Some(slug),
            _ => None,
        }
    }

    /// Path the router should navigate to after a tab click.
    pub fn explore_with_category(slug: &str) -> String {
        let mut url = match Url::parse(LINK_BASE).and_then(|b| b.join("explore")) {
            Ok(url) => url,
            Err(_) => return format!("/explore?category={slug}"),
        };
        url.query_pairs_mut().append_pair("category", slug);
        match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        }
    }
}
