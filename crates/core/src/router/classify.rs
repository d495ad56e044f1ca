//! Request classification by URL shape.
//!
//! Checks run in a fixed order and the first match wins:
//! image suffix, then static asset marker, then navigable page, else other.

use serde::{Deserialize, Serialize};
use std::fmt;

const IMAGE_EXTENSIONS: &[&str] = &[".webp", ".png", ".jpg", ".jpeg"];

const STATIC_MARKERS: &[&str] = &["/css/", "/js/", "/fonts/", ".woff", ".woff2"];

/// Which strategy family a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Image,
    StaticAsset,
    HtmlPage,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::StaticAsset => "static-asset",
            Category::HtmlPage => "html-page",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a URL string. Total and pure.
///
/// Matching is plain substring/suffix matching on the string as given, so an
/// extensionless path counts as a page only when the whole URL has no `.` and
/// no `api` anywhere (host included).
pub fn classify(url: &str) -> Category {
    if is_image(url) {
        Category::Image
    } else if is_static_asset(url) {
        Category::StaticAsset
    } else if is_html_page(url) {
        Category::HtmlPage
    } else {
        Category::Other
    }
}

fn is_image(url: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| url.contains(ext))
}

fn is_static_asset(url: &str) -> bool {
    STATIC_MARKERS.iter().any(|marker| url.contains(marker))
}

fn is_html_page(url: &str) -> bool {
    url.ends_with(".html") || (!url.contains('.') && !url.contains("api"))
}
