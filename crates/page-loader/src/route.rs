//! Route normalization and page script locators.
//!
//! Every entry point normalizes its route before touching loader state, so
//! equivalent spellings of a route always map to one cache key.

use crate::error::{LoaderError, Result};

/// URL prefix under which page scripts are served.
pub const SCRIPT_PREFIX: &str = "_app";

/// Normalize a route into its canonical cache-key form.
///
/// A route must start with `/`. A trailing `index` is stripped, so
/// `/about/index` and `/about/` share one key.
pub fn normalize_route(route: &str) -> Result<String> {
    if !route.starts_with('/') {
        return Err(LoaderError::InvalidRoute {
            route: route.to_string(),
        });
    }

    Ok(route.strip_suffix("index").unwrap_or(route).to_string())
}

/// Build the locator for a page script.
///
/// Format: `/<prefix>/<percent-encoded build id>/page<route>`. The build id
/// is percent-encoded; the route is expected to already be normalized and is
/// appended verbatim.
pub fn page_script_url(build_id: &str, route: &str) -> String {
    format!(
        "/{}/{}/page{}",
        SCRIPT_PREFIX,
        urlencoding::encode(build_id),
        route
    )
}
