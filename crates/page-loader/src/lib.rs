//! Page Loader - load-once page script cache for a web application runtime.
//!
//! Given a route, the loader fetches the corresponding page script at most
//! once, caches the outcome (artifact or error), and fans completion out to
//! every concurrent waiter for that route. Script fetching itself is a
//! capability injected by the host environment; loaded scripts report their
//! own success by calling back into [`PageLoader::register_page`].
//!
//! # Example
//!
//! ```rust,ignore
//! use page_loader::{PageLoader, ScriptHost};
//! use std::sync::Arc;
//!
//! let loader: PageLoader<Page> = PageLoader::new(build_id, Arc::new(DocumentHost));
//!
//! // Concurrent requests for one route share a single script fetch.
//! let page = loader.load_page("/about").await?;
//!
//! // The loaded script settles them by registering itself:
//! // loader.register_page("/about", None, Some(page));
//! ```

pub mod error;
pub mod host;
pub mod loader;
pub mod route;

// Re-export commonly used types
pub use error::{LoaderError, Result};
pub use host::{DynScriptHost, ScriptHost};
pub use loader::PageLoader;
pub use route::{normalize_route, page_script_url, SCRIPT_PREFIX};
