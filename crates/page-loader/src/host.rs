//! Script-loading capability supplied by the host environment.
//!
//! The loader never talks to the network or the document itself; it asks a
//! `ScriptHost` to fetch and execute a script by locator. Completion is
//! asymmetric by design: the host only reports delivery failures, while
//! success is reported out of band by the loaded script calling
//! [`PageLoader::register_page`](crate::PageLoader::register_page) once it
//! has finished defining itself.

use async_trait::async_trait;
use std::sync::Arc;

/// Host capability that fetches and executes a page script.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Fetch and execute the script at `src`.
    ///
    /// `Ok(())` means the script was delivered for execution; it does not
    /// mean the page is loaded. An `Err` is a transport-level failure and
    /// causes the loader to fail every waiter for the route.
    async fn inject(&self, src: &str) -> anyhow::Result<()>;
}

/// Wrapper to make any ScriptHost into an `Arc<dyn ScriptHost>`.
pub type DynScriptHost = Arc<dyn ScriptHost>;
