//! Interactive keyword browsing.
//!
//! A [`SelectorSession`] turns pointer clicks on a rendered word layout into
//! keyword lookups: the pixel colour under the click identifies the keyword,
//! a random record under that keyword is featured and its link opened.

mod link;
mod opener;
mod session;

pub use link::{DOI_RESOLVER_BASE, LinkConfig, SEARCH_BASE, featured_link, search_query};
pub use opener::{LinkOpener, LogOnly, SystemBrowser};
pub use session::{
    EventOutcome, IgnoreReason, ListingLine, PointerEvent, Selection, SelectionMode,
    SelectorSession, SessionState,
};

/// A rendered surface that can tell which keyword owns a pixel.
pub trait ColorResolver {
    /// Image size in pixels as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Keyword drawn at `(x, y)`, or `None` for background and unmapped colours.
    /// Coordinates are assumed to be inside [`ColorResolver::dimensions`].
    fn resolve_color_at(&self, x: u32, y: u32) -> Option<&str>;
}
