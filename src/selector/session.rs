//! Click-driven browsing session over a keyword map.

use std::fmt;

use rand::Rng;
use rand::seq::IteratorRandom;
use tracing::{debug, instrument, warn};
use url::Url;

use super::ColorResolver;
use super::link::{LinkConfig, featured_link};
use super::opener::LinkOpener;
use crate::keywords::KeywordMap;
use crate::record::Record;

/// What happens to a featured record after it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Open a random record; the keyword map is left as is.
    Open,
    /// Open a random record and drop it from that keyword's set.
    Pop,
}

/// Input events from the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer click in image coordinates (pixels, fractional allowed).
    Click { x: f64, y: f64 },
    /// The visualization window was closed.
    Close,
}

/// Session lifecycle. A click resolves and returns to `Idle` within one
/// `handle_event` call; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Closed,
}

/// Why a click produced no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Rounded coordinates fall outside the image.
    OutOfBounds,
    /// The pixel colour belongs to no keyword (background or glyph edge).
    Unmapped,
    /// The session was already closed.
    SessionClosed,
}

/// One record line in a selection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub index: usize,
    pub featured: bool,
    pub author: String,
    pub title: String,
}

impl fmt::Display for ListingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.featured { "* " } else { "  " };
        write!(f, "{prefix}{} - {}", self.author, self.title)
    }
}

/// Result of a click that resolved to a keyword with records left.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub keyword: String,
    /// Index of the randomly chosen record.
    pub featured: usize,
    /// Every record under the keyword at click time, in record order.
    pub listing: Vec<ListingLine>,
    /// Link handed to the opener, if one could be built.
    pub link: Option<Url>,
    /// Records left under the keyword after this click.
    pub remaining: usize,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, &self.keyword)?;
        for line in &self.listing {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn write_header(f: &mut fmt::Formatter<'_>, keyword: &str) -> fmt::Result {
    let header = format!("Articles about {keyword}");
    writeln!(f, "{header}")?;
    writeln!(f, "{}", "-".repeat(header.chars().count()))
}

/// Outcome of one [`SelectorSession::handle_event`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Ignored(IgnoreReason),
    /// The keyword resolved but every record was already popped.
    Exhausted { keyword: String },
    Selected(Selection),
    Closed,
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selected(selection) => fmt::Display::fmt(selection, f),
            Self::Exhausted { keyword } => {
                write_header(f, keyword)?;
                writeln!(f, "No more articles to open")
            }
            Self::Ignored(_) | Self::Closed => Ok(()),
        }
    }
}

/// Interactive selector: maps clicks to keywords, keywords to records.
///
/// The session owns the keyword map; in [`SelectionMode::Pop`] it is the only
/// writer. Events are handled one at a time to completion.
pub struct SelectorSession<'a, R, O> {
    records: &'a [Record],
    keywords: KeywordMap,
    mode: SelectionMode,
    links: LinkConfig,
    rng: R,
    opener: O,
    state: SessionState,
}

impl<'a, R: Rng, O: LinkOpener> SelectorSession<'a, R, O> {
    #[must_use]
    pub fn new(
        records: &'a [Record],
        keywords: KeywordMap,
        mode: SelectionMode,
        rng: R,
        opener: O,
    ) -> Self {
        Self {
            records,
            keywords,
            mode,
            links: LinkConfig::default(),
            rng,
            opener,
            state: SessionState::Idle,
        }
    }

    /// Replaces the default DOI resolver / search link configuration.
    #[must_use]
    pub fn with_link_config(mut self, links: LinkConfig) -> Self {
        self.links = links;
        self
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Current (possibly popped) keyword map.
    #[must_use]
    pub fn keyword_map(&self) -> &KeywordMap {
        &self.keywords
    }

    #[must_use]
    pub fn into_keyword_map(self) -> KeywordMap {
        self.keywords
    }

    /// Handles one pointer event against the rendered `surface`.
    pub fn handle_event(&mut self, event: PointerEvent, surface: &dyn ColorResolver) -> EventOutcome {
        if self.state == SessionState::Closed {
            return EventOutcome::Ignored(IgnoreReason::SessionClosed);
        }
        match event {
            PointerEvent::Close => {
                debug!("Session closed");
                self.state = SessionState::Closed;
                EventOutcome::Closed
            }
            PointerEvent::Click { x, y } => self.handle_click(x, y, surface),
        }
    }

    #[instrument(skip(self, surface))]
    fn handle_click(&mut self, x: f64, y: f64, surface: &dyn ColorResolver) -> EventOutcome {
        let Some((px, py)) = pixel_at(x, y, surface.dimensions()) else {
            debug!("Click outside image");
            return EventOutcome::Ignored(IgnoreReason::OutOfBounds);
        };
        let Some(keyword) = surface.resolve_color_at(px, py).map(str::to_string) else {
            debug!(px, py, "Click on unmapped pixel");
            return EventOutcome::Ignored(IgnoreReason::Unmapped);
        };

        let Some(indices) = self.keywords.records_for(&keyword).filter(|set| !set.is_empty())
        else {
            debug!(%keyword, "No records left");
            return EventOutcome::Exhausted { keyword };
        };
        let Some(featured) = indices.iter().copied().choose(&mut self.rng) else {
            return EventOutcome::Exhausted { keyword };
        };

        let listing: Vec<ListingLine> = indices
            .iter()
            .filter_map(|&index| {
                let Some(record) = self.records.get(index) else {
                    warn!(index, %keyword, "Keyword map references a missing record");
                    return None;
                };
                Some(ListingLine {
                    index,
                    featured: index == featured,
                    author: record.short_author(),
                    title: record.short_title(),
                })
            })
            .collect();

        let link = match self.records.get(featured).map(|r| featured_link(r, &self.links)) {
            Some(Ok(url)) => {
                self.opener.open(&url);
                Some(url)
            }
            Some(Err(error)) => {
                warn!(%error, featured, "Could not build featured link");
                None
            }
            None => None,
        };

        if self.mode == SelectionMode::Pop {
            self.keywords.remove_record(&keyword, featured);
        }
        let remaining = self.keywords.records_for(&keyword).map_or(0, |set| set.len());
        debug!(%keyword, featured, remaining, "Selected record");

        EventOutcome::Selected(Selection {
            keyword,
            featured,
            listing,
            link,
            remaining,
        })
    }
}

/// Rounds click coordinates to the nearest pixel inside `(width, height)`.
fn pixel_at(x: f64, y: f64, (width, height): (u32, u32)) -> Option<(u32, u32)> {
    let (rx, ry) = (x.round(), y.round());
    if !rx.is_finite() || !ry.is_finite() {
        return None;
    }
    if rx < 0.0 || ry < 0.0 || rx >= f64::from(width) || ry >= f64::from(height) {
        return None;
    }
    // In range [0, u32::MAX) after the checks above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pixel = (rx as u32, ry as u32);
    Some(pixel)
}
