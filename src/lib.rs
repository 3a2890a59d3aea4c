//! Open Graph link previews for embeddable cards.
//!
//! A [`PreviewFetcher`] owns one target URL, looks up its metadata through a
//! [`MetadataSource`] whenever the target changes, and exposes a
//! [`PreviewState`] that a host renders with any [`Render`] implementation.

mod cache;
mod error;
mod fetcher;
mod logging;
mod metadata;
mod preview_fetcher;
mod render;
mod state;
#[cfg(feature = "logging")]
mod utils;

#[cfg(feature = "cache")]
pub use cache::{Cache, CachedSource};
pub use error::PreviewError;
pub use fetcher::{
    Fetcher, FetcherConfig, MetadataSource, DEFAULT_ENDPOINT, ENDPOINT_ENV, TIMEOUT_ENV,
};
#[cfg(feature = "logging")]
pub use logging::{log_error_card, log_preview_card, setup_logging, LogConfig, LogLevelGuard};
pub use metadata::{PreviewMetadata, OG_DESCRIPTION, OG_IMAGE, OG_TITLE};
pub use preview_fetcher::{PreviewFetcher, PreviewWatcher};
pub use render::{
    render, CardImage, CardLabels, CardLink, CardRenderer, EmbedRenderer, HtmlRenderer,
    PreviewCard, Render, RenderOutput,
};
pub use state::PreviewState;
