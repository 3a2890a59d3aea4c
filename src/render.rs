//! Presentation of a [`PreviewState`].
//!
//! Rendering is a pure function of the state and the target URL. Hosts pick
//! a [`Render`] implementation: [`CardRenderer`] produces a structured
//! [`RenderOutput`] tree, [`HtmlRenderer`] turns that tree into the
//! link-preview-card markup, and [`EmbedRenderer`] into the embed variant
//! with a raw metadata dump.

use crate::PreviewState;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Fallback and fixed strings used when building a card.
///
/// Swap these out to localize a card; the defaults are English.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLabels {
    pub missing_heading: String,
    pub missing_description: String,
    pub unavailable: String,
    pub image_alt: String,
}

impl Default for CardLabels {
    fn default() -> Self {
        Self {
            missing_heading: "No Title Available".into(),
            missing_description: "No description available".into(),
            unavailable: "No preview available".into(),
            image_alt: "Preview Image".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLink {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardImage {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewCard {
    pub heading: String,
    pub link: CardLink,
    pub description: String,
    pub image: Option<CardImage>,
}

impl PreviewCard {
    /// The card title: `og:title`, or the raw URL when the page has none.
    pub fn title(&self) -> &str {
        &self.link.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOutput {
    Empty,
    Loading,
    Unavailable { message: String },
    Card(PreviewCard),
}

pub trait Render {
    type Output;

    fn render(&self, state: &PreviewState, target: &str) -> Self::Output;
}

#[derive(Debug, Clone, Default)]
pub struct CardRenderer {
    labels: CardLabels,
}

impl CardRenderer {
    pub fn new(labels: CardLabels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &CardLabels {
        &self.labels
    }
}

impl Render for CardRenderer {
    type Output = RenderOutput;

    fn render(&self, state: &PreviewState, target: &str) -> RenderOutput {
        let metadata = match state {
            PreviewState::Idle => return RenderOutput::Empty,
            PreviewState::Loading => return RenderOutput::Loading,
            PreviewState::Failed => {
                return RenderOutput::Unavailable {
                    message: self.labels.unavailable.clone(),
                }
            }
            PreviewState::Ready(metadata) => metadata,
        };

        let labels = &self.labels;
        RenderOutput::Card(PreviewCard {
            heading: metadata
                .og_title()
                .unwrap_or(&labels.missing_heading)
                .to_string(),
            link: CardLink {
                href: target.to_string(),
                text: metadata.og_title().unwrap_or(target).to_string(),
            },
            description: metadata
                .og_description()
                .unwrap_or(&labels.missing_description)
                .to_string(),
            image: metadata.og_image().map(|src| CardImage {
                src: src.to_string(),
                alt: labels.image_alt.clone(),
            }),
        })
    }
}

/// Renders with the default English labels.
pub fn render(state: &PreviewState, target: &str) -> RenderOutput {
    CardRenderer::default().render(state, target)
}

/// Produces an HTML fragment from the cards of a [`CardRenderer`].
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    cards: CardRenderer,
}

impl HtmlRenderer {
    pub fn new(cards: CardRenderer) -> Self {
        Self { cards }
    }
}

impl Render for HtmlRenderer {
    type Output = String;

    fn render(&self, state: &PreviewState, target: &str) -> String {
        self.cards.render(state, target).to_html()
    }
}

/// The embed variant: no heading, a text loading indicator, and the full
/// metadata as pretty-printed JSON under the card.
#[derive(Debug, Clone, Default)]
pub struct EmbedRenderer {
    cards: CardRenderer,
}

impl EmbedRenderer {
    pub fn new(cards: CardRenderer) -> Self {
        Self { cards }
    }
}

impl Render for EmbedRenderer {
    type Output = String;

    fn render(&self, state: &PreviewState, target: &str) -> String {
        match self.cards.render(state, target) {
            RenderOutput::Loading => r#"<div class="loading">Loading...</div>"#.to_string(),
            RenderOutput::Card(card) => {
                let dump = state
                    .metadata()
                    .map(serde_json::to_string_pretty)
                    .transpose()
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "Failed to serialize metadata dump");
                        None
                    })
                    .unwrap_or_default();

                let mut html = String::from(r#"<div class="preview">"#);
                push_card_body(&mut html, &card);
                html.push_str("</div>");
                html.push_str(&format!(
                    r#"<div class="metadata">{}</div>"#,
                    escape_html(&dump)
                ));
                html
            }
            other => other.to_html(),
        }
    }
}

impl RenderOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, RenderOutput::Empty)
    }

    pub fn card(&self) -> Option<&PreviewCard> {
        match self {
            RenderOutput::Card(card) => Some(card),
            _ => None,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            RenderOutput::Empty => String::new(),
            RenderOutput::Loading => {
                r#"<div class="loading"><div class="loader-spinner"></div></div>"#.to_string()
            }
            RenderOutput::Unavailable { message } => {
                format!(r#"<div class="error">{}</div>"#, escape_html(message))
            }
            RenderOutput::Card(card) => {
                let mut html = String::from(r#"<div class="preview">"#);
                html.push_str(&format!("<h2>{}</h2>", escape_html(&card.heading)));
                push_card_body(&mut html, card);
                html.push_str("</div>");
                html
            }
        }
    }
}

impl fmt::Display for RenderOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderOutput::Empty => Ok(()),
            RenderOutput::Loading => write!(f, "Loading..."),
            RenderOutput::Unavailable { message } => write!(f, "{message}"),
            RenderOutput::Card(card) => {
                writeln!(f, "{}", card.link.text)?;
                writeln!(f, "{}", card.link.href)?;
                write!(f, "{}", card.description)?;
                if let Some(image) = &card.image {
                    write!(f, "\n[{}: {}]", image.alt, image.src)?;
                }
                Ok(())
            }
        }
    }
}

/// Link, description and optional image, shared by both markup variants.
fn push_card_body(html: &mut String, card: &PreviewCard) {
    html.push_str(&format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        escape_html(&card.link.href),
        escape_html(&card.link.text)
    ));
    html.push_str(&format!("<p>{}</p>", escape_html(&card.description)));
    if let Some(image) = &card.image {
        html.push_str(&format!(
            r#"<img src="{}" alt="{}">"#,
            escape_html(&image.src),
            escape_html(&image.alt)
        ));
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
