//! Social preview images.
//!
//! Each event gets a 1200x630 PNG built from an SVG card in the event's
//! theme colours. Images are cached per `(event id, updated_at)` so an edit
//! produces a fresh image while the old one ages out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use moka::future::Cache;
use resvg::{tiny_skia, usvg};

use crate::contract::model::{Event, EventId};
use crate::domain::display::display_starts_at;

pub const PREVIEW_WIDTH: u32 = 1200;
pub const PREVIEW_HEIGHT: u32 = 630;

const CACHE_TTL: Duration = Duration::from_secs(24 * 3600);
const FONT_FAMILY: &str = "Georgia, DejaVu Serif, Liberation Serif, serif";
const TITLE_LINE_CHARS: usize = 26;
const TITLE_MAX_LINES: usize = 3;

type PreviewKey = (EventId, i64);

#[derive(Clone)]
pub struct PreviewRenderer {
    fonts: Arc<usvg::fontdb::Database>,
    cache: Cache<PreviewKey, Arc<Vec<u8>>>,
}

impl PreviewRenderer {
    pub fn new(capacity: u64) -> Self {
        let mut fonts = usvg::fontdb::Database::new();
        fonts.load_system_fonts();
        tracing::debug!(faces = fonts.len(), "preview fonts loaded");

        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            fonts: Arc::new(fonts),
            cache,
        }
    }

    /// PNG bytes for an event, rendered on a blocking thread on cache miss.
    pub async fn render(&self, event: &Event) -> anyhow::Result<Arc<Vec<u8>>> {
        let key = (event.id, event.updated_at.timestamp_millis());
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(event_id = event.id, "preview cache hit");
            return Ok(hit);
        }

        let svg = card_svg(event);
        let fonts = self.fonts.clone();
        let png = tokio::task::spawn_blocking(move || rasterize(&svg, fonts))
            .await
            .context("preview render task panicked")??;
        let png = Arc::new(png);

        self.cache.insert(key, png.clone()).await;
        tracing::debug!(event_id = event.id, bytes = png.len(), "preview rendered");
        Ok(png)
    }
}

fn rasterize(svg: &str, fonts: Arc<usvg::fontdb::Database>) -> anyhow::Result<Vec<u8>> {
    let options = usvg::Options {
        fontdb: fonts,
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| anyhow!("SVG parse error: {e}"))?;

    let mut pixmap = tiny_skia::Pixmap::new(PREVIEW_WIDTH, PREVIEW_HEIGHT)
        .ok_or_else(|| anyhow!("failed to create pixmap"))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| anyhow!("PNG encode error: {e}"))
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Greedy word wrap; the last line gets an ellipsis when text is dropped.
fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

/// SVG layout of the preview card.
pub fn card_svg(event: &Event) -> String {
    let palette = event.card_theme.palette();
    let when = display_starts_at(&event.starts_at).joined();
    let (w, h) = (PREVIEW_WIDTH, PREVIEW_HEIGHT);

    let mut svg = String::with_capacity(4096);
    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs><linearGradient id="bg" x1="0" y1="0" x2="1" y2="1"><stop offset="0" stop-color="{from}"/><stop offset="1" stop-color="{to}"/></linearGradient></defs><rect width="{w}" height="{h}" fill="url(#bg)"/><rect x="40" y="40" width="{iw}" height="{ih}" rx="28" fill="none" stroke="{accent}" stroke-width="4" opacity="0.7"/>"##,
        from = palette.from,
        to = palette.to,
        accent = palette.accent,
        iw = w - 80,
        ih = h - 80,
    ));

    svg.push_str(&format!(
        r##"<text x="{x}" y="130" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="34" letter-spacing="6" fill="{accent}">YOU'RE INVITED</text>"##,
        x = w / 2,
        accent = palette.accent,
    ));

    let title_lines = wrap(&event.title, TITLE_LINE_CHARS, TITLE_MAX_LINES);
    let line_height = 84;
    let first_y = 250 - (title_lines.len().saturating_sub(1) as i32 * line_height / 2);
    for (i, line) in title_lines.iter().enumerate() {
        svg.push_str(&format!(
            r##"<text x="{x}" y="{y}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="72" font-weight="bold" fill="{ink}">{text}</text>"##,
            x = w / 2,
            y = first_y + i as i32 * line_height,
            ink = palette.ink,
            text = xml_escape(line),
        ));
    }

    let details = [
        (!event.host.is_empty()).then(|| format!("Hosted by {}", event.host)),
        (!when.is_empty()).then_some(when),
        (!event.location.is_empty()).then(|| event.location.clone()),
    ];
    for (i, line) in details.into_iter().flatten().enumerate() {
        svg.push_str(&format!(
            r##"<text x="{x}" y="{y}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="36" fill="{ink}">{text}</text>"##,
            x = w / 2,
            y = 450 + i * 50,
            ink = palette.ink,
            text = xml_escape(line.trim()),
        ));
    }

    svg.push_str("</svg>");
    svg
}
