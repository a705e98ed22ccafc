//! Hidden layout-grid overlay toggled by a burst of clicks.

use serde::Deserialize;

use crate::dom::Document;
use crate::page::{Event, Widget};

/// Grid guide options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GridGuideConfig {
    pub overlay_selector: String,
    /// Clicks needed to toggle
    pub clicks: u32,
    /// Maximum gap between consecutive clicks, in milliseconds
    pub window_ms: u64,
}

impl Default for GridGuideConfig {
    fn default() -> Self {
        Self {
            overlay_selector: ".grid-guides".to_string(),
            clicks: 4,
            window_ms: 500,
        }
    }
}

/// Click-burst counter listening on the whole document.
#[derive(Debug)]
pub struct GridGuide {
    config: GridGuideConfig,
    count: u32,
    last_click: Option<u64>,
}

impl GridGuide {
    /// Always mounts; the overlay is looked up when toggled.
    pub fn mount(_doc: &mut Document, config: GridGuideConfig) -> Option<Self> {
        Some(Self {
            config,
            count: 0,
            last_click: None,
        })
    }

    /// Clicks counted in the current burst.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn on_click(&mut self, doc: &mut Document, time_ms: u64) {
        let in_burst = self
            .last_click
            .is_some_and(|last| time_ms.saturating_sub(last) < self.config.window_ms);
        self.count = if in_burst { self.count + 1 } else { 1 };
        self.last_click = Some(time_ms);

        if self.count == self.config.clicks {
            self.count = 0;
            self.toggle(doc);
        }
    }

    /// Flip the overlay between hidden and shown.
    pub fn toggle(&self, doc: &mut Document) {
        let scope = doc.document_element();
        let Some(overlay) = doc.query_selector(scope, &self.config.overlay_selector) else {
            return;
        };
        let value = if doc.style(overlay, "display") == Some("none") {
            "flex"
        } else {
            "none"
        };
        doc.set_style(overlay, "display", value);
        tracing::debug!("Grid guides display: {}", value);
    }
}

impl Widget for GridGuide {
    fn name(&self) -> &'static str {
        "grid-guide"
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        if let Event::Click { time_ms, .. } = event {
            self.on_click(doc, *time_ms);
        }
    }
}
