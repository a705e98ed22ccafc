//! Mobile navigation drawer.

use serde::Deserialize;

use crate::dom::{Document, NodeId};
use crate::page::{Event, Widget};

const NO_SCROLL: &str = "no-scroll";

/// Mobile navigation options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MobileNavConfig {
    pub button_selector: String,
    pub nav_selector: String,
    pub icon_selector: String,
    pub link_selector: String,
    pub open_class: String,
    pub icon_active_class: String,
    /// Viewports wider than this close the menu
    pub breakpoint: f64,
}

impl Default for MobileNavConfig {
    fn default() -> Self {
        Self {
            button_selector: ".mobile-nav-btn".to_string(),
            nav_selector: ".mobile-nav".to_string(),
            icon_selector: ".nav-icon".to_string(),
            link_selector: ".mobile-nav a".to_string(),
            open_class: "mobile-nav--open".to_string(),
            icon_active_class: "nav-icon--active".to_string(),
            breakpoint: 768.0,
        }
    }
}

/// Drawer toggled by a menu button.
#[derive(Debug)]
pub struct MobileNav {
    config: MobileNavConfig,
    button: NodeId,
    nav: NodeId,
    icon: Option<NodeId>,
}

impl MobileNav {
    /// Mount on the configured button and drawer; both must exist.
    pub fn mount(doc: &mut Document, config: MobileNavConfig) -> Option<Self> {
        let scope = doc.document_element();
        let button = doc.query_selector(scope, &config.button_selector);
        let nav = doc.query_selector(scope, &config.nav_selector);
        let (Some(button), Some(nav)) = (button, nav) else {
            tracing::debug!("Mobile nav button or drawer missing");
            return None;
        };
        let icon = doc.query_selector(scope, &config.icon_selector);

        Some(Self {
            config,
            button,
            nav,
            icon,
        })
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.has_class(self.nav, &self.config.open_class)
    }

    /// Flip the drawer and the page scroll lock.
    pub fn toggle(&self, doc: &mut Document) {
        let html = doc.document_element();
        let body = doc.body();
        doc.toggle_class(html, NO_SCROLL);
        doc.toggle_class(self.nav, &self.config.open_class);
        if let Some(icon) = self.icon {
            doc.toggle_class(icon, &self.config.icon_active_class);
        }
        doc.toggle_class(body, NO_SCROLL);
    }

    /// Close the drawer and release the scroll lock.
    pub fn close(&self, doc: &mut Document) {
        let html = doc.document_element();
        let body = doc.body();
        doc.remove_class(html, NO_SCROLL);
        doc.remove_class(self.nav, &self.config.open_class);
        if let Some(icon) = self.icon {
            doc.remove_class(icon, &self.config.icon_active_class);
        }
        doc.remove_class(body, NO_SCROLL);
    }

    pub fn on_click(&self, doc: &mut Document, target: NodeId) {
        if doc.contains(self.button, target) {
            self.toggle(doc);
            return;
        }

        let on_link = doc
            .closest(target, &self.config.link_selector)
            .is_some_and(|link| doc.contains(self.nav, link));
        if on_link {
            self.close(doc);
        }
    }

    pub fn on_resize(&self, doc: &mut Document, viewport_width: f64) {
        if viewport_width > self.config.breakpoint {
            self.close(doc);
        }
    }
}

impl Widget for MobileNav {
    fn name(&self) -> &'static str {
        "mobile-nav"
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        match event {
            Event::Click { target, .. } => self.on_click(doc, *target),
            Event::Resize { viewport_width } => self.on_resize(doc, *viewport_width),
            _ => {}
        }
    }
}
