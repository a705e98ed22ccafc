//! Page runtime: events, the widget trait and event dispatch.

use crate::accordion::{Accordion, AccordionConfig};
use crate::carousel::{Carousel, CarouselConfig};
use crate::dom::{Document, NodeId};
use crate::grid_guide::{GridGuide, GridGuideConfig};
use crate::mobile_nav::{MobileNav, MobileNavConfig};

/// Host events delivered to widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A click whose innermost target is `target`.
    Click {
        /// Clicked element
        target: NodeId,
        /// Milliseconds since an arbitrary epoch
        time_ms: u64,
    },

    /// The viewport was resized.
    Resize {
        /// New viewport width in CSS pixels
        viewport_width: f64,
    },

    /// The host is about to paint; deferred style writes run now.
    AnimationFrame,

    /// A CSS transition on `target` finished.
    TransitionEnd {
        /// Element whose transition completed
        target: NodeId,
        /// Transitioned property name
        property: String,
    },

    /// A touch started at horizontal position `x`.
    TouchStart {
        /// Touched element
        target: NodeId,
        /// Client X coordinate
        x: f64,
    },

    /// A touch ended at horizontal position `x`.
    TouchEnd {
        /// Touched element
        target: NodeId,
        /// Client X coordinate
        x: f64,
    },
}

impl Event {
    /// Shorthand for a transition-end event.
    pub fn transition_end(target: NodeId, property: &str) -> Self {
        Self::TransitionEnd {
            target,
            property: property.to_string(),
        }
    }
}

/// A controller mounted on a document subtree.
pub trait Widget: std::fmt::Debug {
    /// Widget identifier (e.g., "accordion")
    fn name(&self) -> &'static str;

    /// React to a host event.
    ///
    /// Widgets ignore events that do not concern their subtree.
    fn handle(&mut self, doc: &mut Document, event: &Event);
}

/// Widget selection and configuration for a page.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub accordion: AccordionConfig,
    pub carousel: CarouselConfig,
    pub mobile_nav: MobileNavConfig,
    pub grid_guide: GridGuideConfig,
}

/// A document together with the widgets mounted on it.
#[derive(Debug, Default)]
pub struct Page {
    doc: Document,
    widgets: Vec<Box<dyn Widget>>,
}

impl Page {
    /// Wrap a document with no widgets mounted.
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            widgets: Vec::new(),
        }
    }

    /// Mount every widget whose elements exist in the document.
    ///
    /// Returns the number of widgets mounted.
    pub fn mount_all(&mut self, config: &PageConfig) -> usize {
        let before = self.widgets.len();

        if let Some(nav) = MobileNav::mount(&mut self.doc, config.mobile_nav.clone()) {
            self.mount(nav);
        }
        if let Some(guide) = GridGuide::mount(&mut self.doc, config.grid_guide.clone()) {
            self.mount(guide);
        }
        if let Some(carousel) = Carousel::mount(&mut self.doc, config.carousel.clone()) {
            self.mount(carousel);
        }
        if let Some(accordion) = Accordion::mount(&mut self.doc, config.accordion.clone()) {
            self.mount(accordion);
        }

        let mounted = self.widgets.len() - before;
        tracing::debug!("Mounted {} widgets", mounted);
        mounted
    }

    /// Add an already-mounted widget.
    pub fn mount<W: Widget + 'static>(&mut self, widget: W) {
        tracing::debug!("Mounting {}", widget.name());
        self.widgets.push(Box::new(widget));
    }

    /// Deliver an event to every widget in mount order.
    pub fn dispatch(&mut self, event: Event) {
        for widget in &mut self.widgets {
            widget.handle(&mut self.doc, &event);
        }
    }

    /// Names of the mounted widgets in mount order.
    pub fn widget_names(&self) -> Vec<&'static str> {
        self.widgets.iter().map(|w| w.name()).collect()
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }
}
