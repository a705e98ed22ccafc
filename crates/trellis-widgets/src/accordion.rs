//! Accordion: collapsible panels with height animation.
//!
//! Each panel moves through `Closed -> Opening -> Open -> Closing -> Closed`.
//! Style writes that must land after a layout read are deferred to the next
//! animation frame; the discrete phase flip happens when the body's `height`
//! transition ends.

use serde::Deserialize;

use crate::dom::{parse_px, px, Document, NodeId};
use crate::page::{Event, Widget};

const OPEN_CLASS: &str = "is-open";
const HEIGHT_TRANSITION: &str = "height 0.35s ease";

/// Accordion options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccordionConfig {
    /// Container the accordion is mounted on
    pub root_selector: String,
    /// One element per panel
    pub item_selector: String,
    /// Click target that toggles its item
    pub header_selector: String,
    /// Collapsible body inside an item
    pub panel_selector: String,
    /// Control that always closes its item
    pub close_selector: String,
    /// Keep at most one panel open
    pub single_open: bool,
    /// Open the first panel on the first animation frame
    pub open_first: bool,
    /// Whether a header click closes an open panel
    pub collapsible: bool,
}

impl Default for AccordionConfig {
    fn default() -> Self {
        Self {
            root_selector: ".accordeon".to_string(),
            item_selector: ".accordeon__item".to_string(),
            header_selector: ".accordeon__item__top".to_string(),
            panel_selector: ".accordeon__item__main".to_string(),
            close_selector: ".accordeon__item__header__cross".to_string(),
            single_open: false,
            open_first: true,
            collapsible: true,
        }
    }
}

/// Animation phase of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl Phase {
    /// Opening or open.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}

/// A height write waiting for the next animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HeightWrite {
    Px(f64),
    Auto,
}

/// One accordion item and its body.
#[derive(Debug, Clone)]
struct Panel {
    item: NodeId,
    body: Option<NodeId>,
    phase: Phase,
    pending: Option<HeightWrite>,
}

/// Accordion controller bound to one root element.
#[derive(Debug)]
pub struct Accordion {
    config: AccordionConfig,
    root: NodeId,
    panels: Vec<Panel>,
    open_first_pending: bool,
}

impl Accordion {
    /// Mount on the first element matching the configured root selector.
    ///
    /// Returns `None` when the page has no such element.
    pub fn mount(doc: &mut Document, config: AccordionConfig) -> Option<Self> {
        let Some(root) = doc.query_selector(doc.document_element(), &config.root_selector) else {
            tracing::debug!("No accordion root matches {:?}", config.root_selector);
            return None;
        };
        Some(Self::mount_at(doc, root, config))
    }

    /// Mount on a specific root element.
    pub fn mount_at(doc: &mut Document, root: NodeId, config: AccordionConfig) -> Self {
        let panels: Vec<Panel> = doc
            .query_selector_all(root, &config.item_selector)
            .into_iter()
            .map(|item| Panel {
                item,
                body: doc.query_selector(item, &config.panel_selector),
                phase: Phase::Closed,
                pending: None,
            })
            .collect();

        for panel in &panels {
            if let Some(body) = panel.body {
                doc.set_style(body, "overflow", "hidden");
                doc.set_style(body, "height", "0px");
                doc.set_style(body, "transition", HEIGHT_TRANSITION);
                doc.set_attribute(body, "aria-hidden", "true");
            }
            doc.set_attribute(panel.item, "aria-expanded", "false");
        }

        tracing::debug!("Accordion mounted with {} panels", panels.len());

        Self {
            open_first_pending: config.open_first && !panels.is_empty(),
            config,
            root,
            panels,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of managed panels.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Item element of panel `index`.
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.panels.get(index).map(|p| p.item)
    }

    /// Body element of panel `index`.
    pub fn body(&self, index: usize) -> Option<NodeId> {
        self.panels.get(index).and_then(|p| p.body)
    }

    pub fn phase(&self, index: usize) -> Option<Phase> {
        self.panels.get(index).map(|p| p.phase)
    }

    /// Whether panel `index` has work queued for the next frame.
    pub fn has_pending_frame(&self, index: usize) -> bool {
        self.panels.get(index).is_some_and(|p| p.pending.is_some())
    }

    /// Indices of panels that are opening or open.
    pub fn open_panels(&self) -> Vec<usize> {
        self.panels
            .iter()
            .enumerate()
            .filter(|(_, p)| p.phase.is_open())
            .map(|(i, _)| i)
            .collect()
    }

    /// Start opening panel `index`. No-op if it is already opening or open.
    pub fn open(&mut self, doc: &mut Document, index: usize) {
        let Some(panel) = self.panels.get(index) else {
            return;
        };
        let Some(body) = panel.body else {
            return;
        };
        if panel.phase.is_open() {
            return;
        }
        let item = panel.item;

        if self.config.single_open {
            for other in 0..self.panels.len() {
                if other != index {
                    self.close(doc, other);
                }
            }
        }

        doc.add_class(item, OPEN_CLASS);
        doc.set_attribute(item, "aria-expanded", "true");
        doc.set_attribute(body, "aria-hidden", "false");

        // Overflow stays hidden for the duration of the animation.
        doc.set_style(body, "overflow", "hidden");
        doc.set_style(body, "display", "");

        let start = doc.bounding_height(body);
        let target = doc.scroll_height(body);
        if doc.style(body, "height") == Some("auto") {
            doc.set_style(body, "height", &px(start));
        }

        let panel = &mut self.panels[index];
        panel.pending = Some(HeightWrite::Px(target));
        panel.phase = Phase::Opening;

        tracing::debug!("Opening panel {} ({} -> {}px)", index, start, target);
    }

    /// Start closing panel `index`. No-op if it is already closing or closed.
    pub fn close(&mut self, doc: &mut Document, index: usize) {
        let Some(panel) = self.panels.get(index) else {
            return;
        };
        let Some(body) = panel.body else {
            return;
        };
        if !panel.phase.is_open() {
            return;
        }

        doc.remove_class(panel.item, OPEN_CLASS);
        doc.set_attribute(panel.item, "aria-expanded", "false");
        doc.set_style(body, "overflow", "hidden");

        // Transitions do not run from `auto`; pin the measured height first.
        if doc.style(body, "height") == Some("auto") {
            let height = doc.scroll_height(body);
            doc.set_style(body, "height", &px(height));
            doc.bounding_height(body);
        }

        let panel = &mut self.panels[index];
        panel.pending = Some(HeightWrite::Px(0.0));
        panel.phase = Phase::Closing;

        tracing::debug!("Closing panel {}", index);
    }

    /// Close panel `index` if open, otherwise open it.
    pub fn toggle(&mut self, doc: &mut Document, index: usize) {
        match self.phase(index) {
            Some(phase) if phase.is_open() => self.close(doc, index),
            Some(_) => self.open(doc, index),
            None => {}
        }
    }

    /// Run the writes deferred to this frame.
    pub fn on_animation_frame(&mut self, doc: &mut Document) {
        for index in 0..self.panels.len() {
            let panel = &mut self.panels[index];
            let (Some(body), Some(write)) = (panel.body, panel.pending.take()) else {
                continue;
            };

            match write {
                HeightWrite::Px(height) => {
                    let value = px(height);
                    let unchanged = doc
                        .style(body, "height")
                        .and_then(parse_px)
                        .is_some_and(|current| current == height);
                    doc.set_style(body, "height", &value);

                    // No change means no transition, so nothing will signal the end.
                    if unchanged {
                        self.settle(doc, index);
                    }
                }
                HeightWrite::Auto => doc.set_style(body, "height", "auto"),
            }
        }

        if std::mem::take(&mut self.open_first_pending) {
            self.open(doc, 0);
        }
    }

    /// Handle the end of a transition on one of the panel bodies.
    pub fn on_transition_end(&mut self, doc: &mut Document, target: NodeId, property: &str) {
        if property != "height" {
            return;
        }
        let Some(index) = self.panels.iter().position(|p| p.body == Some(target)) else {
            return;
        };
        // A write still queued means this transition was superseded.
        if self.panels[index].pending.is_some() {
            return;
        }
        self.settle(doc, index);
    }

    /// Keep open panels sized to their content after a reflow.
    pub fn on_resize(&mut self, doc: &mut Document) {
        for panel in &mut self.panels {
            let Some(body) = panel.body else {
                continue;
            };
            if panel.phase != Phase::Open {
                continue;
            }
            let height = doc.scroll_height(body);
            doc.set_style(body, "height", &px(height));
            panel.pending = Some(HeightWrite::Auto);
        }
    }

    /// Delegated click handling for headers and close buttons.
    pub fn on_click(&mut self, doc: &mut Document, target: NodeId) {
        if !doc.contains(self.root, target) {
            return;
        }

        if let Some(header) = doc.closest(target, &self.config.header_selector) {
            if doc.contains(self.root, header) {
                if let Some(index) = self.index_of(doc, header) {
                    let is_open = self.panels[index].phase.is_open();
                    if !is_open {
                        self.open(doc, index);
                    } else if self.config.collapsible {
                        self.close(doc, index);
                    }
                }
                return;
            }
        }

        if let Some(button) = doc.closest(target, &self.config.close_selector) {
            if doc.contains(self.root, button) {
                if let Some(index) = self.index_of(doc, button) {
                    self.close(doc, index);
                }
            }
        }
    }

    /// Index of the item containing `node`.
    fn index_of(&self, doc: &Document, node: NodeId) -> Option<usize> {
        let item = doc.closest(node, &self.config.item_selector)?;
        self.panels.iter().position(|p| p.item == item)
    }

    /// Finish the running animation of panel `index`.
    fn settle(&mut self, doc: &mut Document, index: usize) {
        let panel = &mut self.panels[index];
        let Some(body) = panel.body else {
            return;
        };

        match panel.phase {
            Phase::Opening => {
                doc.set_style(body, "height", "auto");
                doc.set_style(body, "overflow", "visible");
                panel.phase = Phase::Open;
                tracing::debug!("Panel {} open", index);
            }
            Phase::Closing => {
                doc.set_attribute(body, "aria-hidden", "true");
                panel.phase = Phase::Closed;
                tracing::debug!("Panel {} closed", index);
            }
            Phase::Open | Phase::Closed => {}
        }
    }
}

impl Widget for Accordion {
    fn name(&self) -> &'static str {
        "accordion"
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        match event {
            Event::Click { target, .. } => self.on_click(doc, *target),
            Event::Resize { .. } => self.on_resize(doc),
            Event::AnimationFrame => self.on_animation_frame(doc),
            Event::TransitionEnd { target, property } => {
                self.on_transition_end(doc, *target, property)
            }
            Event::TouchStart { .. } | Event::TouchEnd { .. } => {}
        }
    }
}
