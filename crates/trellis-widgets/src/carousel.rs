//! Looping carousel.
//!
//! The real slides are wrapped in a track with a clone of the last slide in
//! front and a clone of the first slide at the end. Landing on a clone snaps
//! back to the matching real slide with transitions disabled, so the loop
//! looks endless.

use serde::Deserialize;

use crate::dom::{Document, NodeId};
use crate::page::{Event, Widget};

const TRACK_CLASS: &str = "slides-track";
const TRANSFORM_TRANSITION: &str = "transform 0.6s ease";

/// Carousel options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Element that receives the track
    pub wrapper_selector: String,
    /// Slides inside the wrapper
    pub slide_selector: String,
    /// Optional "previous" control
    pub prev_selector: String,
    /// Optional "next" control
    pub next_selector: String,
    /// Horizontal distance a swipe must exceed, in pixels
    pub swipe_threshold: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            wrapper_selector: ".reviews .slide__wrapper".to_string(),
            slide_selector: ".slide".to_string(),
            prev_selector: ".reviews .slider__control--prev".to_string(),
            next_selector: ".reviews .slider__control--next".to_string(),
            swipe_threshold: 30.0,
        }
    }
}

/// Carousel controller bound to one wrapper element.
#[derive(Debug)]
pub struct Carousel {
    wrapper: NodeId,
    track: NodeId,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    /// Number of real slides
    count: usize,
    /// Index into the track, clones included
    position: usize,
    /// A transform transition is in flight
    locked: bool,
    /// Transitions are off until the next animation frame
    transitions_suspended: bool,
    touch_start: Option<f64>,
    swipe_threshold: f64,
}

impl Carousel {
    /// Mount on the first element matching the configured wrapper selector.
    ///
    /// Returns `None` when the wrapper or its slides are missing.
    pub fn mount(doc: &mut Document, config: CarouselConfig) -> Option<Self> {
        let scope = doc.document_element();
        let Some(wrapper) = doc.query_selector(scope, &config.wrapper_selector) else {
            tracing::debug!("No carousel wrapper matches {:?}", config.wrapper_selector);
            return None;
        };
        let prev = doc.query_selector(scope, &config.prev_selector);
        let next = doc.query_selector(scope, &config.next_selector);
        Self::mount_at(doc, wrapper, prev, next, config)
    }

    /// Mount on a specific wrapper with explicit controls.
    ///
    /// Returns `None` when the wrapper holds no slides.
    pub fn mount_at(
        doc: &mut Document,
        wrapper: NodeId,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        config: CarouselConfig,
    ) -> Option<Self> {
        let slides = doc.query_selector_all(wrapper, &config.slide_selector);
        let (Some(&first), Some(&last)) = (slides.first(), slides.last()) else {
            tracing::debug!("Carousel wrapper has no slides");
            return None;
        };

        let track = doc.create_element("div");
        doc.add_class(track, TRACK_CLASS);
        doc.append_child(wrapper, track);
        for slide in &slides {
            doc.append_child(track, *slide);
        }

        let first_clone = doc.clone_node(first, true);
        let last_clone = doc.clone_node(last, true);
        let head = doc.first_child(track);
        doc.insert_before(track, last_clone, head);
        doc.append_child(track, first_clone);

        let children = doc.children(track).to_vec();
        for child in children {
            doc.set_style(child, "flex", "0 0 100%");
        }

        let mut carousel = Self {
            wrapper,
            track,
            prev,
            next,
            count: slides.len(),
            position: 1,
            locked: false,
            transitions_suspended: false,
            touch_start: None,
            swipe_threshold: config.swipe_threshold,
        };

        carousel.suspend_transitions(doc);
        carousel.apply_transform(doc);

        tracing::debug!("Carousel mounted with {} slides", carousel.count);

        Some(carousel)
    }

    /// The track element holding slides and clones.
    pub fn track(&self) -> NodeId {
        self.track
    }

    /// Number of real slides.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current index into the track (1..=count at rest).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether a transition is in flight.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Zero-based index of the real slide currently shown.
    pub fn current_slide(&self) -> usize {
        match self.position {
            0 => self.count - 1,
            p if p > self.count => 0,
            p => p - 1,
        }
    }

    /// Advance one slide. Ignored while a transition is in flight.
    pub fn next(&mut self, doc: &mut Document) {
        if self.locked {
            return;
        }
        self.locked = true;
        self.position += 1;
        self.animate(doc);
    }

    /// Go back one slide. Ignored while a transition is in flight.
    pub fn prev(&mut self, doc: &mut Document) {
        if self.locked {
            return;
        }
        self.locked = true;
        self.position -= 1;
        self.animate(doc);
    }

    /// Handle the end of the track's transform transition.
    pub fn on_transition_end(&mut self, doc: &mut Document, target: NodeId, property: &str) {
        if target != self.track || property != "transform" {
            return;
        }

        if self.position == self.count + 1 {
            self.snap_to(doc, 1);
        } else if self.position == 0 {
            self.snap_to(doc, self.count);
        }

        self.locked = false;
    }

    /// Re-enable transitions suspended for a snap.
    pub fn on_animation_frame(&mut self, doc: &mut Document) {
        if self.transitions_suspended {
            self.resume_transitions(doc);
        }
    }

    pub fn on_touch_start(&mut self, doc: &Document, target: NodeId, x: f64) {
        if doc.contains(self.wrapper, target) {
            self.touch_start = Some(x);
        }
    }

    pub fn on_touch_end(&mut self, doc: &mut Document, target: NodeId, x: f64) {
        if !doc.contains(self.wrapper, target) {
            return;
        }
        let Some(start) = self.touch_start.take() else {
            return;
        };

        let dx = x - start;
        if dx.abs() <= self.swipe_threshold {
            return;
        }
        if dx < 0.0 {
            self.next(doc);
        } else {
            self.prev(doc);
        }
    }

    pub fn on_click(&mut self, doc: &mut Document, target: NodeId) {
        if self.next.is_some_and(|n| doc.contains(n, target)) {
            self.next(doc);
        } else if self.prev.is_some_and(|p| doc.contains(p, target)) {
            self.prev(doc);
        }
    }

    fn animate(&mut self, doc: &mut Document) {
        // A move with transitions off would never report completion.
        if self.transitions_suspended {
            self.resume_transitions(doc);
        }
        self.apply_transform(doc);
    }

    fn snap_to(&mut self, doc: &mut Document, position: usize) {
        tracing::debug!("Carousel snapping {} -> {}", self.position, position);
        self.suspend_transitions(doc);
        self.position = position;
        self.apply_transform(doc);
    }

    fn apply_transform(&self, doc: &mut Document) {
        let offset = -(self.position as i64) * 100;
        doc.set_style(self.track, "transform", &format!("translateX({}%)", offset));
    }

    fn suspend_transitions(&mut self, doc: &mut Document) {
        doc.set_style(self.track, "transition", "none");
        self.transitions_suspended = true;
    }

    fn resume_transitions(&mut self, doc: &mut Document) {
        doc.set_style(self.track, "transition", TRANSFORM_TRANSITION);
        self.transitions_suspended = false;
    }
}

impl Widget for Carousel {
    fn name(&self) -> &'static str {
        "carousel"
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        match event {
            Event::Click { target, .. } => self.on_click(doc, *target),
            Event::AnimationFrame => self.on_animation_frame(doc),
            Event::TransitionEnd { target, property } => {
                self.on_transition_end(doc, *target, property)
            }
            Event::TouchStart { target, x } => self.on_touch_start(doc, *target, *x),
            Event::TouchEnd { target, x } => self.on_touch_end(doc, *target, *x),
            Event::Resize { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        doc: Document,
        wrapper: NodeId,
        prev: NodeId,
        next: NodeId,
        slides: Vec<NodeId>,
    }

    fn fixture(count: usize) -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let reviews = doc.append_element(body, "section", "reviews");
        let wrapper = doc.append_element(reviews, "div", "slide__wrapper");
        let slides = (0..count)
            .map(|i| {
                let slide = doc.append_element(wrapper, "div", "slide");
                doc.set_attribute(slide, "data-index", &i.to_string());
                slide
            })
            .collect();
        let prev = doc.append_element(reviews, "button", "slider__control--prev");
        let next = doc.append_element(reviews, "button", "slider__control--next");
        Fixture {
            doc,
            wrapper,
            prev,
            next,
            slides,
        }
    }

    fn mount(f: &mut Fixture) -> Carousel {
        Carousel::mount(&mut f.doc, CarouselConfig::default()).unwrap()
    }

    fn finish(c: &mut Carousel, doc: &mut Document) {
        let track = c.track();
        c.on_transition_end(doc, track, "transform");
        c.on_animation_frame(doc);
    }

    fn transform(c: &Carousel, doc: &Document) -> String {
        doc.style(c.track(), "transform").unwrap_or_default().to_string()
    }

    #[test]
    fn builds_track_with_boundary_clones() {
        for count in 1..=5 {
            let mut f = fixture(count);
            let c = mount(&mut f);
            let children = f.doc.children(c.track()).to_vec();

            assert_eq!(children.len(), count + 2);
            assert_eq!(c.position(), 1);
            assert_eq!(&children[1..=count], &f.slides[..]);
            assert_eq!(
                f.doc.attribute(children[0], "data-index"),
                Some((count - 1).to_string().as_str())
            );
            assert_eq!(f.doc.attribute(children[count + 1], "data-index"), Some("0"));
            assert!(children
                .iter()
                .all(|c| f.doc.style(*c, "flex") == Some("0 0 100%")));
        }
    }

    #[test]
    fn starts_without_transition_then_enables_it() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);

        assert_eq!(f.doc.parent(c.track()), Some(f.wrapper));
        assert_eq!(f.doc.style(c.track(), "transition"), Some("none"));
        assert_eq!(transform(&c, &f.doc), "translateX(-100%)");

        c.on_animation_frame(&mut f.doc);

        assert_eq!(
            f.doc.style(c.track(), "transition"),
            Some("transform 0.6s ease")
        );
    }

    #[test]
    fn missing_wrapper_or_slides_is_a_no_op() {
        let mut doc = Document::new();
        assert!(Carousel::mount(&mut doc, CarouselConfig::default()).is_none());

        let body = doc.body();
        let reviews = doc.append_element(body, "section", "reviews");
        let wrapper = doc.append_element(reviews, "div", "slide__wrapper");
        assert!(Carousel::mount(&mut doc, CarouselConfig::default()).is_none());
        assert!(doc.children(wrapper).is_empty());
    }

    #[test]
    fn lock_drops_repeated_navigation() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);

        c.next(&mut f.doc);
        c.next(&mut f.doc);

        assert_eq!(c.position(), 2);
        assert!(c.is_locked());
        assert_eq!(transform(&c, &f.doc), "translateX(-200%)");

        c.prev(&mut f.doc);
        assert_eq!(c.position(), 2);

        finish(&mut c, &mut f.doc);
        assert!(!c.is_locked());

        c.next(&mut f.doc);
        assert_eq!(c.position(), 3);
    }

    #[test]
    fn first_move_enables_suspended_transitions() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);

        c.next(&mut f.doc);

        assert_eq!(
            f.doc.style(c.track(), "transition"),
            Some("transform 0.6s ease")
        );
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);

        for expected in [1, 2, 0] {
            c.next(&mut f.doc);
            finish(&mut c, &mut f.doc);
            assert_eq!(c.current_slide(), expected);
        }

        assert_eq!(c.position(), 1);
        assert_eq!(transform(&c, &f.doc), "translateX(-100%)");
    }

    #[test]
    fn landing_on_a_clone_snaps_without_animation() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);
        c.on_animation_frame(&mut f.doc);

        c.prev(&mut f.doc);
        assert_eq!(c.position(), 0);
        assert_eq!(transform(&c, &f.doc), "translateX(0%)");

        let track = c.track();
        c.on_transition_end(&mut f.doc, track, "transform");

        assert_eq!(c.position(), 3);
        assert_eq!(transform(&c, &f.doc), "translateX(-300%)");
        assert_eq!(f.doc.style(track, "transition"), Some("none"));
        assert!(!c.is_locked());

        c.on_animation_frame(&mut f.doc);
        assert_eq!(f.doc.style(track, "transition"), Some("transform 0.6s ease"));
    }

    #[test]
    fn position_stays_in_bounds() {
        let mut f = fixture(4);
        let mut c = mount(&mut f);
        let moves = [true, true, false, true, true, true, false, false, false, false, false];

        for forward in moves {
            if forward {
                c.next(&mut f.doc);
            } else {
                c.prev(&mut f.doc);
            }
            assert!(c.position() <= c.count() + 1);

            finish(&mut c, &mut f.doc);
            assert!((1..=c.count()).contains(&c.position()));
        }
    }

    #[test]
    fn ignores_foreign_transition_ends() {
        let mut f = fixture(2);
        let mut c = mount(&mut f);
        let track = c.track();

        c.next(&mut f.doc);
        c.on_transition_end(&mut f.doc, track, "opacity");
        c.on_transition_end(&mut f.doc, f.slides[0], "transform");

        assert!(c.is_locked());
    }

    #[test]
    fn swipe_threshold_is_exclusive() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);
        let slide = f.slides[0];

        c.on_touch_start(&f.doc, slide, 200.0);
        c.on_touch_end(&mut f.doc, slide, 171.0);
        assert_eq!(c.position(), 1);

        c.on_touch_start(&f.doc, slide, 200.0);
        c.on_touch_end(&mut f.doc, slide, 170.0);
        assert_eq!(c.position(), 1);

        c.on_touch_start(&f.doc, slide, 200.0);
        c.on_touch_end(&mut f.doc, slide, 169.0);
        assert_eq!(c.position(), 2);

        finish(&mut c, &mut f.doc);

        c.on_touch_start(&f.doc, slide, 100.0);
        c.on_touch_end(&mut f.doc, slide, 131.0);
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn touch_end_without_start_is_ignored() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);
        let slide = f.slides[1];

        c.on_touch_end(&mut f.doc, slide, 0.0);
        assert_eq!(c.position(), 1);

        // The start is consumed by the first end.
        c.on_touch_start(&f.doc, slide, 100.0);
        c.on_touch_end(&mut f.doc, slide, 100.0);
        c.on_touch_end(&mut f.doc, slide, 0.0);
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn controls_navigate() {
        let mut f = fixture(3);
        let mut c = mount(&mut f);
        let icon = f.doc.append_element(f.next, "svg", "icon");

        c.on_click(&mut f.doc, icon);
        assert_eq!(c.position(), 2);
        finish(&mut c, &mut f.doc);

        c.on_click(&mut f.doc, f.prev);
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn works_without_controls() {
        let mut f = fixture(2);
        let mut c =
            Carousel::mount_at(&mut f.doc, f.wrapper, None, None, CarouselConfig::default())
                .unwrap();
        let slide = f.slides[0];

        c.on_click(&mut f.doc, f.next);
        assert_eq!(c.position(), 1);

        c.on_touch_start(&f.doc, slide, 300.0);
        c.on_touch_end(&mut f.doc, slide, 100.0);
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn single_slide_loops_onto_itself() {
        let mut f = fixture(1);
        let mut c = mount(&mut f);

        c.next(&mut f.doc);
        assert_eq!(c.position(), 2);
        finish(&mut c, &mut f.doc);

        assert_eq!(c.position(), 1);
        assert_eq!(c.current_slide(), 0);
    }
}
