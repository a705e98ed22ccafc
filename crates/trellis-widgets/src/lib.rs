//! Headless UI widgets for trellis sites.
//!
//! Each widget is an explicit controller mounted on a subtree of an
//! in-memory [`dom::Document`]. Hosts drive them with [`page::Event`]s:
//! clicks, resizes, touch input, animation frames and transition ends.

pub mod accordion;
pub mod carousel;
pub mod dom;
pub mod grid_guide;
pub mod mobile_nav;
pub mod page;

pub use accordion::{Accordion, AccordionConfig, Phase};
pub use carousel::{Carousel, CarouselConfig};
pub use dom::{Document, NodeId, Selector, SelectorError};
pub use grid_guide::{GridGuide, GridGuideConfig};
pub use mobile_nav::{MobileNav, MobileNavConfig};
pub use page::{Event, Page, PageConfig, Widget};
