use log::info;

use crate::config::SiteConfig;
use crate::events::{Component, EventKind, Observation, PageEvent, Reaction, Watch};
use crate::page::Page;
use crate::state::BodyFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopStrategy {
    /// Watch the hero with an IntersectionObserver.
    Observer,
    /// Compare the scroll offset against a small threshold on every scroll.
    ScrollOffset,
}

/// Flags `<body>` while the hero is in view so sticky CTAs can stay hidden.
pub struct TopOfPageTracker<P: Page> {
    flag: BodyFlag,
    hero: Option<P::Element>,
    strategy: TopStrategy,
    subscriptions: Vec<EventKind>,
    scroll_threshold: f64,
    visible_ratio: f64,
    thresholds: Vec<f64>,
}

impl<P: Page> TopOfPageTracker<P> {
    pub fn new(page: &P, config: &SiteConfig) -> Self {
        let hero = page.element_by_id(&config.selectors.hero_id);
        let strategy = if hero.is_some() && page.supports_intersection_observer() {
            TopStrategy::Observer
        } else {
            TopStrategy::ScrollOffset
        };
        let subscriptions = match strategy {
            TopStrategy::Observer => vec![EventKind::Intersection],
            TopStrategy::ScrollOffset => vec![EventKind::Scroll],
        };
        info!("Top-of-page tracking via {:?}", strategy);

        let mut tracker = Self {
            flag: BodyFlag::new(&config.markers.top),
            hero,
            strategy,
            subscriptions,
            scroll_threshold: config.top_scroll_threshold,
            visible_ratio: config.hero_visible_ratio,
            thresholds: config.hero_thresholds.clone(),
        };
        // Set before any observer callback arrives.
        tracker.sync_from_scroll(page);
        tracker
    }

    pub fn strategy(&self) -> TopStrategy {
        self.strategy
    }

    pub fn is_top(&self) -> bool {
        self.flag.get()
    }

    fn sync_from_scroll(&mut self, page: &P) {
        let at_top = page.scroll_y() < self.scroll_threshold;
        self.flag.set(page, at_top);
    }
}

impl<P: Page> Component<P> for TopOfPageTracker<P> {
    fn name(&self) -> &'static str {
        "top-of-page"
    }

    fn subscriptions(&self) -> &[EventKind] {
        &self.subscriptions
    }

    fn observation(&self) -> Option<Observation<P::Element>> {
        match (self.strategy, &self.hero) {
            (TopStrategy::Observer, Some(hero)) => Some(Observation {
                watch: Watch::Hero,
                targets: vec![hero.clone()],
                root_margin: "0px".to_string(),
                thresholds: self.thresholds.clone(),
            }),
            _ => None,
        }
    }

    fn handle(&mut self, page: &P, event: &PageEvent<P::Element>) -> Reaction {
        match event {
            PageEvent::Scroll => self.sync_from_scroll(page),
            PageEvent::Intersection {
                watch: Watch::Hero,
                entries,
            } => {
                // Only the hero is observed, so the first entry is the one that matters.
                if let Some(entry) = entries.first() {
                    let visible = entry.is_intersecting && entry.ratio >= self.visible_ratio;
                    self.flag.set(page, visible);
                }
            }
            _ => {}
        }
        Reaction::ignored()
    }
}
