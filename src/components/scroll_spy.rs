use log::{debug, info};

use crate::components::anchor_scroll::header_offset;
use crate::config::SiteConfig;
use crate::events::{Component, EventKind, Observation, PageEvent, Reaction, Watch};
use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyStrategy {
    Observer,
    ScrollProbe,
}

struct NavSection<E> {
    link: E,
    /// Without the leading `#`.
    id: String,
    section: E,
}

/// Keeps `aria-current` on the nav link of the section being read.
pub struct ActiveSectionTracker<P: Page> {
    sections: Vec<NavSection<P::Element>>,
    header: Option<P::Element>,
    header_gap: f64,
    probe_ratio: f64,
    root_margin: String,
    threshold: f64,
    strategy: SpyStrategy,
    subscriptions: Vec<EventKind>,
    current: Option<String>,
}

impl<P: Page> ActiveSectionTracker<P> {
    pub fn new(page: &P, config: &SiteConfig) -> Self {
        let sections: Vec<_> = page
            .query_all(&config.selectors.nav_links)
            .into_iter()
            .filter_map(|link| {
                let href = page.attribute(&link, "href")?;
                let id = href.strip_prefix('#').filter(|id| !id.is_empty())?.to_string();
                let section = page.element_by_id(&id)?;
                Some(NavSection { link, id, section })
            })
            .collect();

        let strategy = if page.supports_intersection_observer() && !sections.is_empty() {
            SpyStrategy::Observer
        } else {
            SpyStrategy::ScrollProbe
        };
        let mut subscriptions = vec![EventKind::PopState];
        subscriptions.push(match strategy {
            SpyStrategy::Observer => EventKind::Intersection,
            SpyStrategy::ScrollProbe => EventKind::Scroll,
        });
        info!("Scroll spy over {} sections via {:?}", sections.len(), strategy);

        let mut tracker = Self {
            sections,
            header: page.query(&config.selectors.header),
            header_gap: config.header_gap,
            probe_ratio: config.spy_probe_ratio,
            root_margin: config.spy_root_margin.clone(),
            threshold: config.spy_threshold,
            strategy,
            subscriptions,
            current: None,
        };
        tracker.sync_from_fragment(page);
        tracker
    }

    pub fn strategy(&self) -> SpyStrategy {
        self.strategy
    }

    /// Id of the section whose link is marked current.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Marks the link for `id` and clears every other one. Unknown ids clear them all.
    pub fn set_current(&mut self, page: &P, id: &str) {
        let mut found = false;
        for entry in &self.sections {
            if entry.id == id {
                page.set_attribute(&entry.link, "aria-current", "true");
                found = true;
            } else {
                page.remove_attribute(&entry.link, "aria-current");
            }
        }
        let current = found.then(|| id.to_string());
        if current != self.current {
            debug!("Active section: {:?}", current);
        }
        self.current = current;
    }

    fn sync_from_fragment(&mut self, page: &P) {
        let fragment = page.location_fragment();
        let id = fragment.trim_start_matches('#');
        if !id.is_empty() {
            self.set_current(page, id);
        }
    }

    /// First section, in document order, spanning a point a quarter of the
    /// viewport below the header.
    fn probe(&mut self, page: &P) {
        let scroll_y = page.scroll_y();
        let probe = scroll_y
            + header_offset(page, self.header.as_ref(), self.header_gap)
            + page.viewport_height() * self.probe_ratio;
        let hit = self.sections.iter().find_map(|entry| {
            let rect = page.rect(&entry.section);
            let top = rect.top + scroll_y;
            let bottom = top + rect.height;
            (probe >= top && probe < bottom).then(|| entry.id.clone())
        });
        if let Some(id) = hit {
            self.set_current(page, &id);
        }
    }

    fn id_of(&self, section: &P::Element) -> Option<String> {
        self.sections
            .iter()
            .find(|entry| &entry.section == section)
            .map(|entry| entry.id.clone())
    }
}

impl<P: Page> Component<P> for ActiveSectionTracker<P> {
    fn name(&self) -> &'static str {
        "scroll-spy"
    }

    fn subscriptions(&self) -> &[EventKind] {
        &self.subscriptions
    }

    fn observation(&self) -> Option<Observation<P::Element>> {
        (self.strategy == SpyStrategy::Observer).then(|| Observation {
            watch: Watch::Sections,
            targets: self.sections.iter().map(|entry| entry.section.clone()).collect(),
            root_margin: self.root_margin.clone(),
            thresholds: vec![self.threshold],
        })
    }

    fn handle(&mut self, page: &P, event: &PageEvent<P::Element>) -> Reaction {
        match event {
            PageEvent::PopState => self.sync_from_fragment(page),
            PageEvent::Scroll => self.probe(page),
            PageEvent::Intersection {
                watch: Watch::Sections,
                entries,
            } => {
                // Batch order decides: the last intersecting entry wins.
                for entry in entries.iter().filter(|entry| entry.is_intersecting) {
                    if let Some(id) = self.id_of(&entry.target) {
                        self.set_current(page, &id);
                    }
                }
            }
            _ => {}
        }
        Reaction::ignored()
    }
}
