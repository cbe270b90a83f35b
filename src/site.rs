use std::collections::{BTreeSet, VecDeque};

use chrono::{Datelike, Local};
use log::{debug, info};

use crate::components::anchor_scroll::SmoothAnchorScroller;
use crate::components::menu::MenuController;
use crate::components::scroll_spy::ActiveSectionTracker;
use crate::components::top_of_page::TopOfPageTracker;
use crate::config::SiteConfig;
use crate::events::{Component, EventKind, Observation, PageEvent, Reaction};
use crate::page::Page;

/// Writes `year` into the optional `[data-year]` element.
pub fn stamp_year<P: Page>(page: &P, config: &SiteConfig, year: i32) {
    if let Some(el) = page.query(&config.selectors.year) {
        page.set_text(&el, &year.to_string());
    }
}

/// The page's enhancements plus the table of who listens to what.
pub struct Site<P: Page> {
    components: Vec<Box<dyn Component<P>>>,
}

impl<P: Page + 'static> Site<P> {
    /// Runs every component's startup work against the current page.
    pub fn boot(page: &P, config: &SiteConfig) -> Self {
        stamp_year(page, config, Local::now().year());

        // Order matters for clicks: the menu sees them first, like a capturing listener.
        let components: Vec<Box<dyn Component<P>>> = vec![
            Box::new(MenuController::new(page, config)),
            Box::new(SmoothAnchorScroller::new(page, config)),
            Box::new(TopOfPageTracker::new(page, config)),
            Box::new(ActiveSectionTracker::new(page, config)),
        ];
        for component in &components {
            debug!(
                "{} listens to {:?}",
                component.name(),
                component.subscriptions()
            );
        }
        info!("Site enhancements ready ({} components)", components.len());
        Self { components }
    }
}

impl<P: Page> Site<P> {
    pub fn subscriptions(&self) -> BTreeSet<EventKind> {
        self.components
            .iter()
            .flat_map(|c| c.subscriptions().iter().copied())
            .collect()
    }

    pub fn observations(&self) -> Vec<Observation<P::Element>> {
        self.components
            .iter()
            .filter_map(|c| c.observation())
            .collect()
    }

    /// Delivers `event` to its subscribers, then any signals they raised.
    pub fn dispatch(&mut self, page: &P, event: PageEvent<P::Element>) -> Reaction {
        let mut reaction = Reaction::ignored();
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let kind = event.kind();
            for component in self.components.iter_mut() {
                if !component.subscriptions().contains(&kind) {
                    continue;
                }
                let outcome = component.handle(page, &event);
                queue.extend(outcome.signals.iter().filter_map(|s| PageEvent::signal(*s)));
                reaction.merge(outcome);
            }
        }
        reaction
    }
}
