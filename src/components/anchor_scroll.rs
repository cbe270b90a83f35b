use log::{debug, info};

use crate::config::SiteConfig;
use crate::events::{Component, EventKind, Modifiers, PageEvent, Reaction};
use crate::page::{Page, ScrollMode};

/// Height the sticky header covers plus the gap, measured now. Zero without a header.
pub fn header_offset<P: Page>(page: &P, header: Option<&P::Element>, gap: f64) -> f64 {
    match header {
        Some(header) => page.rect(header).height + gap,
        None => 0.0,
    }
}

/// Takes over in-page anchor clicks so targets land below the sticky header.
pub struct SmoothAnchorScroller<P: Page> {
    links: Vec<P::Element>,
    header: Option<P::Element>,
    header_gap: f64,
    skip_class: String,
    mode: ScrollMode,
}

impl<P: Page> SmoothAnchorScroller<P> {
    pub fn new(page: &P, config: &SiteConfig) -> Self {
        // The menu button is an in-page link too, but it has its own click handling.
        let menu_button = page.query(&config.selectors.menu_button);
        let links: Vec<_> = page
            .query_all(&config.selectors.in_page_links)
            .into_iter()
            .filter(|link| menu_button.as_ref() != Some(link))
            .collect();
        let mode = ScrollMode::for_reduced_motion(page.prefers_reduced_motion());
        info!("Smooth scrolling {} in-page links ({:?})", links.len(), mode);

        Self {
            links,
            header: page.query(&config.selectors.header),
            header_gap: config.header_gap,
            skip_class: config.markers.skip_link.clone(),
            mode,
        }
    }

    /// Where the page should scroll so `target` sits just under the header.
    pub fn destination(&self, page: &P, target: &P::Element) -> f64 {
        page.scroll_y() + page.rect(target).top
            - header_offset(page, self.header.as_ref(), self.header_gap)
    }

    fn on_click(&self, page: &P, target: &P::Element, modifiers: Modifiers) -> Reaction {
        let Some(link) = self.links.iter().find(|link| page.contains(link, target)) else {
            return Reaction::ignored();
        };
        if page.has_class(link, &self.skip_class) {
            return Reaction::ignored();
        }
        let Some(fragment) = page.attribute(link, "href") else {
            return Reaction::ignored();
        };
        let Some(id) = fragment.strip_prefix('#').filter(|id| !id.is_empty()) else {
            return Reaction::ignored();
        };
        let Some(section) = page.element_by_id(id) else {
            return Reaction::ignored();
        };
        // Leave new-tab/new-window gestures to the browser.
        if modifiers.any() {
            return Reaction::ignored();
        }

        let top = self.destination(page, &section);
        debug!("Scrolling to {} at {}", fragment, top);
        page.scroll_to(top, self.mode);
        page.push_fragment(&fragment);
        Reaction::prevented().emit(EventKind::Navigated)
    }
}

impl<P: Page> Component<P> for SmoothAnchorScroller<P> {
    fn name(&self) -> &'static str {
        "anchor-scroll"
    }

    fn subscriptions(&self) -> &[EventKind] {
        &[EventKind::Click]
    }

    fn handle(&mut self, page: &P, event: &PageEvent<P::Element>) -> Reaction {
        match event {
            PageEvent::Click {
                target: Some(target),
                modifiers,
            } => self.on_click(page, target, *modifiers),
            _ => Reaction::ignored(),
        }
    }
}
