use log::{debug, info};

use crate::components::viewport::{ViewportMode, ViewportModeDetector};
use crate::config::SiteConfig;
use crate::events::{Component, EventKind, PageEvent, Reaction};
use crate::page::Page;
use crate::state::BodyFlag;

const SUBSCRIPTIONS: &[EventKind] = &[
    EventKind::Click,
    EventKind::KeyDown,
    EventKind::Resize,
    EventKind::Navigated,
];

/// Elements the menu needs. Without both the menu stays inert.
struct MenuParts<E> {
    button: E,
    nav: E,
    /// The button's markup label, restored on desktop where the logo is a plain home link.
    home_label: Option<String>,
}

/// Mobile navigation: the header logo doubles as the menu toggle below the breakpoint.
pub struct MenuController<P: Page> {
    open: BodyFlag,
    parts: Option<MenuParts<P::Element>>,
    header: Option<P::Element>,
    viewport: ViewportModeDetector,
    open_label: String,
    subscriptions: &'static [EventKind],
}

impl<P: Page> MenuController<P> {
    pub fn new(page: &P, config: &SiteConfig) -> Self {
        let selectors = &config.selectors;
        let button = page.query(&selectors.menu_button);
        let nav = page.query(&selectors.menu);
        let parts = match (button, nav) {
            (Some(button), Some(nav)) => {
                let home_label = page
                    .attribute(&button, "aria-label")
                    .filter(|label| !label.is_empty());
                Some(MenuParts {
                    button,
                    nav,
                    home_label,
                })
            }
            _ => {
                info!("No menu button or nav on this page, mobile menu disabled");
                None
            }
        };
        let subscriptions: &'static [EventKind] = if parts.is_some() {
            SUBSCRIPTIONS
        } else {
            // the anchor scroller may still ask us to close
            &[EventKind::Navigated]
        };

        let mut controller = Self {
            open: BodyFlag::new(&config.markers.menu_open),
            parts,
            header: page.query(&selectors.header),
            viewport: ViewportModeDetector::new(config.desktop_query()),
            open_label: config.labels.open_menu_for(&page.lang()).to_string(),
            subscriptions,
        };
        controller.open.set(page, false);
        controller.sync_a11y(page);
        controller
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn close(&mut self, page: &P) {
        if self.open.set(page, false) {
            debug!("Menu closed");
        }
        self.sync_a11y(page);
    }

    fn toggle(&mut self, page: &P) {
        let next = !self.open.get();
        self.open.set(page, next);
        self.sync_a11y(page);
    }

    /// Recomputes label, popup and expanded markers for the current viewport mode.
    fn sync_a11y(&self, page: &P) {
        let Some(parts) = &self.parts else {
            return;
        };
        let button = &parts.button;
        match self.viewport.mode(page) {
            ViewportMode::Mobile => {
                page.set_attribute(button, "aria-label", &self.open_label);
                page.set_attribute(button, "aria-haspopup", "menu");
                page.set_attribute(button, "aria-expanded", bool_attr(self.open.get()));
            }
            ViewportMode::Desktop => {
                if let Some(label) = &parts.home_label {
                    page.set_attribute(button, "aria-label", label);
                }
                page.remove_attribute(button, "aria-haspopup");
                page.set_attribute(button, "aria-expanded", "false");
            }
        }
    }

    fn on_click(&mut self, page: &P, target: Option<&P::Element>) -> Reaction {
        if self.parts.is_none() {
            return Reaction::ignored();
        }

        // Outside clicks are checked first, the way a capturing listener sees them.
        if self.open.get() {
            let within_header = match (&self.header, target) {
                (Some(header), Some(target)) => page.contains(header, target),
                _ => false,
            };
            if !within_header {
                self.close(page);
            }
        }

        let Some(target) = target else {
            return Reaction::ignored();
        };

        let (on_button, on_nav_link) = match &self.parts {
            Some(parts) => (
                page.contains(&parts.button, target),
                page.contains(&parts.nav, target) && page.tag_name(target) == "a",
            ),
            None => return Reaction::ignored(),
        };

        if on_button {
            // Desktop: the logo is a normal link back to the top.
            if !self.viewport.is_mobile(page) {
                return Reaction::ignored();
            }
            self.toggle(page);
            return Reaction::prevented();
        }

        if on_nav_link {
            self.close(page);
        }
        Reaction::ignored()
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl<P: Page> Component<P> for MenuController<P> {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn subscriptions(&self) -> &[EventKind] {
        self.subscriptions
    }

    fn handle(&mut self, page: &P, event: &PageEvent<P::Element>) -> Reaction {
        match event {
            PageEvent::Click { target, .. } => self.on_click(page, target.as_ref()),
            PageEvent::KeyDown { key } if key == "Escape" => {
                self.close(page);
                Reaction::ignored()
            }
            PageEvent::Resize => {
                self.sync_a11y(page);
                Reaction::ignored()
            }
            PageEvent::Navigated => {
                self.close(page);
                Reaction::ignored()
            }
            _ => Reaction::ignored(),
        }
    }
}
