use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    js_sys, AddEventListenerOptions, Element, Event, EventTarget,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    MouseEvent,
};

use crate::config::{self, SiteConfig};
use crate::error::PageError;
use crate::events::{EventKind, IntersectionEntry, Modifiers, Observation, PageEvent};
use crate::page::web::WebPage;
use crate::site::Site;

type SharedSite = Rc<RefCell<Site<WebPage>>>;

fn deliver(site: &SharedSite, page: &WebPage, event: PageEvent<Element>) -> bool {
    match site.try_borrow_mut() {
        Ok(mut site) => site.dispatch(page, event).prevent_default,
        Err(_) => {
            warn!("Dropped {:?} event raised while another was being handled", event.kind());
            false
        }
    }
}

fn listen<F>(
    target: &EventTarget,
    name: &str,
    options: &AddEventListenerOptions,
    site: &SharedSite,
    page: &WebPage,
    to_event: F,
) -> Result<(), PageError>
where
    F: Fn(&Event) -> PageEvent<Element> + 'static,
{
    let site = site.clone();
    let page = page.clone();
    let callback = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
        if deliver(&site, &page, to_event(&e)) {
            e.prevent_default();
        }
    });
    target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        callback.as_ref().unchecked_ref(),
        options,
    )?;
    // listeners live as long as the page
    callback.forget();
    Ok(())
}

fn click_event(e: &Event) -> PageEvent<Element> {
    let modifiers = e
        .dyn_ref::<MouseEvent>()
        .map(|m| Modifiers {
            meta: m.meta_key(),
            ctrl: m.ctrl_key(),
            shift: m.shift_key(),
            alt: m.alt_key(),
        })
        .unwrap_or_default();
    PageEvent::Click {
        target: e.target().and_then(|t| t.dyn_into::<Element>().ok()),
        modifiers,
    }
}

fn key_event(e: &Event) -> PageEvent<Element> {
    PageEvent::KeyDown {
        key: e
            .dyn_ref::<KeyboardEvent>()
            .map(|k| k.key())
            .unwrap_or_default(),
    }
}

fn observe(
    observation: Observation<Element>,
    site: &SharedSite,
    page: &WebPage,
) -> Result<(), PageError> {
    let watch = observation.watch;
    let site = site.clone();
    let page = page.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
        let entries = entries
            .iter()
            .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
            .map(|entry| IntersectionEntry {
                target: entry.target(),
                is_intersecting: entry.is_intersecting(),
                ratio: entry.intersection_ratio(),
            })
            .collect();
        deliver(&site, &page, PageEvent::Intersection { watch, entries });
    });

    let init = IntersectionObserverInit::new();
    init.set_root_margin(&observation.root_margin);
    let thresholds: js_sys::Array = observation
        .thresholds
        .iter()
        .map(|t| JsValue::from_f64(*t))
        .collect();
    init.set_threshold(&thresholds);

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for target in &observation.targets {
        observer.observe(target);
    }
    callback.forget();
    Ok(())
}

/// Hooks the booted site up to the browser events it subscribed to.
pub fn install(site: Site<WebPage>, page: &WebPage) -> Result<(), PageError> {
    let kinds = site.subscriptions();
    let observations = site.observations();
    let site: SharedSite = Rc::new(RefCell::new(site));

    let document: &EventTarget = page.document();
    let window: &EventTarget = page.window();

    let capture = AddEventListenerOptions::new();
    capture.set_capture(true);
    let passive = AddEventListenerOptions::new();
    passive.set_passive(true);
    let plain = AddEventListenerOptions::new();

    for kind in kinds {
        let Some(name) = kind.dom_name() else {
            continue;
        };
        match kind {
            EventKind::Click => listen(document, name, &capture, &site, page, click_event)?,
            EventKind::KeyDown => listen(document, name, &plain, &site, page, key_event)?,
            EventKind::Scroll => listen(window, name, &passive, &site, page, |_| PageEvent::Scroll)?,
            EventKind::Resize => listen(window, name, &passive, &site, page, |_| PageEvent::Resize)?,
            EventKind::PopState => {
                listen(window, name, &plain, &site, page, |_| PageEvent::PopState)?
            }
            EventKind::Intersection | EventKind::Navigated => {}
        }
    }
    // A rejected observer only costs its own feature.
    for observation in observations {
        let watch = observation.watch;
        if let Err(e) = observe(observation, &site, page) {
            error!("Could not observe {:?}: {}", watch, e);
        }
    }
    Ok(())
}

fn run(page: &WebPage) -> Result<(), PageError> {
    let config = SiteConfig::from_page(page);
    let site = Site::boot(page, &config);
    install(site, page)
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(config::log_level());

    let page = match WebPage::new() {
        Ok(page) => page,
        Err(e) => {
            error!("Site enhancements disabled: {}", e);
            return;
        }
    };

    // Loaded from <head> without `defer`: wait for the markup.
    if page.document().ready_state() == "loading" {
        info!("Waiting for DOMContentLoaded");
        let deferred = page.clone();
        let callback = Closure::once(move || {
            if let Err(e) = run(&deferred) {
                error!("Site enhancements disabled: {}", e);
            }
        });
        if let Err(e) = page.document().add_event_listener_with_callback(
            "DOMContentLoaded",
            callback.as_ref().unchecked_ref(),
        ) {
            error!("Site enhancements disabled: {}", PageError::from(e));
            return;
        }
        callback.forget();
        return;
    }

    if let Err(e) = run(&page) {
        error!("Site enhancements disabled: {}", e);
    }
}
