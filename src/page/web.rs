use wasm_bindgen::{JsCast, JsValue};
use web_sys::{js_sys, Document, Element, Node, ScrollBehavior, ScrollToOptions, Window};

use super::{Page, Rect, ScrollMode};
use crate::error::PageError;

/// The live document, through `web_sys`.
#[derive(Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::NoWindow)?;
        let document = window.document().ok_or(PageError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Page for WebPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Into::into)
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn attribute(&self, el: &Element, name: &str) -> Option<String> {
        el.get_attribute(name)
    }

    fn set_attribute(&self, el: &Element, name: &str, value: &str) {
        let _ = el.set_attribute(name, value);
    }

    fn remove_attribute(&self, el: &Element, name: &str) {
        let _ = el.remove_attribute(name);
    }

    fn has_class(&self, el: &Element, class: &str) -> bool {
        el.class_list().contains(class)
    }

    fn toggle_class(&self, el: &Element, class: &str, on: bool) {
        let _ = el.class_list().toggle_with_force(class, on);
    }

    fn text(&self, el: &Element) -> Option<String> {
        el.text_content()
    }

    fn set_text(&self, el: &Element, text: &str) {
        el.set_text_content(Some(text));
    }

    fn tag_name(&self, el: &Element) -> String {
        el.tag_name().to_ascii_lowercase()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &Node = node;
        ancestor.contains(Some(node))
    }

    fn rect(&self, el: &Element) -> Rect {
        let rect = el.get_bounding_client_rect();
        Rect::new(rect.top(), rect.height())
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn matches_media(&self, query: &str) -> bool {
        matches!(self.window.match_media(query), Ok(Some(list)) if list.matches())
    }

    fn scroll_to(&self, top: f64, mode: ScrollMode) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match mode {
            ScrollMode::Smooth => ScrollBehavior::Smooth,
            ScrollMode::Instant => ScrollBehavior::Auto,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn push_fragment(&self, fragment: &str) {
        if let Ok(history) = self.window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(fragment));
        }
    }

    fn location_fragment(&self) -> String {
        self.window.location().hash().unwrap_or_default()
    }

    fn supports_intersection_observer(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }
}
