use std::fmt::Debug;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
pub mod fake;

/// Viewport-relative box of an element, as `getBoundingClientRect` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Smooth,
    Instant,
}

impl ScrollMode {
    pub fn for_reduced_motion(reduced: bool) -> Self {
        if reduced {
            ScrollMode::Instant
        } else {
            ScrollMode::Smooth
        }
    }
}

/// Everything the enhancements need from the host document and browser.
///
/// Mutating calls are best effort: implementations swallow platform errors,
/// the same way a missing element just turns a feature off.
pub trait Page {
    type Element: Clone + PartialEq + Debug;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn body(&self) -> Option<Self::Element>;
    fn root(&self) -> Option<Self::Element>;

    fn attribute(&self, el: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, el: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&self, el: &Self::Element, name: &str);
    fn has_class(&self, el: &Self::Element, class: &str) -> bool;
    fn toggle_class(&self, el: &Self::Element, class: &str, on: bool);
    fn text(&self, el: &Self::Element) -> Option<String>;
    fn set_text(&self, el: &Self::Element, text: &str);
    /// Lowercase tag name.
    fn tag_name(&self, el: &Self::Element) -> String;
    /// True when `node` is `ancestor` or sits anywhere below it.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;
    fn rect(&self, el: &Self::Element) -> Rect;

    fn scroll_y(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn matches_media(&self, query: &str) -> bool;
    fn scroll_to(&self, top: f64, mode: ScrollMode);
    /// Pushes a history entry for `fragment` (including the leading `#`) without reloading.
    fn push_fragment(&self, fragment: &str);
    /// Current `location.hash`, empty when there is none.
    fn location_fragment(&self) -> String;
    fn supports_intersection_observer(&self) -> bool;

    fn lang(&self) -> String {
        self.root()
            .and_then(|root| self.attribute(&root, "lang"))
            .unwrap_or_default()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.matches_media("(prefers-reduced-motion: reduce)")
    }
}
