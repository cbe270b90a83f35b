//! In-memory page used by the unit tests.

use std::cell::{Cell, RefCell};

use super::{Page, Rect, ScrollMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<usize>,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    doc_top: f64,
    height: f64,
    sticky: bool,
}

impl Node {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }
}

pub struct FakePage {
    nodes: RefCell<Vec<Node>>,
    scroll_y: Cell<f64>,
    viewport_height: Cell<f64>,
    viewport_width: Cell<f64>,
    reduced_motion: Cell<bool>,
    observer_support: Cell<bool>,
    fragment: RefCell<String>,
    pub scrolls: RefCell<Vec<(f64, ScrollMode)>>,
    pub history: RefCell<Vec<String>>,
}

impl FakePage {
    /// An empty document: `<html>` (node 0) holding `<body>` (node 1).
    pub fn new() -> Self {
        let page = Self {
            nodes: RefCell::new(Vec::new()),
            scroll_y: Cell::new(0.0),
            viewport_height: Cell::new(800.0),
            viewport_width: Cell::new(1280.0),
            reduced_motion: Cell::new(false),
            observer_support: Cell::new(true),
            fragment: RefCell::new(String::new()),
            scrolls: RefCell::new(Vec::new()),
            history: RefCell::new(Vec::new()),
        };
        page.nodes.borrow_mut().push(Node {
            tag: "html".into(),
            ..Node::default()
        });
        page.append(NodeId(0), "body", &[]);
        page
    }

    /// Children must be appended in document order.
    pub fn append(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_string(),
            parent: Some(parent.0),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Node::default()
        });
        NodeId(nodes.len() - 1)
    }

    /// Document-relative placement.
    pub fn place(&self, id: NodeId, top: f64, height: f64) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[id.0].doc_top = top;
        nodes[id.0].height = height;
    }

    pub fn make_sticky(&self, id: NodeId) {
        self.nodes.borrow_mut()[id.0].sticky = true;
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.scroll_y.set(y);
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    pub fn set_reduced_motion(&self, on: bool) {
        self.reduced_motion.set(on);
    }

    pub fn set_observer_support(&self, on: bool) {
        self.observer_support.set(on);
    }

    /// Simulates a back/forward navigation landing on `fragment`.
    pub fn set_fragment(&self, fragment: &str) {
        *self.fragment.borrow_mut() = fragment.to_string();
    }

    pub fn body_id(&self) -> NodeId {
        NodeId(1)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[id.0].attr(name).map(str::to_string)
    }

    fn matches_compound(&self, idx: usize, compound: &Compound) -> bool {
        let nodes = self.nodes.borrow();
        let node = &nodes[idx];
        if let Some(tag) = &compound.tag {
            if &node.tag != tag {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !compound
            .classes
            .iter()
            .all(|c| node.classes().any(|have| have == c))
        {
            return false;
        }
        compound.attrs.iter().all(|test| match node.attr(&test.name) {
            None => false,
            Some(value) => match &test.op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                AttrOp::Prefix(v) => value.starts_with(v.as_str()),
            },
        })
    }

    fn matches(&self, idx: usize, selector: &[Compound]) -> bool {
        let Some((last, ancestors)) = selector.split_last() else {
            return false;
        };
        if !self.matches_compound(idx, last) {
            return false;
        }
        let mut pending = ancestors.iter().rev().peekable();
        let mut cursor = self.nodes.borrow()[idx].parent;
        while let Some(compound) = pending.peek() {
            let Some(at) = cursor else {
                return false;
            };
            if self.matches_compound(at, compound) {
                pending.next();
            }
            cursor = self.nodes.borrow()[at].parent;
        }
        true
    }
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug)]
struct AttrTest {
    name: String,
    op: AttrOp,
}

#[derive(Debug)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

/// Supports `tag`, `#id`, `.class`, `[attr]`, `[attr="v"]`, `[attr^="v"]`
/// and the descendant combinator.
fn parse_selector(selector: &str) -> Vec<Compound> {
    selector
        .split_whitespace()
        .map(|part| {
            let mut compound = Compound::default();
            let mut chars = part.chars().peekable();
            while let Some(&c) = chars.peek() {
                match c {
                    '#' => {
                        chars.next();
                        compound.id = Some(take_ident(&mut chars));
                    }
                    '.' => {
                        chars.next();
                        compound.classes.push(take_ident(&mut chars));
                    }
                    '[' => {
                        chars.next();
                        let name = take_ident(&mut chars);
                        let mut op = String::new();
                        while let Some(&c) = chars.peek() {
                            if c == ']' || c == '"' {
                                break;
                            }
                            op.push(c);
                            chars.next();
                        }
                        let mut value = String::new();
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            for c in chars.by_ref() {
                                if c == '"' {
                                    break;
                                }
                                value.push(c);
                            }
                        }
                        // closing bracket
                        chars.next();
                        let op = match op.as_str() {
                            "^=" => AttrOp::Prefix(value),
                            "=" => AttrOp::Equals(value),
                            _ => AttrOp::Exists,
                        };
                        compound.attrs.push(AttrTest { name, op });
                    }
                    _ => {
                        let tag = take_ident(&mut chars);
                        if tag.is_empty() {
                            chars.next();
                        } else {
                            compound.tag = Some(tag);
                        }
                    }
                }
            }
            compound
        })
        .collect()
}

impl Page for FakePage {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let parsed = parse_selector(selector);
        let len = self.nodes.borrow().len();
        (0..len)
            .filter(|&idx| self.matches(idx, &parsed))
            .map(NodeId)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .position(|n| n.attr("id") == Some(id))
            .map(NodeId)
    }

    fn body(&self) -> Option<NodeId> {
        Some(NodeId(1))
    }

    fn root(&self) -> Option<NodeId> {
        Some(NodeId(0))
    }

    fn attribute(&self, el: &NodeId, name: &str) -> Option<String> {
        self.attr(*el, name)
    }

    fn set_attribute(&self, el: &NodeId, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let attrs = &mut nodes[el.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&self, el: &NodeId, name: &str) {
        self.nodes.borrow_mut()[el.0].attrs.retain(|(k, _)| k != name);
    }

    fn has_class(&self, el: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[el.0].classes().any(|c| c == class)
    }

    fn toggle_class(&self, el: &NodeId, class: &str, on: bool) {
        let mut classes: Vec<String> = self.nodes.borrow()[el.0]
            .classes()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if on {
            classes.push(class.to_string());
        }
        self.set_attribute(el, "class", &classes.join(" "));
    }

    fn text(&self, el: &NodeId) -> Option<String> {
        self.nodes.borrow()[el.0].text.clone()
    }

    fn set_text(&self, el: &NodeId, text: &str) {
        self.nodes.borrow_mut()[el.0].text = Some(text.to_string());
    }

    fn tag_name(&self, el: &NodeId) -> String {
        self.nodes.borrow()[el.0].tag.clone()
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut cursor = Some(node.0);
        while let Some(at) = cursor {
            if at == ancestor.0 {
                return true;
            }
            cursor = nodes[at].parent;
        }
        false
    }

    fn rect(&self, el: &NodeId) -> Rect {
        let nodes = self.nodes.borrow();
        let node = &nodes[el.0];
        if node.sticky {
            Rect::new(node.doc_top, node.height)
        } else {
            Rect::new(node.doc_top - self.scroll_y.get(), node.height)
        }
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height.get()
    }

    fn matches_media(&self, query: &str) -> bool {
        if query == "(prefers-reduced-motion: reduce)" {
            return self.reduced_motion.get();
        }
        query
            .strip_prefix("(min-width:")
            .and_then(|rest| rest.trim().strip_suffix("px)"))
            .and_then(|px| px.trim().parse::<f64>().ok())
            .map(|min| self.viewport_width.get() >= min)
            .unwrap_or(false)
    }

    fn scroll_to(&self, top: f64, mode: ScrollMode) {
        self.scrolls.borrow_mut().push((top, mode));
        self.scroll_y.set(top);
    }

    fn push_fragment(&self, fragment: &str) {
        self.history.borrow_mut().push(fragment.to_string());
        self.set_fragment(fragment);
    }

    fn location_fragment(&self) -> String {
        self.fragment.borrow().clone()
    }

    fn supports_intersection_observer(&self) -> bool {
        self.observer_support.get()
    }
}

/// Handles into [`brochure`].
pub struct Brochure {
    pub page: FakePage,
    pub header: NodeId,
    pub menu_button: NodeId,
    pub nav: NodeId,
    pub nav_features: NodeId,
    pub nav_pricing: NodeId,
    pub nav_faq: NodeId,
    pub nav_missing: NodeId,
    pub skip_link: NodeId,
    pub hero: NodeId,
    pub hero_cta: NodeId,
    pub hero_cta_label: NodeId,
    pub features: NodeId,
    pub pricing: NodeId,
    pub faq: NodeId,
    pub empty_link: NodeId,
    pub year: NodeId,
}

/// A typical one-page site: sticky 64px header holding the logo/menu button
/// and the primary nav, a 600px hero and three 800px sections.
pub fn brochure(lang: &str) -> Brochure {
    let page = FakePage::new();
    page.set_attribute(&NodeId(0), "lang", lang);
    let body = page.body_id();

    let skip_link = page.append(body, "a", &[("class", "skip-link"), ("href", "#main")]);
    let header = page.append(body, "header", &[("data-header", "")]);
    page.place(header, 0.0, 64.0);
    page.make_sticky(header);
    let menu_button = page.append(
        header,
        "a",
        &[
            ("href", "#top"),
            ("data-menu-button", ""),
            ("aria-label", "Home"),
            ("aria-controls", "primary-nav"),
        ],
    );
    let nav = page.append(header, "nav", &[("id", "primary-nav"), ("data-menu", "")]);
    let nav_features = page.append(nav, "a", &[("href", "#features")]);
    let nav_pricing = page.append(nav, "a", &[("href", "#pricing")]);
    let nav_faq = page.append(nav, "a", &[("href", "#faq")]);
    let nav_missing = page.append(nav, "a", &[("href", "#missing")]);

    let main = page.append(body, "main", &[("id", "main")]);
    page.place(main, 0.0, 3000.0);
    let hero = page.append(main, "section", &[("id", "top")]);
    page.place(hero, 0.0, 600.0);
    let hero_cta = page.append(hero, "a", &[("href", "#pricing"), ("class", "button")]);
    page.place(hero_cta, 400.0, 48.0);
    let hero_cta_label = page.append(hero_cta, "span", &[]);
    let features = page.append(main, "section", &[("id", "features")]);
    page.place(features, 600.0, 800.0);
    let pricing = page.append(main, "section", &[("id", "pricing")]);
    page.place(pricing, 1400.0, 800.0);
    let faq = page.append(main, "section", &[("id", "faq")]);
    page.place(faq, 2200.0, 800.0);

    let footer = page.append(body, "footer", &[]);
    let empty_link = page.append(footer, "a", &[("href", "#")]);
    let year = page.append(footer, "span", &[("data-year", "")]);

    Brochure {
        page,
        header,
        menu_button,
        nav,
        nav_features,
        nav_pricing,
        nav_faq,
        nav_missing,
        skip_link,
        hero,
        hero_cta,
        hero_cta_label,
        features,
        pricing,
        faq,
        empty_link,
        year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matcher_handles_descendants_and_prefixes() {
        let site = brochure("en");
        let links = site.page.query_all("#primary-nav a[href^=\"#\"]");
        assert_eq!(
            links,
            vec![site.nav_features, site.nav_pricing, site.nav_faq, site.nav_missing]
        );
        assert_eq!(site.page.query("[data-menu-button]"), Some(site.menu_button));
        assert_eq!(site.page.query("a.skip-link"), Some(site.skip_link));
        assert_eq!(site.page.query("section#faq"), Some(site.faq));
        assert!(site.page.query("[data-site-config]").is_none());
    }

    #[test]
    fn rects_follow_scroll_except_sticky() {
        let site = brochure("en");
        site.page.set_scroll_y(500.0);
        assert_eq!(site.page.rect(&site.features), Rect::new(100.0, 800.0));
        assert_eq!(site.page.rect(&site.header), Rect::new(0.0, 64.0));
    }
}
