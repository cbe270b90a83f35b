use log::debug;

use crate::page::Page;

/// A boolean UI state mirrored as a class on `<body>` so the stylesheet can react.
#[derive(Debug, Clone)]
pub struct BodyFlag {
    class: String,
    value: bool,
}

impl BodyFlag {
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            value: false,
        }
    }

    pub fn get(&self) -> bool {
        self.value
    }

    /// Returns whether the value changed. The class is re-asserted either way.
    pub fn set<P: Page>(&mut self, page: &P, value: bool) -> bool {
        let changed = self.value != value;
        self.value = value;
        if let Some(body) = page.body() {
            page.toggle_class(&body, &self.class, value);
        }
        if changed {
            debug!("{} -> {}", self.class, value);
        }
        changed
    }
}
