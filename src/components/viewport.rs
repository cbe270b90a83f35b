use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    Mobile,
    Desktop,
}

/// Live media-query check, never cached.
#[derive(Debug, Clone)]
pub struct ViewportModeDetector {
    desktop_query: String,
}

impl ViewportModeDetector {
    pub fn new(desktop_query: impl Into<String>) -> Self {
        Self {
            desktop_query: desktop_query.into(),
        }
    }

    pub fn mode<P: Page>(&self, page: &P) -> ViewportMode {
        if page.matches_media(&self.desktop_query) {
            ViewportMode::Desktop
        } else {
            ViewportMode::Mobile
        }
    }

    pub fn is_mobile<P: Page>(&self, page: &P) -> bool {
        self.mode(page) == ViewportMode::Mobile
    }
}
