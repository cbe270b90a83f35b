use log::{warn, Level};
use serde::Deserialize;
use thiserror::Error;

use crate::page::Page;

/// Pages can override any of these with a JSON block:
/// `<script type="application/json" data-site-config>{ "desktopMinWidth": 960 }</script>`
pub const CONFIG_SELECTOR: &str = "script[data-site-config]";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be within 0..=1, got {value}")]
    RatioOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("spyRootMargin must be one to four px or % lengths, got {0:?}")]
    RootMargin(String),
}

/// Same grammar `IntersectionObserver` accepts for `rootMargin`: `-30% 0px -60% 0px`.
fn is_root_margin(margin: &str) -> bool {
    let parts: Vec<&str> = margin.split_whitespace().collect();
    (1..=4).contains(&parts.len())
        && parts.iter().all(|part| {
            part.strip_suffix("px")
                .or_else(|| part.strip_suffix('%'))
                .map_or(false, |n| n.parse::<f64>().map_or(false, f64::is_finite))
        })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Matches the stylesheet's `@media (min-width: 860px)`.
    pub desktop_min_width: u32,
    /// Breathing room left between the sticky header and a scroll target.
    pub header_gap: f64,
    pub top_scroll_threshold: f64,
    pub hero_visible_ratio: f64,
    pub hero_thresholds: Vec<f64>,
    pub spy_root_margin: String,
    pub spy_threshold: f64,
    /// Share of the viewport height below the header used as the scroll-spy probe.
    pub spy_probe_ratio: f64,
    pub selectors: Selectors,
    pub markers: Markers,
    pub labels: Labels,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            desktop_min_width: 860,
            header_gap: 8.0,
            top_scroll_threshold: 12.0,
            hero_visible_ratio: 0.55,
            hero_thresholds: vec![0.0, 0.55, 1.0],
            spy_root_margin: "-30% 0px -60% 0px".to_string(),
            spy_threshold: 0.01,
            spy_probe_ratio: 0.25,
            selectors: Selectors::default(),
            markers: Markers::default(),
            labels: Labels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub header: String,
    pub menu_button: String,
    pub menu: String,
    pub hero_id: String,
    pub nav_links: String,
    pub in_page_links: String,
    pub year: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            header: "[data-header]".to_string(),
            menu_button: "[data-menu-button]".to_string(),
            menu: "[data-menu]".to_string(),
            hero_id: "top".to_string(),
            nav_links: "#primary-nav a[href^=\"#\"]".to_string(),
            in_page_links: "a[href^=\"#\"]".to_string(),
            year: "[data-year]".to_string(),
        }
    }
}

/// Class names toggled on `<body>` and the per-link opt-out class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Markers {
    pub top: String,
    pub menu_open: String,
    pub skip_link: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            top: "is-top".to_string(),
            menu_open: "menu-open".to_string(),
            skip_link: "skip-link".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub open_menu: String,
    pub open_menu_es: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            open_menu: "Open menu".to_string(),
            open_menu_es: "Abrir menú".to_string(),
        }
    }
}

impl Labels {
    /// Picks by the primary language subtag, so `es` and `es-MX` both get Spanish.
    pub fn open_menu_for(&self, lang: &str) -> &str {
        let primary = lang.split(['-', '_']).next().unwrap_or("");
        if primary.eq_ignore_ascii_case("es") {
            &self.open_menu_es
        } else {
            &self.open_menu
        }
    }
}

impl SiteConfig {
    pub fn desktop_query(&self) -> String {
        format!("(min-width: {}px)", self.desktop_min_width)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("heroVisibleRatio", self.hero_visible_ratio),
            ("spyThreshold", self.spy_threshold),
            ("spyProbeRatio", self.spy_probe_ratio),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { field, value });
            }
        }
        if let Some(&value) = self
            .hero_thresholds
            .iter()
            .find(|t| !(0.0..=1.0).contains(*t))
        {
            return Err(ConfigError::RatioOutOfRange {
                field: "heroThresholds",
                value,
            });
        }
        let lengths = [
            ("headerGap", self.header_gap),
            ("topScrollThreshold", self.top_scroll_threshold),
        ];
        for (field, value) in lengths {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if !is_root_margin(&self.spy_root_margin) {
            return Err(ConfigError::RootMargin(self.spy_root_margin.clone()));
        }
        Ok(())
    }

    /// Reads the optional inline override. A broken block is logged and ignored.
    pub fn from_page<P: Page>(page: &P) -> Self {
        let Some(json) = page
            .query(CONFIG_SELECTOR)
            .and_then(|el| page.text(&el))
        else {
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring site config: {}", e);
                Self::default()
            }
        }
    }
}
