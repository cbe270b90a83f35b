//! Progressive enhancements for a one-page marketing site: the mobile menu,
//! header-aware anchor scrolling, the top-of-page flag and the nav scroll spy.
//!
//! Everything works against the [`page::Page`] trait; in the browser that is
//! [`page::web::WebPage`] and `start` wires it up on load.

pub mod config;
pub mod error;
pub mod events;
pub mod page;
pub mod site;
pub mod state;

pub mod components {
    pub mod anchor_scroll;
    pub mod menu;
    pub mod scroll_spy;
    pub mod top_of_page;
    pub mod viewport;
}

#[cfg(target_arch = "wasm32")]
mod runtime;

#[cfg(target_arch = "wasm32")]
pub use runtime::{install, start};

pub use config::SiteConfig;
pub use site::Site;
