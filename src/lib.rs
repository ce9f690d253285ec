pub mod config;
pub mod error;
pub mod favicon_handler;
pub mod favicon_sources;
pub mod icon_fetcher;


pub use config::ServerConfig;
pub use error::FaviconError;
pub use favicon_handler::{collect_favicons, favicons_handler, router, serve, AppState};
pub use favicon_sources::{default_sources, FaviconSource, FaviconTarget};
pub use icon_fetcher::{FetchResult, IconFetcher, ReqwestIconFetcher};
