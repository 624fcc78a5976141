mod catalog;
mod channel;
mod load;
mod video;

pub use catalog::{BuildResult, Catalog, Problem as LoadCatalogProblem, ResolvedVideo};
pub use channel::Channel;
pub use load::load_catalog;
pub use video::Video;

/// Resolves ids stored in the persisted collections against the canonical
/// item source. Collections hold ids only, so rendering goes through this
/// at display time; an id that resolves to nothing is a stale reference.
pub trait Resolver: Send + Sync {
    fn resolve_video(&self, id: &str) -> Option<&Video>;
    fn resolve_channel(&self, id: &str) -> Option<&Channel>;
}
