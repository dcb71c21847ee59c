pub mod excerpt;
pub mod ranker;

pub use excerpt::EXCERPT_RADIUS;
pub use ranker::{SearchError, SearchQuery, SearchResult, Searcher};
