pub mod search;
pub mod store;
pub mod types;

pub use search::Search;
pub use store::NGramIndex;
pub use types::{IndexConfig, IndexStats, MIN_FRAGMENT_FLOOR, StrId};
