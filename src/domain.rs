//! Domain module - Core entities and business logic
//!
//! Everything here is transport- and storage-agnostic: the card/comment
//! entities, the comment-widget text parser, the price-rank estimator and
//! the page-source boundary the crawl engine consumes.

pub mod card;
pub mod comment_parser;
pub mod page_source;
pub mod rank;

// Re-export commonly used items for convenience
pub use card::{Card, Comment, NewComment, card_url};
pub use comment_parser::parse_comment_block;
pub use page_source::{CardPage, CardPageFetch, CardPageSource};
pub use rank::{RankEstimator, RankVocabulary};
