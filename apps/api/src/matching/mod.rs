pub mod handlers;
pub mod scorer;
pub mod text;

pub use scorer::{KeywordMatchScorer, MatchResult, MatchScorer};
