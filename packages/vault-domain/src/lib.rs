pub mod expansion;
pub mod relevance;
pub mod snippet;
pub mod tag;
