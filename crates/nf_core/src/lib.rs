pub mod error;
pub mod keywords;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use keywords::KeywordSet;
pub use source::NewsSource;
pub use types::{Article, ErrorBody, QueryResult, UNKNOWN_SOURCE};
