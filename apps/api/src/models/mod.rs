pub mod ai_query;
pub mod article;
pub mod query;

pub use ai_query::{AiModel, AiQueryRequest, QueryType, UpstreamQuery};
pub use article::Article;
pub use query::{NewQueryRecord, QueryRecord};
