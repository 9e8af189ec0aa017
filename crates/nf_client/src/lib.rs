pub mod format;
pub mod gateway;
pub mod logging;
pub mod presenter;
pub mod scheduler;
pub mod seen;
pub mod sink;
pub mod view;

pub use gateway::GatewayClient;
pub use logging::{init_logging, Logger};
pub use presenter::{ClientConfig, FeedPresenter, RefreshOutcome};
pub use scheduler::FeedScheduler;
pub use seen::SeenSet;
pub use sink::{FeedSink, HtmlFileSink, MemorySink, MultiSink, TerminalSink};
pub use view::{ArticleKind, FeedText, FeedView, RenderedArticle};

pub mod prelude {
    pub use super::{ClientConfig, FeedPresenter, FeedScheduler, FeedSink, GatewayClient};
    pub use nf_core::{Article, Error, KeywordSet, NewsSource, Result};
}
