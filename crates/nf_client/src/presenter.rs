use nf_core::{Article, KeywordSet, NewsSource, Result};

use crate::format::{format_timestamp, truncate_summary, SUMMARY_MAX_CHARS};
use crate::logging::Logger;
use crate::seen::{SeenSet, DEFAULT_SEEN_CAPACITY};
use crate::sink::FeedSink;
use crate::view::{ArticleKind, FeedText, FeedView, RenderedArticle};

pub const DEFAULT_MAX_ITEMS: usize = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Keywords of the first query of every cycle.
    pub primary: KeywordSet,
    pub max_items: usize,
    pub summary_chars: usize,
    /// 0 keeps every fingerprint for the life of the process.
    pub seen_capacity: usize,
    pub text: FeedText,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary: KeywordSet::primary(),
            max_items: DEFAULT_MAX_ITEMS,
            summary_chars: SUMMARY_MAX_CHARS,
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            text: FeedText::default(),
        }
    }
}

/// How a refresh cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The primary query had results.
    Primary { rendered: usize },
    /// The primary query was empty and the fallback query was shown instead.
    Placeholder { rendered: usize },
    /// A query failed; the error message was shown.
    Failed,
    /// Articles were fetched but the sink rejected the view. Nothing was
    /// recorded as seen, so they stay eligible next cycle.
    NotDisplayed,
}

impl RefreshOutcome {
    pub fn rendered(&self) -> usize {
        match self {
            RefreshOutcome::Primary { rendered } | RefreshOutcome::Placeholder { rendered } => {
                *rendered
            }
            RefreshOutcome::Failed | RefreshOutcome::NotDisplayed => 0,
        }
    }
}

struct Fetched {
    articles: Option<Vec<Article>>,
    placeholder: bool,
}

/// Fetches from a [`NewsSource`], falls back when the primary query is empty,
/// drops articles already shown and hands the result to a [`FeedSink`].
pub struct FeedPresenter<S, K> {
    source: S,
    sink: K,
    seen: SeenSet,
    config: ClientConfig,
    cycle: u64,
}

impl<S: NewsSource, K: FeedSink> FeedPresenter<S, K> {
    pub fn new(source: S, sink: K, config: ClientConfig) -> Self {
        Self {
            source,
            sink,
            seen: SeenSet::new(config.seen_capacity),
            config,
            cycle: 0,
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Runs one cycle: at most two queries, then a full re-render.
    ///
    /// Failures are shown to the viewer and leave the seen-set alone; nothing
    /// is retried until the next cycle.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        self.cycle += 1;
        let logger = self.logger();
        logger.info(&format!("🔄 Refreshing from {}", self.source.name()));

        let fetched = fetch(&self.source, &self.config.primary, &logger).await;
        match fetched {
            Ok(fetched) => match self.render(fetched.articles.as_deref(), fetched.placeholder) {
                Ok(view) => {
                    let rendered = view.items().len();
                    logger.info(&format!("✨ Rendered {} article(s)", rendered));
                    if fetched.placeholder {
                        RefreshOutcome::Placeholder { rendered }
                    } else {
                        RefreshOutcome::Primary { rendered }
                    }
                }
                Err(e) => {
                    logger.error(&format!("❌ Failed to display feed: {}", e));
                    RefreshOutcome::NotDisplayed
                }
            },
            Err(e) => {
                logger.error(&format!("❌ Failed to fetch news: {}", e));
                let view = FeedView::Error(self.config.text.load_failed.clone());
                if let Err(e) = self.sink.show(&view, &self.config.text) {
                    logger.warn(&format!("⚠️ Failed to display error: {}", e));
                }
                RefreshOutcome::Failed
            }
        }
    }

    /// Filters, trims and shows `articles`. Fingerprints are recorded only
    /// once the sink has accepted the view.
    pub fn render(&mut self, articles: Option<&[Article]>, is_placeholder: bool) -> Result<FeedView> {
        let logger = self.logger();
        let (view, fingerprints) = self.build_view(articles, is_placeholder, &logger);
        self.sink.show(&view, &self.config.text)?;

        for fingerprint in fingerprints {
            self.seen.insert(fingerprint);
        }
        logger.debug(&format!("seen-set holds {} fingerprint(s)", self.seen.len()));
        Ok(view)
    }

    fn logger(&self) -> Logger {
        Logger::new().with_new_prefixes(format!("[cycle {}]", self.cycle))
    }

    fn build_view(
        &self,
        articles: Option<&[Article]>,
        is_placeholder: bool,
        logger: &Logger,
    ) -> (FeedView, Vec<String>) {
        let no_news = || FeedView::NoNews(self.config.text.no_news.clone());

        let Some(articles) = articles.filter(|a| !a.is_empty()) else {
            logger.info("📭 No articles returned");
            return (no_news(), Vec::new());
        };

        let fresh: Vec<&Article> = articles
            .iter()
            .filter(|a| !self.seen.contains(&a.fingerprint()))
            .take(self.config.max_items)
            .collect();

        if fresh.is_empty() {
            logger.info(&format!("⏭️ All {} article(s) already shown", articles.len()));
            return (no_news(), Vec::new());
        }

        let kind = if is_placeholder {
            ArticleKind::Placeholder
        } else {
            ArticleKind::Important
        };

        let fingerprints = fresh.iter().map(|a| a.fingerprint()).collect();
        let items = fresh
            .into_iter()
            .map(|article| RenderedArticle {
                title: article.title.clone(),
                published: format_timestamp(article),
                source: article.source().to_string(),
                summary: truncate_summary(
                    article.description.as_deref().unwrap_or_default(),
                    self.config.summary_chars,
                ),
                link: article.link.clone(),
                kind,
            })
            .collect();

        (FeedView::Items(items), fingerprints)
    }
}

async fn fetch<S: NewsSource>(source: &S, primary: &KeywordSet, logger: &Logger) -> Result<Fetched> {
    let result = source.query(Some(primary)).await?;
    if !result.is_empty() {
        logger.info(&format!("📰 {} primary result(s)", result.total_results));
        return Ok(Fetched {
            articles: result.into_articles(),
            placeholder: false,
        });
    }

    let logger = logger.clone().with_prefix("[fallback]".to_string());
    logger.info("🔁 No primary results, querying fallback");
    let fallback = source.query(None).await?;
    logger.info(&format!("📰 {} fallback result(s)", fallback.total_results));
    Ok(Fetched {
        articles: fallback.into_articles(),
        placeholder: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use chrono::{DateTime, Local};
    use nf_core::{Error, QueryResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued responses and records which keywords each query used.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<QueryResult>>>,
        calls: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSource {
        fn with(responses: Vec<Result<QueryResult>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn push(&self, response: Result<QueryResult>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> Vec<Option<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn query(&self, keywords: Option<&KeywordSet>) -> Result<QueryResult> {
            self.calls
                .lock()
                .unwrap()
                .push(keywords.map(|k| k.to_search_terms()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::InvalidResponse("no scripted response".to_string())))
        }
    }

    fn article(title: &str, description: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            description: description.map(str::to_string),
            pub_date: "2024-01-01T10:00:00Z".to_string(),
            source_id: Some("x".to_string()),
            link: format!("https://example.com/{title}"),
        }
    }

    fn result(articles: Vec<Article>) -> QueryResult {
        QueryResult {
            total_results: articles.len() as u64,
            results: Some(articles),
        }
    }

    fn presenter(source: ScriptedSource) -> (FeedPresenter<ScriptedSource, MemorySink>, MemorySink) {
        let sink = MemorySink::new();
        (FeedPresenter::new(source, sink.clone(), ClientConfig::default()), sink)
    }

    fn no_news() -> FeedView {
        FeedView::NoNews(FeedText::default().no_news)
    }

    #[tokio::test]
    async fn test_primary_results_render_as_important() {
        let source = ScriptedSource::with(vec![Ok(result(vec![
            article("A", Some("d1")),
            article("B", Some("d2")),
        ]))]);
        let (mut presenter, sink) = presenter(source);

        let outcome = presenter.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Primary { rendered: 2 });
        assert_eq!(presenter.source.calls().len(), 1);
        assert!(presenter.seen().contains("Ad1"));
        assert!(presenter.seen().contains("Bd2"));

        let view = sink.last().unwrap();
        let items = view.items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.kind == ArticleKind::Important));

        let expected_time = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        assert_eq!(items[0].published, expected_time);
        assert_eq!(items[0].source, "x");
        assert_eq!(items[0].summary, "d1");
    }

    #[tokio::test]
    async fn test_second_cycle_with_same_articles_shows_no_news() {
        let articles = vec![article("A", Some("d1")), article("B", Some("d2"))];
        let source = ScriptedSource::with(vec![Ok(result(articles.clone())), Ok(result(articles))]);
        let (mut presenter, sink) = presenter(source);

        presenter.refresh().await;
        let outcome = presenter.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Primary { rendered: 0 });
        assert_eq!(sink.last(), Some(no_news()));
        assert_eq!(presenter.cycles(), 2);
    }

    #[tokio::test]
    async fn test_empty_primary_queries_fallback_once() {
        let source = ScriptedSource::with(vec![
            Ok(QueryResult {
                total_results: 0,
                results: Some(vec![]),
            }),
            Ok(result(vec![article("C", None)])),
        ]);
        let (mut presenter, sink) = presenter(source);

        let outcome = presenter.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Placeholder { rendered: 1 });
        let primary = KeywordSet::primary().to_search_terms();
        assert_eq!(presenter.source.calls(), vec![Some(primary), None]);

        let view = sink.last().unwrap();
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.items()[0].kind, ArticleKind::Placeholder);
        assert_eq!(view.items()[0].summary, "");
        assert!(presenter.seen().contains("C"));
    }

    #[tokio::test]
    async fn test_nonzero_total_skips_fallback_even_without_results() {
        let source = ScriptedSource::with(vec![Ok(QueryResult {
            total_results: 3,
            results: None,
        })]);
        let (mut presenter, sink) = presenter(source);

        let outcome = presenter.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Primary { rendered: 0 });
        assert_eq!(presenter.source.calls().len(), 1);
        assert_eq!(sink.last(), Some(no_news()));
    }

    #[tokio::test]
    async fn test_failure_shows_error_and_keeps_seen_set() {
        let source = ScriptedSource::with(vec![Ok(result(vec![article("A", Some("d1"))]))]);
        let (mut presenter, sink) = presenter(source);
        presenter.refresh().await;

        presenter.source.push(Err(Error::GatewayStatus {
            status: 502,
            message: "NewsData.io API request failed".to_string(),
        }));
        let outcome = presenter.refresh().await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(sink.last(), Some(FeedView::Error(FeedText::default().load_failed)));
        assert!(presenter.seen().contains("Ad1"));
        assert_eq!(presenter.source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_terminal() {
        let source = ScriptedSource::with(vec![
            Ok(QueryResult::default()),
            Err(Error::InvalidResponse("garbage".to_string())),
        ]);
        let (mut presenter, sink) = presenter(source);

        assert_eq!(presenter.refresh().await, RefreshOutcome::Failed);
        assert_eq!(presenter.source.calls().len(), 2);
        assert!(matches!(sink.last(), Some(FeedView::Error(_))));
        assert!(presenter.seen().is_empty());
    }

    /// Rejects the first `failures` views, then behaves like `inner`.
    struct FlakySink {
        failures: usize,
        inner: MemorySink,
    }

    impl FeedSink for FlakySink {
        fn show(&mut self, view: &FeedView, text: &FeedText) -> Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "closed",
                )));
            }
            self.inner.show(view, text)
        }
    }

    #[tokio::test]
    async fn test_rejected_view_leaves_articles_unseen() {
        let articles = vec![article("A", Some("d1"))];
        let source = ScriptedSource::with(vec![Ok(result(articles.clone())), Ok(result(articles))]);
        let memory = MemorySink::new();
        let sink = FlakySink {
            failures: 1,
            inner: memory.clone(),
        };
        let mut presenter = FeedPresenter::new(source, sink, ClientConfig::default());

        assert_eq!(presenter.refresh().await, RefreshOutcome::NotDisplayed);
        assert!(presenter.seen().is_empty());
        assert!(memory.views().is_empty());

        assert_eq!(presenter.refresh().await, RefreshOutcome::Primary { rendered: 1 });
        assert!(presenter.seen().contains("Ad1"));
        let view = memory.last().unwrap();
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.items()[0].title, "A");
    }

    #[test]
    fn test_render_reports_sink_failure() {
        let sink = FlakySink {
            failures: 1,
            inner: MemorySink::new(),
        };
        let mut presenter = FeedPresenter::new(ScriptedSource::default(), sink, ClientConfig::default());

        let result = presenter.render(Some(&[article("A", None)][..]), false);
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(presenter.seen().is_empty());
    }

    #[test]
    fn test_render_caps_at_ten_in_order() {
        let (mut presenter, _sink) = presenter(ScriptedSource::default());
        let articles: Vec<Article> = (0..15).map(|i| article(&format!("T{i}"), Some("d"))).collect();

        let view = presenter.render(Some(articles.as_slice()), false).unwrap();

        let titles: Vec<&str> = view.items().iter().map(|i| i.title.as_str()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("T{i}")).collect();
        assert_eq!(titles, expected);
        assert_eq!(presenter.seen().len(), 10);

        // The five left over are still new.
        let view = presenter.render(Some(articles.as_slice()), false).unwrap();
        assert_eq!(view.items().len(), 5);
        assert_eq!(view.items()[0].title, "T10");
    }

    #[test]
    fn test_render_filters_before_capping() {
        let (mut presenter, _sink) = presenter(ScriptedSource::default());
        let first: Vec<Article> = (0..3).map(|i| article(&format!("T{i}"), None)).collect();
        presenter.render(Some(first.as_slice()), false).unwrap();

        let second: Vec<Article> = (0..13).map(|i| article(&format!("T{i}"), None)).collect();
        let view = presenter.render(Some(second.as_slice()), false).unwrap();
        assert_eq!(view.items().len(), 10);
        assert_eq!(view.items()[0].title, "T3");
    }

    #[test]
    fn test_render_empty_or_absent() {
        let (mut presenter, sink) = presenter(ScriptedSource::default());
        assert_eq!(presenter.render(None, false).unwrap(), no_news());
        assert_eq!(presenter.render(Some(&[][..]), true).unwrap(), no_news());
        assert_eq!(sink.views().len(), 2);
        assert!(presenter.seen().is_empty());
    }

    #[test]
    fn test_render_twice_dedups_everything() {
        let (mut presenter, _sink) = presenter(ScriptedSource::default());
        let articles = vec![
            article("A", Some("d1")),
            article("B", None),
            article("A", Some("d2")),
        ];
        assert_eq!(presenter.render(Some(articles.as_slice()), false).unwrap().items().len(), 3);
        assert_eq!(presenter.render(Some(articles.as_slice()), false).unwrap(), no_news());
    }

    #[test]
    fn test_render_truncates_long_descriptions() {
        let (mut presenter, _sink) = presenter(ScriptedSource::default());
        let long = "z".repeat(101);
        let view = presenter.render(Some(&[article("L", Some(&long))][..]), false).unwrap();
        assert_eq!(view.items()[0].summary, format!("{}...", "z".repeat(100)));
    }

    #[test]
    fn test_render_unknown_source() {
        let (mut presenter, _sink) = presenter(ScriptedSource::default());
        let mut anonymous = article("N", None);
        anonymous.source_id = None;
        let view = presenter.render(Some(&[anonymous][..]), true).unwrap();
        assert_eq!(view.items()[0].source, "unknown");
    }
}
