use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use url::Url;

/// User-visible strings of the feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedText {
    pub no_news: String,
    pub load_failed: String,
    pub placeholder_label: String,
    pub published: String,
    pub source: String,
    pub read_more: String,
}

impl Default for FeedText {
    fn default() -> Self {
        Self {
            no_news: "No new relevant news right now.".to_string(),
            load_failed: "Failed to load news. Check your network connection or try again later."
                .to_string(),
            placeholder_label: "[placeholder]".to_string(),
            published: "Published".to_string(),
            source: "Source".to_string(),
            read_more: "Read original article".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    /// Matched the primary keywords.
    Important,
    /// Came from the fallback query.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedArticle {
    pub title: String,
    pub published: String,
    pub source: String,
    pub summary: String,
    pub link: String,
    pub kind: ArticleKind,
}

/// Everything the feed shows after one cycle. Each cycle replaces the previous view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "content", rename_all = "snake_case")]
pub enum FeedView {
    Error(String),
    NoNews(String),
    Items(Vec<RenderedArticle>),
}

impl FeedView {
    pub fn items(&self) -> &[RenderedArticle] {
        match self {
            FeedView::Items(items) => items,
            _ => &[],
        }
    }
}

/// Plain text, one block per article.
pub fn render_text(view: &FeedView, text: &FeedText) -> String {
    match view {
        FeedView::Error(message) | FeedView::NoNews(message) => format!("{message}\n"),
        FeedView::Items(items) => {
            let mut out = String::new();
            for (i, item) in items.iter().enumerate() {
                out.push_str(&match item.kind {
                    ArticleKind::Important => format!("[{}] * {}\n", i + 1, item.title),
                    ArticleKind::Placeholder => {
                        format!("[{}] {} {}\n", i + 1, item.title, text.placeholder_label)
                    }
                });
                out.push_str(&format!(
                    "    {}: {} | {}: {}\n",
                    text.published, item.published, text.source, item.source
                ));
                if !item.summary.is_empty() {
                    out.push_str(&format!("    {}\n", item.summary));
                }
                out.push_str(&format!("    {}\n\n", item.link));
            }
            out
        }
    }
}

/// HTML fragment for the feed's container element.
pub fn render_html(view: &FeedView, text: &FeedText) -> String {
    match view {
        FeedView::Error(message) => {
            format!("<p class=\"feed-error\">{}</p>\n", encode_text(message))
        }
        FeedView::NoNews(message) => {
            format!("<p class=\"no-news\">{}</p>\n", encode_text(message))
        }
        FeedView::Items(items) => items
            .iter()
            .map(|item| render_html_item(item, text))
            .collect(),
    }
}

fn render_html_item(item: &RenderedArticle, text: &FeedText) -> String {
    let class = match item.kind {
        ArticleKind::Important => "news-item important-news",
        ArticleKind::Placeholder => "news-item",
    };
    let label = match item.kind {
        ArticleKind::Important => String::new(),
        ArticleKind::Placeholder => format!(
            "<span class=\"placeholder-label\">{}</span>",
            encode_text(&text.placeholder_label)
        ),
    };
    format!(
        "<div class=\"{class}\">\n\
         <h2>{title}</h2>\n\
         <div class=\"meta\"><span>{published_label}: {published}</span><span>{source_label}: {source}</span></div>\n\
         <p class=\"summary\">{summary}</p>\n\
         <div class=\"news-footer\"><a href=\"{link}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"read-more\">{read_more}</a>{label}</div>\n\
         </div>\n",
        title = encode_text(&item.title),
        published_label = encode_text(&text.published),
        published = encode_text(&item.published),
        source_label = encode_text(&text.source),
        source = encode_text(&item.source),
        summary = encode_text(&item.summary),
        link = encode_double_quoted_attribute(safe_link(&item.link)),
        read_more = encode_text(&text.read_more),
    )
}

/// Absolute links are only kept for http(s); anything else becomes `#`.
fn safe_link(link: &str) -> &str {
    match Url::parse(link) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => link,
        Ok(_) => "#",
        Err(_) => link,
    }
}
