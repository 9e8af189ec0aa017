use std::fmt;

/// Separator of the logical OR expression used in configuration.
pub const OR_SEPARATOR: &str = " OR ";

/// Terms the feed is primarily interested in.
pub const PRIMARY_KEYWORDS: &str = "加密货币 OR 数字货币 OR 政策 OR 监管 OR 美国 OR 中国 OR 关税";

/// General interest terms queried when the primary set yields nothing.
pub const FALLBACK_KEYWORDS: &str = "黄金 OR 美股 OR 有色金属";

/// An ordered list of search terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    terms: Vec<String>,
}

impl KeywordSet {
    /// Parses an `a OR b OR c` expression. Blank terms are dropped.
    pub fn parse(expression: &str) -> Self {
        let terms = expression
            .split(OR_SEPARATOR)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { terms }
    }

    pub fn primary() -> Self {
        Self::parse(PRIMARY_KEYWORDS)
    }

    pub fn fallback() -> Self {
        Self::parse(FALLBACK_KEYWORDS)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The upstream search syntax: terms separated by a single space.
    pub fn to_search_terms(&self) -> String {
        self.terms.join(" ")
    }

    pub fn to_expression(&self) -> String {
        self.terms.join(OR_SEPARATOR)
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

/// Rewrites a raw query (possibly an OR expression) into upstream search terms.
pub fn to_search_terms(raw: &str) -> String {
    raw.replace(OR_SEPARATOR, " ")
}
