use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use nf_core::Result;
use tracing::warn;

use crate::view::{render_html, render_text, FeedText, FeedView};

/// Where a cycle's view ends up. Every call replaces what was shown before.
pub trait FeedSink: Send {
    fn show(&mut self, view: &FeedView, text: &FeedText) -> Result<()>;
}

/// Writes the plain text rendering to any writer (stdout by default).
pub struct TerminalSink<W: Write + Send> {
    writer: W,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> FeedSink for TerminalSink<W> {
    fn show(&mut self, view: &FeedView, text: &FeedText) -> Result<()> {
        self.writer.write_all(render_text(view, text).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Overwrites an HTML fragment file, standing in for the page's container element.
pub struct HtmlFileSink {
    path: PathBuf,
}

impl HtmlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSink for HtmlFileSink {
    fn show(&mut self, view: &FeedView, text: &FeedText) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, render_html(view, text))?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps every view in memory. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    views: Arc<Mutex<Vec<FeedView>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<FeedView> {
        self.views.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<FeedView> {
        self.views.lock().ok().and_then(|v| v.last().cloned())
    }
}

impl FeedSink for MemorySink {
    fn show(&mut self, view: &FeedView, _text: &FeedText) -> Result<()> {
        if let Ok(mut views) = self.views.lock() {
            views.push(view.clone());
        }
        Ok(())
    }
}

/// Fans a view out to several sinks. Every sink sees the view even when an
/// earlier one fails; the first error is returned afterwards.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn FeedSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl FeedSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl FeedSink for MultiSink {
    fn show(&mut self, view: &FeedView, text: &FeedText) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.show(view, text) {
                warn!(error = %e, "feed sink failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
