use crate::domain::ports::WindowTitleSource;
use crate::utils::error::{AdMuteError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Plays back a fixed list of titles, one per poll. The last title repeats
/// once the list runs out.
#[derive(Debug)]
pub struct ReplayTitleSource {
    titles: Vec<String>,
    cursor: AtomicUsize,
}

impl ReplayTitleSource {
    pub fn new<I, T>(titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// 每一行是一個 tick 的標題；空行代表找不到視窗
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let source = Self::new(content.lines());
        if source.titles.is_empty() {
            return Err(AdMuteError::ConfigError {
                message: format!("replay file '{}' is empty", path.as_ref().display()),
            });
        }
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// True once every line has been handed out at least once.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.load(Ordering::SeqCst) >= self.titles.len()
    }
}

#[async_trait]
impl WindowTitleSource for ReplayTitleSource {
    async fn current_title(&self) -> Result<String> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let title = self
            .titles
            .get(index)
            .or_else(|| self.titles.last())
            .cloned()
            .unwrap_or_default();
        Ok(title)
    }
}
