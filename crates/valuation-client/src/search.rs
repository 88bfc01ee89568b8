//! Paginated search session
//!
//! Owns the "search, then load more" state for one keyword. A new keyword
//! resets the session; load-more appends to what is already rendered. All
//! calls share one [`Slot`], so only the most recently issued request may
//! touch visible state.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::gateway::{Outcome, RequestGateway, Slot};
use crate::models::{SearchQuery, SearchResultPage};
use crate::progress::ProgressReporter;
use crate::ui::{Indicator, RenderInstruction, Renderer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info};

/// Pagination state for the current keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSessionState {
    pub keyword: String,
    /// Last page successfully loaded
    pub page: u32,
    /// Items rendered so far across all loaded pages
    pub accumulated_count: u64,
    /// Server total from the last successful page
    pub total: Option<u64>,
}

impl Default for SearchSessionState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            page: 1,
            accumulated_count: 0,
            total: None,
        }
    }
}

impl SearchSessionState {
    fn for_keyword(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            ..Self::default()
        }
    }

    /// Whether the "load more" affordance should be offered
    pub fn has_more(&self) -> bool {
        self.total
            .is_some_and(|total| self.accumulated_count < total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageMode {
    Replace,
    Append,
}

/// Search workflow for one result list
pub struct SearchSession {
    gateway: RequestGateway,
    renderer: Arc<dyn Renderer>,
    progress: ProgressReporter,
    slot: Slot,
    page_size: u32,
    banner_duration: Duration,
    state: Mutex<SearchSessionState>,
}

impl SearchSession {
    pub fn new(gateway: RequestGateway, renderer: Arc<dyn Renderer>, config: &ClientConfig) -> Self {
        let progress = ProgressReporter::new(
            Indicator::Search,
            renderer.clone(),
            config.progress_hide_delay,
        );

        Self {
            gateway,
            renderer,
            progress,
            slot: Slot::new("search"),
            page_size: config.page_size,
            banner_duration: config.error_banner_duration,
            state: Mutex::new(SearchSessionState::default()),
        }
    }

    fn state_mut(&self) -> MutexGuard<'_, SearchSessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SearchSessionState {
        self.state_mut().clone()
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Start a search for a new keyword
    ///
    /// Empty or whitespace keywords are rejected without a network call.
    pub async fn submit_new_search(&self, keyword: &str) -> Result<()> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            debug!("Rejected empty search keyword");
            self.renderer.render(RenderInstruction::ShowTransientError {
                message: ClientError::EmptyKeyword.to_string(),
                duration: self.banner_duration,
            });
            return Err(ClientError::EmptyKeyword);
        }

        *self.state_mut() = SearchSessionState::for_keyword(keyword);
        let query = SearchQuery::new(keyword, 1, self.page_size);
        self.execute(query, PageMode::Replace).await;
        Ok(())
    }

    /// Fetch the next page for the current keyword
    ///
    /// Returns `false` without issuing a request when there is no keyword,
    /// no successful search yet, or nothing left to load.
    pub async fn load_more(&self) -> bool {
        let query = {
            let state = self.state_mut();
            if state.keyword.is_empty() || !state.has_more() {
                debug!("Load more ignored: nothing to load");
                return false;
            }
            SearchQuery::new(state.keyword.clone(), state.page + 1, self.page_size)
        };

        self.execute(query, PageMode::Append).await;
        true
    }

    async fn execute(&self, query: SearchQuery, mode: PageMode) {
        let ticket = self.slot.begin();
        debug!(
            "Search #{} for '{}' page {}",
            ticket.sequence(),
            query.keyword,
            query.page
        );

        self.set_submit_enabled(false);
        self.progress.show();
        self.progress.tick(30, "正在搜索...");

        let outcome = self.gateway.search(&query, ticket.token()).await;

        if !self.slot.is_current(&ticket) {
            debug!(
                "Discarding stale search #{} (latest #{})",
                ticket.sequence(),
                self.slot.latest()
            );
            return;
        }

        self.apply(&query, mode, outcome);
        self.set_submit_enabled(true);
        self.progress.hide_after_delay();
    }

    fn apply(&self, query: &SearchQuery, mode: PageMode, outcome: Outcome<SearchResultPage>) {
        match outcome {
            Outcome::Success(page) => match mode {
                PageMode::Replace => self.apply_first_page(page),
                PageMode::Append => self.apply_next_page(query, page),
            },
            failed => {
                let message = failed.failure_message().unwrap_or_default().to_string();
                error!(
                    "Search for '{}' page {} failed: {}",
                    query.keyword, query.page, message
                );
                match mode {
                    PageMode::Replace => {
                        self.renderer.render(RenderInstruction::ShowSearchError);
                        self.renderer.render(RenderInstruction::SetLoadMore(false));
                    }
                    // The rendered list and committed page stay as they were.
                    PageMode::Append => {
                        self.renderer.render(RenderInstruction::ShowTransientError {
                            message,
                            duration: self.banner_duration,
                        });
                    }
                }
            }
        }
    }

    fn apply_first_page(&self, page: SearchResultPage) {
        if page.items.is_empty() {
            {
                let mut state = self.state_mut();
                state.page = 1;
                state.accumulated_count = 0;
                state.total = Some(0);
            }
            info!("Search returned no results");
            self.renderer.render(RenderInstruction::ShowEmpty);
            self.renderer.render(RenderInstruction::SetLoadMore(false));
            self.progress.tick(100, "未找到匹配的股票");
            return;
        }

        let total = page.total;
        let has_more = {
            let mut state = self.state_mut();
            state.page = 1;
            state.accumulated_count = (page.items.len() as u64).min(total);
            state.total = Some(total);
            state.has_more()
        };

        info!("Search found {} results", total);
        self.renderer.render(RenderInstruction::ReplaceResults {
            items: page.items,
            total,
        });
        self.renderer.render(RenderInstruction::SetLoadMore(has_more));
        self.progress.tick(100, format!("找到 {total} 个结果"));
    }

    fn apply_next_page(&self, query: &SearchQuery, page: SearchResultPage) {
        let (has_more, loaded, total) = {
            let mut state = self.state_mut();
            if page.items.is_empty() {
                // Server ran dry before reaching its own total.
                state.total = Some(state.accumulated_count);
            } else {
                state.page = query.page;
                state.accumulated_count += page.items.len() as u64;
                state.total = Some(page.total.max(state.accumulated_count));
            }
            (
                state.has_more(),
                state.accumulated_count,
                state.total.unwrap_or_default(),
            )
        };

        debug!("Loaded page {}: {}/{} results", query.page, loaded, total);
        if !page.items.is_empty() {
            self.renderer.render(RenderInstruction::AppendResults {
                items: page.items,
                total,
            });
        }
        self.renderer.render(RenderInstruction::SetLoadMore(has_more));
        self.progress.tick(100, format!("已加载 {loaded}/{total} 个结果"));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.renderer.render(RenderInstruction::SetSubmitEnabled {
            indicator: Indicator::Search,
            enabled,
        });
    }
}
