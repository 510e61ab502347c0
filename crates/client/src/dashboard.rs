use crate::error::ClientError;
use crate::history::{History, HistoryStore};
use crate::placeholder::placeholder_analysis;
use crate::prompt::research_prompt;
use crate::proxy::AnalysisBackend;
use chrono::Utc;
use equity_core::domain::analysis::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Summary,
    Detailed,
}

/// What to do when the backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Show (and record) the fixed placeholder analysis.
    #[default]
    Placeholder,
    /// Report the error; nothing is recorded.
    Surface,
}

#[derive(Debug)]
pub enum AnalysisOutcome {
    Ok(AnalysisResult),
    Degraded {
        placeholder: AnalysisResult,
        error: ClientError,
    },
    Failed(ClientError),
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Ok(result) => Some(result),
            AnalysisOutcome::Degraded { placeholder, .. } => Some(placeholder),
            AnalysisOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            AnalysisOutcome::Ok(_) => None,
            AnalysisOutcome::Degraded { error, .. } | AnalysisOutcome::Failed(error) => Some(error),
        }
    }
}

/// Clears the in-flight flag even if the request future is dropped.
struct InFlight<'a>(&'a mut bool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct Dashboard<B> {
    backend: B,
    store: Option<HistoryStore>,
    history: History,
    current: Option<AnalysisResult>,
    selected: Option<i64>,
    view_mode: ViewMode,
    analyzing: bool,
    fallback: FallbackPolicy,
}

impl<B: AnalysisBackend> Dashboard<B> {
    /// Loads history from `store` when one is given.
    pub fn new(backend: B, store: Option<HistoryStore>, fallback: FallbackPolicy) -> Self {
        let history = store.as_ref().map(HistoryStore::load).unwrap_or_default();
        Self {
            backend,
            store,
            history,
            current: None,
            selected: None,
            view_mode: ViewMode::Summary,
            analyzing: false,
            fallback,
        }
    }

    /// Runs one analysis for `ticker`. Returns `None` for a blank ticker, in which
    /// case nothing is sent and nothing changes.
    pub async fn run_analysis(&mut self, ticker: &str) -> Option<AnalysisOutcome> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return None;
        }
        if self.analyzing {
            return Some(AnalysisOutcome::Failed(ClientError::AlreadyAnalyzing));
        }

        self.current = None;
        self.selected = None;

        let prompt = research_prompt(&ticker);
        tracing::info!(%ticker, "starting analysis");

        self.analyzing = true;
        let response = {
            let _in_flight = InFlight(&mut self.analyzing);
            self.backend.analyze(&ticker, &prompt).await
        };

        let outcome = match response {
            Ok(result) => {
                tracing::info!(%ticker, id = result.id, "analysis completed");
                self.record(result.clone());
                AnalysisOutcome::Ok(result)
            }
            Err(error) => match self.fallback {
                FallbackPolicy::Placeholder => {
                    tracing::warn!(%ticker, error = %error, "analysis failed; showing placeholder data");
                    let placeholder = placeholder_analysis(&ticker, Utc::now());
                    self.record(placeholder.clone());
                    AnalysisOutcome::Degraded { placeholder, error }
                }
                FallbackPolicy::Surface => {
                    tracing::error!(%ticker, error = %error, "analysis failed");
                    AnalysisOutcome::Failed(error)
                }
            },
        };
        Some(outcome)
    }

    /// Shows a past analysis without contacting the backend.
    pub fn select_history_item(&mut self, id: i64) -> Result<&AnalysisResult, ClientError> {
        let entry = self
            .history
            .get(id)
            .cloned()
            .ok_or(ClientError::UnknownHistoryEntry(id))?;
        self.selected = Some(id);
        self.current = Some(entry);
        self.view_mode = ViewMode::Summary;
        self.display_analysis()
            .ok_or(ClientError::UnknownHistoryEntry(id))
    }

    /// The selected history entry if there is one, else the current analysis.
    pub fn display_analysis(&self) -> Option<&AnalysisResult> {
        self.selected
            .and_then(|id| self.history.get(id))
            .or(self.current.as_ref())
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub async fn health(&self) -> Result<String, ClientError> {
        Ok(self.backend.health().await?.status)
    }

    fn record(&mut self, result: AnalysisResult) {
        self.current = Some(result.clone());
        self.history.push(result);
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.history) {
                tracing::warn!(path = %store.path().display(), error = %e, "failed to persist history");
            }
        }
    }
}
