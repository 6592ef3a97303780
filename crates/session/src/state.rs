use crate::error::{Result, SessionError};
use crate::history::RecentHistory;
use repolens_protocol::{
    ArchitectureContext, ExperienceLevel, ExplainTarget, FileContext, FileNode, FolderContext,
    RepoAnalysis,
};
use std::fmt;
use tokio::sync::watch;

pub const EXPLANATION_FAILED: &str = "⚠️ Failed to generate explanation.";
/// File content placeholder when the content endpoint answered with an error.
pub const CONTENT_UNAVAILABLE: &str = "(Failed to load content)";
/// File content placeholder when the content request itself failed.
pub const CONTENT_FETCH_FAILED: &str = "(Fetch failed)";

/// Identity of one analysis or explanation request. Only the newest one of
/// each kind may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    Idle,
    Loading,
    Ready,
    /// Banner text shown instead of results.
    Failed(String),
}

/// What to do to explain the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainPlan {
    /// The target is complete; send it.
    Ready(ExplainTarget),
    /// A file: fetch its content first, then call [`ExplainPlan::with_content`].
    NeedsContent { path: String, imports: Vec<String> },
}

impl ExplainPlan {
    /// Path whose content must be fetched, if any.
    #[must_use]
    pub fn pending_path(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::NeedsContent { path, .. } => Some(path.as_str()),
        }
    }

    /// Finish the plan. `content` is ignored for targets that are already complete.
    #[must_use]
    pub fn with_content(self, content: String) -> ExplainTarget {
        match self {
            Self::Ready(target) => target,
            Self::NeedsContent { path, imports } => ExplainTarget::File(FileContext {
                path,
                content,
                imports,
            }),
        }
    }
}

/// Single owner of the client-side state.
///
/// All transitions are synchronous. Explanation streams are tagged with a
/// [`RequestId`] at dispatch; chunks carrying any other id are dropped, so a
/// stream started before the newest request can never write to the buffer.
#[derive(Debug)]
pub struct Session {
    repo_url: Option<String>,
    status: AnalysisStatus,
    analysis: Option<RepoAnalysis>,
    selected: Option<String>,
    level: ExperienceLevel,
    explanation: String,
    explaining: bool,
    history: RecentHistory,
    next_request: u64,
    pending_analysis: Option<RequestId>,
    active: watch::Sender<Option<RequestId>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RecentHistory::new())
    }
}

impl Session {
    #[must_use]
    pub fn new(history: RecentHistory) -> Self {
        let (active, _) = watch::channel(None);
        Self {
            repo_url: None,
            status: AnalysisStatus::Idle,
            analysis: None,
            selected: None,
            level: ExperienceLevel::default(),
            explanation: String::new(),
            explaining: false,
            history,
            next_request: 0,
            pending_analysis: None,
            active,
        }
    }

    /// Reset for a new repository and put it at the front of the history.
    /// The returned id must accompany the result; older ids are ignored.
    pub fn start_analysis(&mut self, repo_url: impl Into<String>) -> RequestId {
        let repo_url = repo_url.into();
        self.history.record(repo_url.clone());
        self.repo_url = Some(repo_url);
        self.status = AnalysisStatus::Loading;
        self.analysis = None;
        self.selected = None;
        self.explanation.clear();
        self.explaining = false;
        self.deactivate();

        let id = self.next_id();
        self.pending_analysis = Some(id);
        id
    }

    /// Store the result and return the architecture explanation to run.
    /// `None` when `id` is not the latest analysis request.
    pub fn receive_analysis(
        &mut self,
        id: RequestId,
        analysis: RepoAnalysis,
    ) -> Option<ExplainTarget> {
        if !self.take_analysis(id) {
            return None;
        }
        self.status = AnalysisStatus::Ready;
        let target = architecture_target(&analysis);
        self.analysis = Some(analysis);
        Some(target)
    }

    /// Record a failed analysis. Returns whether `id` was still current.
    pub fn fail_analysis(&mut self, id: RequestId, message: impl Into<String>) -> bool {
        if !self.take_analysis(id) {
            return false;
        }
        self.status = AnalysisStatus::Failed(message.into());
        self.analysis = None;
        true
    }

    /// Select a tree node. Folders are explained from their children, files
    /// from their content plus the imports recorded in the graph.
    pub fn select_node(&mut self, path: &str) -> Result<ExplainPlan> {
        let plan = self.plan_for(path)?;
        self.selected = Some(path.to_string());
        Ok(plan)
    }

    /// Change the level and, when something is on screen, return the plan to
    /// explain it again.
    pub fn set_level(&mut self, level: ExperienceLevel) -> Option<ExplainPlan> {
        self.level = level;
        let analysis = self.analysis.as_ref()?;
        match &self.selected {
            Some(path) => self.plan_for(path).ok(),
            None => Some(ExplainPlan::Ready(architecture_target(analysis))),
        }
    }

    /// Start a new explanation: clear the buffer and make `id` the only
    /// request allowed to write.
    pub fn begin_explanation(&mut self) -> RequestId {
        let id = self.next_id();
        self.explanation.clear();
        self.explaining = true;
        self.active.send_replace(Some(id));
        log::debug!("Explanation {id} started");
        id
    }

    /// Append a chunk if `id` is still current. Returns whether it was applied.
    pub fn append_explanation_chunk(&mut self, id: RequestId, chunk: &str) -> bool {
        if !self.is_current(id) {
            log::debug!("Dropping chunk from stale explanation {id}");
            return false;
        }
        self.explanation.push_str(chunk);
        true
    }

    pub fn finish_explanation(&mut self, id: RequestId) {
        if self.is_current(id) {
            self.explaining = false;
        }
    }

    pub fn fail_explanation(&mut self, id: RequestId) {
        if self.is_current(id) {
            self.explanation = EXPLANATION_FAILED.to_string();
            self.explaining = false;
        }
    }

    /// Watch the currently active request id.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<RequestId>> {
        self.active.subscribe()
    }

    #[must_use]
    pub fn is_current(&self, id: RequestId) -> bool {
        *self.active.borrow() == Some(id)
    }

    #[must_use]
    pub fn repo_url(&self) -> Option<&str> {
        self.repo_url.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> &AnalysisStatus {
        &self.status
    }

    #[must_use]
    pub fn analysis(&self) -> Option<&RepoAnalysis> {
        self.analysis.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> ExperienceLevel {
        self.level
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_explaining(&self) -> bool {
        self.explaining
    }

    #[must_use]
    pub fn history(&self) -> &RecentHistory {
        &self.history
    }

    fn next_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn take_analysis(&mut self, id: RequestId) -> bool {
        if self.pending_analysis != Some(id) {
            log::debug!("Dropping result of stale analysis {id}");
            return false;
        }
        self.pending_analysis = None;
        true
    }

    fn deactivate(&mut self) {
        self.active.send_replace(None);
    }

    fn plan_for(&self, path: &str) -> Result<ExplainPlan> {
        let analysis = self.analysis.as_ref().ok_or(SessionError::NoAnalysis)?;
        let node = FileNode::find(&analysis.file_tree, path)
            .ok_or_else(|| SessionError::UnknownNode(path.to_string()))?;

        if node.is_dir() {
            return Ok(ExplainPlan::Ready(ExplainTarget::Folder(FolderContext {
                path: node.path.clone(),
                children: node.children().to_vec(),
            })));
        }

        let imports = analysis
            .dependency_graph
            .iter()
            .find(|n| n.id == node.path)
            .map(|n| n.imports.clone())
            .unwrap_or_default();
        Ok(ExplainPlan::NeedsContent {
            path: node.path.clone(),
            imports,
        })
    }
}

/// Architecture explanation context for a finished analysis.
#[must_use]
pub fn architecture_target(analysis: &RepoAnalysis) -> ExplainTarget {
    ExplainTarget::Architecture(ArchitectureContext {
        tree: analysis.file_tree.clone(),
        tech_stack: analysis.tech_stack.clone(),
        readme: analysis.readme_content.clone(),
        package_json: analysis.package_json_content.clone(),
    })
}
