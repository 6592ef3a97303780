//! # RepoLens Session
//!
//! Client-side state for one user: the analysis lifecycle, the selected
//! node, the experience level and the explanation buffer, plus the recent
//! repository history persisted between runs.
//!
//! Explanation streams run concurrently with the owner of [`Session`] and
//! talk to it only through [`RelayEvent`]s. Each stream is bound to the
//! [`RequestId`] it was started with; [`relay`] stops as soon as the id is no
//! longer active and [`Session::append_explanation_chunk`] rejects stale ids.

mod error;
mod history;
mod relay;
mod state;

pub use error::{Result, SessionError};
pub use history::{HistoryStore, RecentHistory, MAX_HISTORY};
pub use relay::{relay, RelayEvent, RelayOutcome};
pub use state::{
    architecture_target, AnalysisStatus, ExplainPlan, RequestId, Session, CONTENT_FETCH_FAILED,
    CONTENT_UNAVAILABLE, EXPLANATION_FAILED,
};
