use super::{load_repository, open_session};
use crate::config::AppConfig;
use anyhow::Result;
use repolens_explain::Explainer;
use repolens_github::{parse_github_url, GithubClient, GithubError};
use repolens_protocol::{ExperienceLevel, ExplainRequest};
use repolens_session::{
    relay, ExplainPlan, RelayEvent, CONTENT_FETCH_FAILED, CONTENT_UNAVAILABLE, EXPLANATION_FAILED,
};
use std::io::Write;
use tokio::sync::mpsc;

const RELAY_CAPACITY: usize = 64;

pub(super) async fn run(
    config: AppConfig,
    url: &str,
    level: ExperienceLevel,
    path: Option<&str>,
) -> Result<()> {
    let client = GithubClient::new(config.github.clone())?;
    let explainer = Explainer::from_config(&config.explain)?;
    let store = config.history.store()?;
    let mut session = open_session(&store);
    session.set_level(level);

    let architecture = load_repository(&config, &client, &mut session, &store, url).await?;
    let plan = match path {
        Some(path) => session.select_node(path)?,
        None => ExplainPlan::Ready(architecture),
    };

    let content = match plan.pending_path() {
        Some(file) => {
            let repo = parse_github_url(url)?;
            resolve_content(client.fetch_content(&repo, file).await)
        }
        None => String::new(),
    };
    let target = plan.with_content(content);

    let id = session.begin_explanation();
    let request = ExplainRequest::new(&target, session.level())?;
    let stream = match explainer.explain(&request).await {
        Ok(stream) => stream,
        Err(err) => {
            log::error!("Explanation {id} failed: {err}");
            session.fail_explanation(id);
            println!("{}", session.explanation());
            return Ok(());
        }
    };

    let (tx, mut rx) = mpsc::channel(RELAY_CAPACITY);
    let relay_task = tokio::spawn(relay(id, stream, session.subscribe(), tx));

    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        let text = match &event {
            RelayEvent::Chunk { text, .. } => Some(text.clone()),
            RelayEvent::Finished { .. } => None,
        };
        if session.apply(event) {
            if let Some(text) = text {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
        }
    }
    writeln!(stdout)?;

    match relay_task.await {
        Ok(outcome) => log::debug!("Explanation {id} relay ended: {outcome:?}"),
        Err(err) => {
            log::error!("Explanation {id} relay panicked: {err}");
            session.fail_explanation(id);
            writeln!(stdout, "{EXPLANATION_FAILED}")?;
        }
    }
    Ok(())
}

/// File content for a file explanation. Failures become placeholder text so
/// the explanation still runs.
#[must_use]
pub fn resolve_content(result: std::result::Result<String, GithubError>) -> String {
    match result {
        Ok(content) => content,
        Err(err) if err.is_upstream() => {
            log::warn!("Content fetch failed: {err}");
            CONTENT_FETCH_FAILED.to_string()
        }
        Err(err) => {
            log::warn!("Content unavailable: {err}");
            CONTENT_UNAVAILABLE.to_string()
        }
    }
}
