use crate::config::AppConfig;
use anyhow::{Context, Result};
use repolens_session::RecentHistory;

pub(super) fn run(config: &AppConfig, clear: bool) -> Result<()> {
    let store = config.history.store()?;

    if clear {
        store
            .save(&RecentHistory::new())
            .with_context(|| format!("Failed to clear {}", store.path().display()))?;
        println!("History cleared.");
        return Ok(());
    }

    let history = store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    if history.is_empty() {
        println!("No recent repositories.");
    }
    for (idx, url) in history.entries().iter().enumerate() {
        println!("{}. {url}", idx + 1);
    }
    Ok(())
}
