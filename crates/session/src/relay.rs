use crate::state::{RequestId, Session};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};

/// Message from a relay task to the session owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Chunk { id: RequestId, text: String },
    Finished { id: RequestId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The stream ended while its request was still current.
    Completed,
    /// A newer request took over; the rest of the stream was dropped.
    Stale,
    /// The session side hung up.
    Closed,
}

/// Forward `stream` as events tagged with `id`, checking before every send
/// that `id` is still the active request.
pub async fn relay<S>(
    id: RequestId,
    stream: S,
    active: watch::Receiver<Option<RequestId>>,
    events: mpsc::Sender<RelayEvent>,
) -> RelayOutcome
where
    S: Stream<Item = String>,
{
    let is_current = || *active.borrow() == Some(id);
    let mut stream = std::pin::pin!(stream);

    while let Some(text) = stream.next().await {
        if !is_current() {
            log::debug!("Relay {id} is stale, dropping the rest of its stream");
            return RelayOutcome::Stale;
        }
        if events.send(RelayEvent::Chunk { id, text }).await.is_err() {
            return RelayOutcome::Closed;
        }
    }

    if !is_current() {
        return RelayOutcome::Stale;
    }
    if events.send(RelayEvent::Finished { id }).await.is_err() {
        return RelayOutcome::Closed;
    }
    RelayOutcome::Completed
}

impl Session {
    /// Apply a relay event. Returns whether it changed the session.
    pub fn apply(&mut self, event: RelayEvent) -> bool {
        match event {
            RelayEvent::Chunk { id, text } => self.append_explanation_chunk(id, &text),
            RelayEvent::Finished { id } => {
                let current = self.is_current(id);
                self.finish_explanation(id);
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc as source;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn chunks_arrive_concatenated_in_order() {
        let mut session = Session::default();
        let id = session.begin_explanation();
        let (tx, mut rx) = mpsc::channel(8);

        let outcome = relay(
            id,
            futures::stream::iter(vec!["Hel".to_string(), "lo ".to_string()]),
            session.subscribe(),
            tx,
        )
        .await;
        assert_eq!(outcome, RelayOutcome::Completed);

        while let Some(event) = rx.recv().await {
            session.apply(event);
        }
        assert_eq!(session.explanation(), "Hello ");
        assert!(!session.is_explaining());
    }

    #[tokio::test]
    async fn stale_relay_stops_forwarding() {
        let mut session = Session::default();
        let first = session.begin_explanation();
        let (chunk_tx, chunk_rx) = source::unbounded::<String>();
        let (tx, mut rx) = mpsc::channel(8);

        let task = tokio::spawn(relay(first, chunk_rx, session.subscribe(), tx));

        chunk_tx.unbounded_send("old ".to_string()).unwrap();
        let event = rx.recv().await.unwrap();
        assert!(session.apply(event));
        assert_eq!(session.explanation(), "old ");

        let second = session.begin_explanation();
        chunk_tx.unbounded_send("late".to_string()).unwrap();

        assert_eq!(task.await.unwrap(), RelayOutcome::Stale);
        assert!(rx.recv().await.is_none());
        assert_eq!(session.explanation(), "");

        assert!(session.append_explanation_chunk(second, "fresh"));
        assert_eq!(session.explanation(), "fresh");
    }

    #[tokio::test]
    async fn closed_receiver_ends_relay() {
        let mut session = Session::default();
        let id = session.begin_explanation();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let outcome = relay(
            id,
            futures::stream::iter(vec!["x".to_string()]),
            session.subscribe(),
            tx,
        )
        .await;
        assert_eq!(outcome, RelayOutcome::Closed);
    }
}
