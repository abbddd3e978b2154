//! Reaction markers that never outlive the prompt they decorate.

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};
use tokio::runtime::Handle;

use crate::response::{Transport, TransportError};

/// Reactions placed by the bot on a prompt, removed exactly once.
///
/// Call [`TransientReactions::release`] when the prompt is answered. If the
/// value is dropped instead (the task awaiting the answer was cancelled), the
/// removal is spawned on the current runtime.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use herald::response::{TransientReactions, Transport};
/// # async fn example(transport: Arc<dyn Transport>) -> Result<(), herald::response::TransportError> {
/// let mut markers = TransientReactions::new(transport, "!room:example.org");
/// markers.place("$prompt", &["✅", "❌"]).await?;
/// // ... wait for the answer ...
/// markers.release().await;
/// # Ok(())
/// # }
/// ```
pub struct TransientReactions {
    transport: Arc<dyn Transport>,
    room_id: String,
    /// Ids of the reactions still to remove
    placed: Vec<String>,
}

impl TransientReactions {
    pub fn new(transport: Arc<dyn Transport>, room_id: &str) -> Self {
        TransientReactions {
            transport,
            room_id: room_id.to_owned(),
            placed: Vec::new(),
        }
    }

    /// Reacts to `message_id` with each key in order.
    ///
    /// Stops at the first failure. Markers placed before it stay tracked and
    /// are removed with the others.
    pub async fn place(&mut self, message_id: &str, keys: &[&str]) -> Result<(), TransportError> {
        for key in keys {
            let reaction_id = self.transport.add_reaction(&self.room_id, message_id, key).await?;
            self.placed.push(reaction_id);
        }
        Ok(())
    }

    /// Number of markers currently placed.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Removes every placed marker and waits for the removals.
    pub async fn release(mut self) {
        let placed = std::mem::take(&mut self.placed);
        remove_all(Arc::clone(&self.transport), self.room_id.clone(), placed).await;
    }
}

impl Drop for TransientReactions {
    fn drop(&mut self) {
        if self.placed.is_empty() {
            return;
        }

        let placed = std::mem::take(&mut self.placed);
        let transport = Arc::clone(&self.transport);
        let room_id = std::mem::take(&mut self.room_id);

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(remove_all(transport, room_id, placed));
            }
            Err(_) => warn!(
                "no runtime to remove {} reaction(s) in {}",
                placed.len(),
                room_id
            ),
        }
    }
}

async fn remove_all(transport: Arc<dyn Transport>, room_id: String, placed: Vec<String>) {
    debug!("removing {} reaction(s) in {}", placed.len(), room_id);

    let removals = placed
        .iter()
        .map(|reaction_id| transport.remove_reaction(&room_id, reaction_id));

    for (reaction_id, result) in placed.iter().zip(join_all(removals).await) {
        if let Err(e) = result {
            warn!("failed to remove reaction {}: {}", reaction_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::response::MockTransport;

    fn create_test_transport(removed: mpsc::UnboundedSender<String>) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_add_reaction()
            .returning(|_, _, key| Ok(format!("$reaction-{}", key)));
        transport
            .expect_remove_reaction()
            .returning(move |_, reaction_id| {
                let _ = removed.send(reaction_id.to_owned());
                Ok(())
            });
        transport
    }

    #[tokio::test]
    async fn test_release_removes_every_marker_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = Arc::new(create_test_transport(tx));

        let mut markers = TransientReactions::new(transport, "!room:example.org");
        markers.place("$prompt", &["✅", "❌"]).await.unwrap();
        assert_eq!(markers.len(), 2);
        markers.release().await;

        let mut removed = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        removed.sort();
        assert_eq!(removed, vec!["$reaction-✅", "$reaction-❌"]);
        // The transport (and the sender it owns) is gone once released
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_drop_spawns_removal() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = Arc::new(create_test_transport(tx));

        let mut markers = TransientReactions::new(transport, "!room:example.org");
        markers.place("$prompt", &["👁️"]).await.unwrap();
        drop(markers);

        let removed = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(removed.as_deref(), Some("$reaction-👁️"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancelled_task_still_removes_markers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport: Arc<dyn Transport> = Arc::new(create_test_transport(tx));

        let task = tokio::spawn(async move {
            let mut markers = TransientReactions::new(transport, "!room:example.org");
            markers.place("$prompt", &["❌"]).await.unwrap();
            std::future::pending::<()>().await;
            markers.release().await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.abort();

        let removed = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(removed.as_deref(), Some("$reaction-❌"));
    }

    #[tokio::test]
    async fn test_failed_placement_keeps_earlier_markers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        transport
            .expect_add_reaction()
            .withf(|_, _, key| key == "✅")
            .times(1)
            .returning(|_, _, _| Ok("$first".to_owned()));
        transport
            .expect_add_reaction()
            .withf(|_, _, key| key == "❌")
            .times(1)
            .returning(|_, _, _| Err(TransportError::Failure("rate limited".to_owned())));
        transport
            .expect_remove_reaction()
            .times(1)
            .returning(move |_, reaction_id| {
                let _ = tx.send(reaction_id.to_owned());
                Ok(())
            });

        let mut markers = TransientReactions::new(Arc::new(transport), "!room:example.org");
        let result = markers.place("$prompt", &["✅", "❌"]).await;

        assert!(result.is_err());
        assert_eq!(markers.len(), 1);
        markers.release().await;
        assert_eq!(rx.recv().await.as_deref(), Some("$first"));
    }

    #[tokio::test]
    async fn test_failed_removal_is_not_fatal() {
        let mut transport = MockTransport::new();
        transport
            .expect_add_reaction()
            .returning(|_, _, _| Ok("$reaction".to_owned()));
        transport
            .expect_remove_reaction()
            .times(1)
            .returning(|_, _| Err(TransportError::Failure("gone".to_owned())));

        let mut markers = TransientReactions::new(Arc::new(transport), "!room:example.org");
        markers.place("$prompt", &["✅"]).await.unwrap();
        markers.release().await;
    }
}
