//! Identity watcher
//!
//! Background handler that re-validates the token whenever it changes.

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::store::{SessionEvent, SessionStore};
use crate::api::StudyApi;

impl SessionStore {
    /// Spawn the identity watcher.
    ///
    /// A restored token is checked immediately; after that every
    /// [`SessionEvent::TokenChanged`] triggers [`SessionStore::refresh_identity`].
    /// Checks run one at a time, in event order. Abort the handle to stop.
    pub fn watch_identity(&self, api: Arc<dyn StudyApi>) -> JoinHandle<()> {
        let store = self.clone();
        let mut events = self.subscribe();

        tokio::spawn(async move {
            // Epoch of the last token checked, so a login that lands before
            // the task starts isn't checked twice
            let mut checked = None;

            let session = store.snapshot().await;
            if session.is_authenticated() {
                checked = Some(session.epoch);
                store.refresh_identity(api.as_ref()).await;
            }

            loop {
                match events.recv().await {
                    Ok(SessionEvent::TokenChanged { epoch }) => {
                        if checked == Some(epoch) {
                            continue;
                        }
                        checked = Some(epoch);
                        store.refresh_identity(api.as_ref()).await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Identity watcher lagged behind session events");
                        let session = store.snapshot().await;
                        if session.is_authenticated() && checked != Some(session.epoch) {
                            checked = Some(session.epoch);
                            store.refresh_identity(api.as_ref()).await;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
