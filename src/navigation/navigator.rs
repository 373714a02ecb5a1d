//! Navigator
//!
//! Tracks the current page and re-runs the guard whenever it might change
//! its answer: on every navigation and after every session event.

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::guard::{resolve, Route};
use crate::session::SessionStore;

/// Current location, always one the guard allows
#[derive(Clone)]
pub struct Navigator {
    session: SessionStore,
    current: Arc<RwLock<Route>>,
}

impl Navigator {
    /// Start at `/`; call [`Navigator::sync`] or navigate to land somewhere real
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            current: Arc::new(RwLock::new(Route::Root)),
        }
    }

    pub async fn current(&self) -> Route {
        self.current.read().await.clone()
    }

    /// Go to `route`, or wherever the guard sends us instead
    pub async fn navigate(&self, route: Route) -> Route {
        let mut current = self.current.write().await;
        self.settle(&mut current, &route).await
    }

    pub async fn navigate_to(&self, path: &str) -> Route {
        self.navigate(Route::parse(path)).await
    }

    /// Re-check the current page against the current session
    pub async fn sync(&self) -> Route {
        let mut current = self.current.write().await;
        let route = current.clone();
        self.settle(&mut current, &route).await
    }

    /// Resolve `route` and store it; the caller holds the write guard
    async fn settle(&self, current: &mut Route, route: &Route) -> Route {
        let session = self.session.snapshot().await;
        let target = resolve(&session, route);

        if target != *route {
            tracing::debug!(requested = %route, landed = %target, "Navigation redirected");
        }
        *current = target.clone();
        target
    }

    /// Re-check after every session event until the handle is aborted
    pub fn watch(&self) -> JoinHandle<()> {
        let navigator = self.clone();
        let mut events = self.session.subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        let route = navigator.sync().await;
                        tracing::trace!(route = %route, "Route re-evaluated");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStorage;
    use std::time::Duration;

    #[tokio::test]
    async fn test_navigate_applies_guard() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        let nav = Navigator::new(session.clone());

        assert_eq!(nav.navigate(Route::Dashboard).await, Route::Login);
        assert_eq!(nav.current().await, Route::Login);

        session.login("t").await.unwrap();
        assert_eq!(nav.navigate_to("/login").await, Route::Dashboard);
        assert_eq!(nav.navigate_to("/").await, Route::Dashboard);
    }

    #[tokio::test]
    async fn test_sync_after_logout() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        session.login("t").await.unwrap();
        let nav = Navigator::new(session.clone());
        nav.navigate(Route::Dashboard).await;

        session.logout().await;
        assert_eq!(nav.current().await, Route::Dashboard);
        assert_eq!(nav.sync().await, Route::Login);
    }

    #[tokio::test]
    async fn test_sync_does_not_overwrite_concurrent_navigation() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        let nav = Navigator::new(session);
        nav.navigate(Route::Login).await;

        // Queue a sync, then a navigation, behind the held lock
        let guard = nav.current.write().await;
        let sync = {
            let nav = nav.clone();
            tokio::spawn(async move { nav.sync().await })
        };
        tokio::task::yield_now().await;
        let open = {
            let nav = nav.clone();
            tokio::spawn(async move { nav.navigate(Route::Register).await })
        };
        tokio::task::yield_now().await;
        drop(guard);

        assert_eq!(sync.await.unwrap(), Route::Login);
        assert_eq!(open.await.unwrap(), Route::Register);
        assert_eq!(nav.current().await, Route::Register);
    }

    #[tokio::test]
    async fn test_watch_redirects_on_logout() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        session.login("t").await.unwrap();
        let nav = Navigator::new(session.clone());
        nav.navigate(Route::Dashboard).await;
        let handle = nav.watch();

        session.logout().await;

        let landed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let route = nav.current().await;
                if route != Route::Dashboard {
                    return route;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(landed, Route::Login);

        handle.abort();
    }
}
