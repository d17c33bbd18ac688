//! Lazy-Load Sentinel Controller.
//!
//! The rendering layer places a sentinel row after the last displayed row and reports
//! its visibility. The controller turns the first visible report into one call of the
//! host's load-more callback, detaching the sentinel before the callback runs so a slow
//! load cannot be re-triggered by the same row. A re-rendered sentinel attaches again
//! immediately; overlap with a pending load is the host's concern (see `is_loading`).

use serde::{Deserialize, Serialize};
use std::{fmt, future::Future, pin::Pin, sync::Arc};
use tokio::task::JoinHandle;

/// Future returned by the load-more callback.
pub type LoadMoreFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Host-supplied load-more callback. Failures are handled by the host.
pub type LoadMoreCallback = Arc<dyn Fn() -> LoadMoreFuture + Send + Sync>;

/// Lazy-load flags supplied by the host on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LazyLoadDetails {
    pub enable_lazy_load: bool,
    /// A load is in flight; the grid shows its loading state.
    pub is_loading: bool,
    /// The corpus has more rows to fetch.
    pub more_items: bool,
}

/// Identity of a rendered sentinel (the displayed row it follows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentinelId(pub usize);

/// Where the rendering layer should put the sentinel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelPlacement {
    /// No sentinel.
    Hidden,
    /// After the given displayed row, observed for visibility.
    AfterRow(usize),
    /// Alone in an empty grid, never observed.
    Standalone,
}

/// Computes the sentinel placement for the current render.
///
/// A sentinel exists only when lazy loading is enabled and more items are available.
/// With rows displayed it follows the last one; with none it is shown as a plain
/// loading row without an observer.
pub fn sentinel_placement(details: &LazyLoadDetails, displayed_len: usize) -> SentinelPlacement {
    if !details.enable_lazy_load || !details.more_items {
        return SentinelPlacement::Hidden;
    }
    match displayed_len.checked_sub(1) {
        Some(last_row) => SentinelPlacement::AfterRow(last_row),
        None => SentinelPlacement::Standalone,
    }
}

/// Visibility observer: watches at most one sentinel at a time.
#[derive(Debug, Default)]
struct Observer {
    observed: Option<SentinelId>,
}

pub struct SentinelController {
    details: LazyLoadDetails,
    callback: Option<LoadMoreCallback>,
    observer: Option<Observer>,
    triggers: usize,
}

impl fmt::Debug for SentinelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelController")
            .field("details", &self.details)
            .field("has_callback", &self.callback.is_some())
            .field("observer", &self.observer)
            .field("triggers", &self.triggers)
            .finish()
    }
}

impl SentinelController {
    /// Creates the observer only if lazy loading is enabled and a callback is supplied.
    pub fn new(details: LazyLoadDetails, callback: Option<LoadMoreCallback>) -> Self {
        let observer = (details.enable_lazy_load && callback.is_some()).then(Observer::default);
        tracing::debug!(
            "SentinelController: lazy load {}",
            if observer.is_some() { "observing" } else { "inactive" }
        );
        SentinelController {
            details,
            callback,
            observer,
            triggers: 0,
        }
    }

    /// Replaces the host flags (e.g. after a load finished).
    ///
    /// Enabling lazy loading creates the observer if a callback is present; disabling
    /// it drops the observer. An existing observer keeps its sentinel.
    pub fn update_details(&mut self, details: LazyLoadDetails) {
        self.details = details;
        match (details.enable_lazy_load && self.callback.is_some(), self.observer.is_some()) {
            (true, false) => {
                tracing::debug!("SentinelController: lazy load enabled, observing");
                self.observer = Some(Observer::default());
            }
            (false, true) => {
                tracing::debug!("SentinelController: lazy load disabled");
                self.observer = None;
            }
            _ => {}
        }
    }

    pub fn details(&self) -> &LazyLoadDetails {
        &self.details
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Number of load-more callbacks fired so far.
    pub fn triggers(&self) -> usize {
        self.triggers
    }

    /// Observes a freshly rendered sentinel, replacing the previous one.
    ///
    /// Returns `false` when there is no observer.
    pub fn attach(&mut self, sentinel: SentinelId) -> bool {
        match self.observer.as_mut() {
            Some(observer) => {
                if let Some(previous) = observer.observed.replace(sentinel) {
                    tracing::trace!("Sentinel {:?} replaced by {:?}", previous, sentinel);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_observing(&self, sentinel: SentinelId) -> bool {
        self.observer
            .as_ref()
            .is_some_and(|observer| observer.observed == Some(sentinel))
    }

    /// Handles a visibility report for `sentinel`.
    ///
    /// ### Returns
    /// The load-more future when the observed sentinel became visible, `None` otherwise.
    /// The sentinel is detached before the future is handed out, so further reports for
    /// it return `None` until a new sentinel is attached.
    pub fn on_visibility_changed(
        &mut self,
        sentinel: SentinelId,
        is_visible: bool,
    ) -> Option<LoadMoreFuture> {
        if !is_visible || !self.is_observing(sentinel) {
            return None;
        }

        let callback = self.callback.as_ref()?;
        if let Some(observer) = self.observer.as_mut() {
            observer.observed = None;
        }
        self.triggers += 1;
        tracing::info!("Lazy load triggered by sentinel {:?}", sentinel);
        Some(callback())
    }

    /// Same as `on_visibility_changed`, running the load on the tokio runtime.
    pub fn spawn_on_visible(
        &mut self,
        sentinel: SentinelId,
        is_visible: bool,
    ) -> Option<JoinHandle<()>> {
        self.on_visibility_changed(sentinel, is_visible)
            .map(tokio::spawn)
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_lazy_load`
#[cfg(test)]
mod tests_lazy_load {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn enabled() -> LazyLoadDetails {
        LazyLoadDetails {
            enable_lazy_load: true,
            is_loading: false,
            more_items: true,
        }
    }

    fn counting_callback(counter: Arc<AtomicUsize>) -> LoadMoreCallback {
        Arc::new(move || {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[test]
    fn placement_follows_flags_and_row_count() {
        assert_eq!(sentinel_placement(&enabled(), 20), SentinelPlacement::AfterRow(19));
        assert_eq!(sentinel_placement(&enabled(), 0), SentinelPlacement::Standalone);

        let exhausted = LazyLoadDetails {
            more_items: false,
            ..enabled()
        };
        assert_eq!(sentinel_placement(&exhausted, 20), SentinelPlacement::Hidden);
        assert_eq!(
            sentinel_placement(&LazyLoadDetails::default(), 20),
            SentinelPlacement::Hidden
        );
    }

    #[test]
    fn observer_requires_flag_and_callback() {
        let counter = Arc::new(AtomicUsize::new(0));

        let mut without_callback = SentinelController::new(enabled(), None);
        assert!(!without_callback.has_observer());
        assert!(!without_callback.attach(SentinelId(0)));

        let disabled = SentinelController::new(
            LazyLoadDetails::default(),
            Some(counting_callback(counter)),
        );
        assert!(!disabled.has_observer());
    }

    #[test]
    fn observer_follows_the_enable_flag() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut controller = SentinelController::new(
            LazyLoadDetails::default(),
            Some(counting_callback(counter)),
        );
        assert!(!controller.attach(SentinelId(4)));

        controller.update_details(enabled());
        assert!(controller.has_observer());
        assert!(controller.attach(SentinelId(4)));

        // Flag updates while enabled keep the observed sentinel.
        controller.update_details(LazyLoadDetails {
            is_loading: true,
            ..enabled()
        });
        assert!(controller.is_observing(SentinelId(4)));

        controller.update_details(LazyLoadDetails::default());
        assert!(!controller.has_observer());
    }

    #[tokio::test]
    async fn fires_once_per_sentinel() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut controller =
            SentinelController::new(enabled(), Some(counting_callback(Arc::clone(&counter))));

        assert!(controller.attach(SentinelId(9)));
        assert!(controller.on_visibility_changed(SentinelId(9), false).is_none());

        let load = controller.on_visibility_changed(SentinelId(9), true);
        assert!(!controller.is_observing(SentinelId(9)));
        assert!(controller.on_visibility_changed(SentinelId(9), true).is_none());

        if let Some(load) = load {
            load.await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(controller.triggers(), 1);
    }

    #[tokio::test]
    async fn new_sentinel_observes_while_previous_load_is_pending() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut controller =
            SentinelController::new(enabled(), Some(counting_callback(Arc::clone(&counter))));

        controller.attach(SentinelId(9));
        let first = controller.on_visibility_changed(SentinelId(9), true);

        // The host appended rows and re-rendered before the first load completed.
        controller.attach(SentinelId(19));
        let second = controller.spawn_on_visible(SentinelId(19), true);

        if let Some(load) = first {
            load.await;
        }
        if let Some(handle) = second {
            assert!(handle.await.is_ok());
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn details_deserialize_with_defaults() -> Result<(), serde_json::Error> {
        let details: LazyLoadDetails =
            serde_json::from_str(r#"{ "enableLazyLoad": true, "isLoading": true }"#)?;
        assert!(details.enable_lazy_load && details.is_loading);
        assert!(!details.more_items);
        Ok(())
    }
}
