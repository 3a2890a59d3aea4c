use crate::render::{CardRenderer, Render, RenderOutput};
use crate::{Fetcher, MetadataSource, PreviewState};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    target: String,
    generation: u64,
    state: PreviewState,
}

type SharedSnapshot = Arc<watch::Sender<Snapshot>>;

/// Drives the fetch-and-render lifecycle for a single preview target.
///
/// Every accepted [`set_target`](PreviewFetcher::set_target) call bumps a
/// generation counter. A lookup only writes its outcome back if its
/// generation is still current, so a late response for an old target can
/// never overwrite the state of a newer one.
pub struct PreviewFetcher<S = Fetcher> {
    source: Arc<S>,
    snapshot: SharedSnapshot,
    runtime: Option<Handle>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for PreviewFetcher<Fetcher> {
    fn default() -> Self {
        Self::new(Fetcher::default())
    }
}

impl<S: MetadataSource + 'static> PreviewFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Lets several widgets share one source, e.g. a single HTTP client or cache.
    ///
    /// Lookups run on the runtime entered at construction time, if any.
    pub fn with_shared_source(source: Arc<S>) -> Self {
        Self::build(source, Handle::try_current().ok())
    }

    /// Runs lookups on `handle`, so `set_target` may be called from threads
    /// outside the runtime, e.g. a UI thread.
    pub fn with_handle(source: S, handle: Handle) -> Self {
        Self::build(Arc::new(source), Some(handle))
    }

    fn build(source: Arc<S>, runtime: Option<Handle>) -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            source,
            snapshot: Arc::new(sender),
            runtime,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn current_state(&self) -> PreviewState {
        self.snapshot.borrow().state.clone()
    }

    pub fn target(&self) -> String {
        self.snapshot.borrow().target.clone()
    }

    /// Points the widget at a new URL.
    ///
    /// An empty URL resets to `Idle` immediately. A different non-empty URL
    /// moves to `Loading` and starts a lookup in the background. Setting the
    /// same URL again is a no-op unless the last attempt failed, in which
    /// case the lookup is retried.
    pub fn set_target(&self, url: impl Into<String>) {
        let url = url.into();
        debug!(url = %url, "Target set");

        let mut issued = None;
        self.snapshot.send_if_modified(|snap| {
            if snap.target == url && !snap.state.is_failed() {
                return false;
            }

            snap.generation += 1;
            snap.target.clone_from(&url);
            if url.is_empty() {
                snap.state = PreviewState::Idle;
            } else {
                snap.state = PreviewState::Loading;
                issued = Some(snap.generation);
            }
            true
        });

        match issued {
            Some(generation) => self.spawn_lookup(url, generation),
            None => debug!("Target unchanged or cleared, no lookup issued"),
        }
    }

    /// Watches state changes, e.g. to trigger a host re-render.
    pub fn subscribe(&self) -> PreviewWatcher {
        PreviewWatcher {
            receiver: self.snapshot.subscribe(),
        }
    }

    /// Waits until the current target is no longer loading.
    pub async fn settled(&self) -> PreviewState {
        let mut watcher = self.subscribe();
        watcher.settled().await
    }

    pub fn render(&self) -> RenderOutput {
        self.render_with(&CardRenderer::default())
    }

    pub fn render_with<R: Render>(&self, renderer: &R) -> R::Output {
        // released before rendering: a renderer may call back into set_target
        let (state, target) = {
            let snap = self.snapshot.borrow();
            (snap.state.clone(), snap.target.clone())
        };
        renderer.render(&state, &target)
    }

    fn spawn_lookup(&self, target: String, generation: u64) {
        let runtime = match self.runtime.clone().map_or_else(Handle::try_current, Ok) {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "No async runtime available to run the lookup");
                apply_outcome(&self.snapshot, generation, PreviewState::Failed);
                return;
            }
        };

        let source = Arc::clone(&self.source);
        let guard = LoadingGuard {
            snapshot: Arc::clone(&self.snapshot),
            generation,
            finished: false,
        };

        let handle = runtime.spawn(async move {
            debug!(target_url = %target, generation, "Looking up preview metadata");
            let next = match source.lookup(&target).await {
                Ok(metadata) => PreviewState::Ready(metadata),
                Err(e) => {
                    e.log();
                    PreviewState::Failed
                }
            };
            guard.finish(next);
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }
}

impl<S> Drop for PreviewFetcher<S> {
    fn drop(&mut self) {
        let tasks = self
            .tasks
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

/// Leaves `Loading` however the lookup ends: with its outcome on
/// completion, or as `Failed` if the task panics or is aborted first.
struct LoadingGuard {
    snapshot: SharedSnapshot,
    generation: u64,
    finished: bool,
}

impl LoadingGuard {
    fn finish(mut self, next: PreviewState) {
        apply_outcome(&self.snapshot, self.generation, next);
        self.finished = true;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if !self.finished {
            apply_outcome(&self.snapshot, self.generation, PreviewState::Failed);
        }
    }
}

fn apply_outcome(snapshot: &watch::Sender<Snapshot>, generation: u64, next: PreviewState) {
    let label = next.label();
    let applied = snapshot.send_if_modified(|snap| {
        if snap.generation != generation || !snap.state.is_loading() {
            return false;
        }
        snap.state = next;
        true
    });

    if applied {
        debug!(generation, state = label, "Preview state updated");
    } else {
        debug!(generation, "Discarding stale lookup result");
    }
}

/// Receives every state change of a [`PreviewFetcher`].
#[derive(Clone)]
pub struct PreviewWatcher {
    receiver: watch::Receiver<Snapshot>,
}

impl PreviewWatcher {
    pub fn current(&self) -> PreviewState {
        self.receiver.borrow().state.clone()
    }

    /// Waits for the next state change. Returns `None` once the fetcher is gone.
    pub async fn changed(&mut self) -> Option<PreviewState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().state.clone())
    }

    /// Waits until the state is anything but `Loading`. If the fetcher is
    /// dropped mid-flight the last observed state is returned.
    pub async fn settled(&mut self) -> PreviewState {
        if let Ok(snap) = self.receiver.wait_for(|snap| !snap.state.is_loading()).await {
            return snap.state.clone();
        }
        self.current()
    }
}
