use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use loader_core::{
    update, Effect, FetchFailure, FetchTicket, LoadState, Msg, Operation, Phase, RenderOutcome,
};
use loader_logging::{loader_debug, loader_error, loader_info, loader_warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::{ControllerSettings, Fetcher};

/// Bounds every identity type must satisfy to cross the owner loop.
pub trait Identity: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}
impl<T> Identity for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// Bounds for fetched data and domain errors.
pub trait Payload: Clone + Send + Sync + 'static {}
impl<T> Payload for T where T: Clone + Send + Sync + 'static {}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("no tokio runtime available to host the controller")]
    NoRuntime,
    #[error("controller owner loop has stopped")]
    Stopped,
}

enum ControllerCommand<Id, Data, Err> {
    Dispatch(Msg<Id, Data, Err>),
    Flush(oneshot::Sender<()>),
}

type CommandSender<Id, Data, Err> = mpsc::UnboundedSender<ControllerCommand<Id, Data, Err>>;

/// Host-facing handle of one load controller.
///
/// All state lives in a single owner task; the handle only enqueues messages and
/// reads the latest published [`Operation`]. Dropping the handle stops the owner
/// task and cancels any in-flight fetch.
///
/// A fetch that panics is logged and treated like a cancellation: the phase stays
/// `Loading` and [`retry`](Self::retry) does nothing, since there is no error to
/// retry. Only another [`on_identity_changed`](Self::on_identity_changed) gets the
/// controller fetching again.
pub struct LoadController<Id, Data, Err> {
    label: Arc<str>,
    cmd_tx: CommandSender<Id, Data, Err>,
    snapshot_rx: watch::Receiver<Operation<Id, Data, Err>>,
    shutdown: CancellationToken,
}

impl<Id, Data, Err> LoadController<Id, Data, Err>
where
    Id: Identity,
    Data: Payload,
    Err: Payload,
{
    /// Spawns the owner loop on the current tokio runtime.
    pub fn spawn<F>(
        fetcher: F,
        initial_id: Id,
        settings: ControllerSettings,
    ) -> Result<Self, ControllerError>
    where
        F: Fetcher<Id, Data, Err> + 'static,
    {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;

        let label: Arc<str> = Arc::from(settings.label.as_str());
        let state = LoadState::new(initial_id).with_placeholder(settings.placeholder);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.operation().clone());
        let shutdown = CancellationToken::new();

        let owner = OwnerLoop {
            label: label.clone(),
            fetcher: Arc::new(fetcher),
            cancel_superseded: settings.cancel_superseded,
            cmd_tx: cmd_tx.clone(),
            snapshot_tx,
            shutdown: shutdown.clone(),
            in_flight: HashMap::new(),
        };
        runtime.spawn(owner.run(state, cmd_rx));

        loader_debug!(label: label, "controller started");
        Ok(Self {
            label,
            cmd_tx,
            snapshot_rx,
            shutdown,
        })
    }

    /// Announces the identity the host wants displayed. Call on every change and
    /// again whenever the view becomes visible; redundant calls are harmless.
    pub fn on_identity_changed(&self, id: Id) {
        self.dispatch(Msg::IdentityChanged(id));
    }

    /// Re-attempts the failed fetch for the current identity. Ignored outside `Error`.
    pub fn retry(&self) {
        self.dispatch(Msg::RetryRequested);
    }

    /// Cancels the in-flight fetch, if any. The phase stays `Loading` until the next
    /// announcement.
    pub fn cancel(&self) {
        self.dispatch(Msg::CancelRequested);
    }

    pub fn set_placeholder(&self, placeholder: bool) {
        self.dispatch(Msg::PlaceholderChanged(placeholder));
    }

    pub fn current_phase(&self) -> Phase<Data, Err> {
        self.snapshot_rx.borrow().phase.clone()
    }

    pub fn operation(&self) -> Operation<Id, Data, Err> {
        self.snapshot_rx.borrow().clone()
    }

    /// Projects the current phase to what the host should draw.
    pub fn present(&self) -> Presentation<Id, Data, Err> {
        let operation = self.snapshot_rx.borrow();
        match operation.phase.outcome() {
            RenderOutcome::Loading => Presentation::Loading,
            RenderOutcome::Content(data) => Presentation::Content(data.clone()),
            RenderOutcome::Failed(err) => Presentation::Failed {
                error: err.clone(),
                retry: self.retry_handle(),
            },
        }
    }

    pub fn retry_handle(&self) -> RetryHandle<Id, Data, Err> {
        RetryHandle {
            label: self.label.clone(),
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Receiver that observes every published operation change.
    pub fn subscribe(&self) -> watch::Receiver<Operation<Id, Data, Err>> {
        self.snapshot_rx.clone()
    }

    /// Resolves once every message sent before this call has been applied.
    pub async fn flush(&self) -> Result<(), ControllerError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(ControllerCommand::Flush(done_tx))
            .map_err(|_| ControllerError::Stopped)?;
        done_rx.await.map_err(|_| ControllerError::Stopped)
    }

    /// Waits until the published operation satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&Operation<Id, Data, Err>) -> bool,
    ) -> Result<Operation<Id, Data, Err>, ControllerError> {
        let mut rx = self.subscribe();
        let operation = rx
            .wait_for(|operation| predicate(operation))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        Ok(operation.clone())
    }

    fn dispatch(&self, msg: Msg<Id, Data, Err>) {
        if self.cmd_tx.send(ControllerCommand::Dispatch(msg)).is_err() {
            loader_warn!(label: self.label, "owner loop gone; message dropped");
        }
    }
}

impl<Id, Data, Err> Drop for LoadController<Id, Data, Err> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Zero-argument retry action handed to the host's error view.
pub struct RetryHandle<Id, Data, Err> {
    label: Arc<str>,
    cmd_tx: CommandSender<Id, Data, Err>,
}

impl<Id, Data, Err> RetryHandle<Id, Data, Err> {
    pub fn retry(&self) {
        if self
            .cmd_tx
            .send(ControllerCommand::Dispatch(Msg::RetryRequested))
            .is_err()
        {
            loader_warn!(label: self.label, "retry after controller shutdown ignored");
        }
    }
}

impl<Id, Data, Err> Clone for RetryHandle<Id, Data, Err> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            cmd_tx: self.cmd_tx.clone(),
        }
    }
}

impl<Id, Data, Err> fmt::Debug for RetryHandle<Id, Data, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryHandle")
            .field("label", &self.label)
            .finish()
    }
}

/// One of the three things a host renders, with the retry action attached to failures.
#[derive(Debug)]
pub enum Presentation<Id, Data, Err> {
    Loading,
    Content(Data),
    Failed {
        error: Err,
        retry: RetryHandle<Id, Data, Err>,
    },
}

struct OwnerLoop<Id, Data, Err, F> {
    label: Arc<str>,
    fetcher: Arc<F>,
    cancel_superseded: bool,
    cmd_tx: CommandSender<Id, Data, Err>,
    snapshot_tx: watch::Sender<Operation<Id, Data, Err>>,
    shutdown: CancellationToken,
    in_flight: HashMap<FetchTicket, CancellationToken>,
}

impl<Id, Data, Err, F> OwnerLoop<Id, Data, Err, F>
where
    Id: Identity,
    Data: Payload,
    Err: Payload,
    F: Fetcher<Id, Data, Err> + 'static,
{
    async fn run(
        mut self,
        mut state: LoadState<Id, Data, Err>,
        mut cmd_rx: mpsc::UnboundedReceiver<ControllerCommand<Id, Data, Err>>,
    ) {
        loop {
            let command = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                command = cmd_rx.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            match command {
                ControllerCommand::Dispatch(msg) => state = self.apply(state, msg),
                ControllerCommand::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }

        // Child tokens are already cancelled when shutdown fired; this covers the
        // closed-channel exit.
        for token in self.in_flight.values() {
            token.cancel();
        }
        loader_debug!(label: self.label, "controller stopped");
    }

    fn apply(
        &mut self,
        state: LoadState<Id, Data, Err>,
        msg: Msg<Id, Data, Err>,
    ) -> LoadState<Id, Data, Err> {
        loader_debug!(label: self.label, "apply {}", describe(&msg));
        if let Msg::FetchFinished { ticket, .. } = &msg {
            self.in_flight.remove(ticket);
        }

        let (mut state, effects) = update(state, msg);
        for effect in effects {
            self.execute(effect);
        }

        if state.consume_dirty() {
            self.snapshot_tx.send_replace(state.operation().clone());
        }
        state
    }

    fn execute(&mut self, effect: Effect<Id>) {
        match effect {
            Effect::StartFetch { ticket, id } => {
                loader_info!(label: self.label, "fetch #{} started for {:?}", ticket, id);
                let token = self.shutdown.child_token();
                self.in_flight.insert(ticket, token.clone());
                tokio::spawn(run_fetch(
                    self.label.clone(),
                    self.fetcher.clone(),
                    ticket,
                    id,
                    token,
                    self.cmd_tx.clone(),
                ));
            }
            Effect::CancelFetch { ticket } => {
                if !self.cancel_superseded {
                    loader_debug!(label: self.label, "fetch #{} superseded; result will be discarded", ticket);
                    return;
                }
                self.stop(ticket);
            }
            Effect::AbortFetch { ticket } => self.stop(ticket),
        }
    }

    fn stop(&mut self, ticket: FetchTicket) {
        if let Some(token) = self.in_flight.remove(&ticket) {
            loader_debug!(label: self.label, "fetch #{} cancelled", ticket);
            token.cancel();
        }
    }
}

async fn run_fetch<Id, Data, Err, F>(
    label: Arc<str>,
    fetcher: Arc<F>,
    ticket: FetchTicket,
    id: Id,
    token: CancellationToken,
    report: CommandSender<Id, Data, Err>,
) where
    Id: Identity,
    Data: Payload,
    Err: Payload,
    F: Fetcher<Id, Data, Err> + 'static,
{
    let fetch = AssertUnwindSafe(fetcher.fetch(id.clone())).catch_unwind();
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(FetchFailure::Cancelled),
        outcome = fetch => match outcome {
            Ok(result) => result,
            Err(_) => {
                // A panicking fetch leaves the phase in `Loading`, like a cancellation.
                loader_error!(label: label, "fetch #{} for {:?} panicked", ticket, id);
                Err(FetchFailure::Cancelled)
            }
        },
    };

    match &result {
        Ok(_) => loader_debug!(label: label, "fetch #{} succeeded", ticket),
        Err(FetchFailure::Cancelled) => loader_debug!(label: label, "fetch #{} cancelled", ticket),
        Err(FetchFailure::Failed(_)) => loader_warn!(label: label, "fetch #{} failed", ticket),
    }

    let _ = report.send(ControllerCommand::Dispatch(Msg::FetchFinished {
        ticket,
        id,
        result,
    }));
}

fn describe<Id, Data, Err>(msg: &Msg<Id, Data, Err>) -> &'static str {
    match msg {
        Msg::IdentityChanged(_) => "identity change",
        Msg::RetryRequested => "retry",
        Msg::CancelRequested => "cancel",
        Msg::PlaceholderChanged(_) => "placeholder toggle",
        Msg::FetchFinished { .. } => "fetch completion",
    }
}
