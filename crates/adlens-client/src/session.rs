//! Acquisition session.
//!
//! A session is an owner task spawned once per report. It seeds a loading
//! snapshot, runs the acquisition routine exactly once (with pending-poll
//! retries), and accepts user overrides. Consumers observe immutable
//! [`ReportState`] snapshots through a watch channel; nothing outside the
//! worker mutates state.
//!
//! Interleaving is resolved by two rules:
//! - every acquisition event carries the generation current when the
//!   acquisition was authorized; a stale event is dropped, so a poll
//!   completion can never overwrite a later override ("last commit wins"),
//! - an accepted override aborts the in-flight acquisition task, and
//!   dropping the session handle aborts the worker and with it the
//!   acquisition task.

use std::fmt;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use adlens_core::classify::{classify, is_loading_block};
use adlens_core::ingest::{accept_override, OverridePayload};
use adlens_core::model::{auth_error_block, loading_block, Envelope, ReportMetadata};
use adlens_core::view::{reduce, ViewModel};
use adlens_core::{AdlensError, AdlensResult};

use crate::config::{validate_config, SessionConfig};
use crate::fetch::{FetchBackend, FetchOutcome};
use crate::params::ReportParams;

/// Title of the seeded loading block.
pub const LOADING_TITLE: &str = "資料分析中";
/// Message of the seeded loading block.
pub const LOADING_MESSAGE: &str = "正在取得分析資料";
/// Title of the missing-parameter failure block.
pub const MISSING_PARAMS_TITLE: &str = "缺少參數";
/// Message of the missing-parameter failure block.
pub const MISSING_PARAMS_MESSAGE: &str = "URL 中缺少必要的 seller 或 date 參數以載入報告。";
/// Title of every acquisition failure block.
pub const FETCH_FAILED_TITLE: &str = "資料載入失敗";

fn failure_message(detail: &str) -> String {
    format!("無法載入分析報告。請檢查您的網路連線或稍後再試。 ({detail})")
}

fn transport_detail(status: u16) -> String {
    format!("伺服器錯誤: {status}")
}

fn exhausted_detail(attempts: u32) -> String {
    format!("報表產生逾時（已重試 {attempts} 次）")
}

fn failure_blocks(detail: &str) -> Vec<Value> {
    vec![auth_error_block(FETCH_FAILED_TITLE, &failure_message(detail))]
}

/// Observable lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Seeded state, before the first request is issued.
    Starting,
    /// First request in flight.
    Requesting,
    /// A pending response was committed; a retry is scheduled.
    Polling { attempt: u32 },
    /// Terminal: report data (or an override) committed.
    Ready,
    /// Terminal: an acquisition failure block committed.
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Ready | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Starting => write!(f, "starting"),
            Phase::Requesting => write!(f, "requesting"),
            Phase::Polling { attempt } => write!(f, "polling (attempt {attempt})"),
            Phase::Ready => write!(f, "ready"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Immutable snapshot of the session state.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub blocks: Vec<Value>,
    pub metadata: ReportMetadata,
    /// The override-editable text: the pretty-printed envelope once a
    /// non-pending report or an override has been committed, empty before.
    pub editor_text: String,
    /// Commit counter; grows by one with every published snapshot.
    pub generation: u64,
    pub phase: Phase,
}

impl ReportState {
    fn seed() -> Self {
        Self {
            blocks: vec![loading_block(LOADING_TITLE, LOADING_MESSAGE)],
            metadata: ReportMetadata::default(),
            editor_text: String::new(),
            generation: 0,
            phase: Phase::Starting,
        }
    }

    fn missing_params() -> Self {
        Self {
            blocks: vec![auth_error_block(MISSING_PARAMS_TITLE, MISSING_PARAMS_MESSAGE)],
            metadata: ReportMetadata::default(),
            editor_text: String::new(),
            generation: 0,
            phase: Phase::Failed,
        }
    }

    /// Classify and reduce the snapshot's blocks.
    pub fn view(&self) -> ViewModel {
        reduce(&classify(&self.blocks))
    }
}

enum Command {
    Override {
        text: String,
        reply: oneshot::Sender<AdlensResult<()>>,
    },
}

struct AcqEvent {
    generation: u64,
    update: AcqUpdate,
}

enum AcqUpdate {
    Requesting,
    Pending {
        blocks: Vec<Value>,
        metadata: ReportMetadata,
        attempt: u32,
    },
    Ready {
        blocks: Vec<Value>,
        metadata: ReportMetadata,
        editor_text: String,
    },
    Failed {
        blocks: Vec<Value>,
    },
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handle to a running session. Dropping it tears the session down.
pub struct Session {
    cmd_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ReportState>,
    _worker: AbortOnDrop,
}

impl Session {
    /// Spawn the session worker. With `params` absent the session starts in
    /// the terminal missing-parameter state and never touches the backend.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<B>(
        params: Option<ReportParams>,
        config: SessionConfig,
        backend: B,
    ) -> AdlensResult<Self>
    where
        B: FetchBackend + Send + 'static,
    {
        validate_config(&config)?;

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (acq_tx, acq_rx) = mpsc::unbounded_channel();

        let (initial, acq_task) = match params {
            Some(params) => {
                let task = tokio::spawn(acquire(backend, config, params, 0, acq_tx.clone()));
                (ReportState::seed(), Some(AbortOnDrop(task)))
            }
            None => {
                tracing::warn!("seller or date parameter missing; session starts failed");
                (ReportState::missing_params(), None)
            }
        };

        let (state_tx, state_rx) = watch::channel(initial);
        let worker = Worker {
            state_tx,
            acq_rx,
            _acq_tx: acq_tx,
            acq_generation: 0,
            acq_task,
        };
        let handle = tokio::spawn(worker.run(cmd_rx));

        Ok(Self {
            cmd_tx,
            state_rx,
            _worker: AbortOnDrop(handle),
        })
    }

    /// Clone of the current snapshot.
    pub fn state(&self) -> ReportState {
        self.state_rx.borrow().clone()
    }

    /// A receiver observing every committed snapshot.
    pub fn watch(&self) -> watch::Receiver<ReportState> {
        self.state_rx.clone()
    }

    /// Wait until the session reaches a terminal phase and return that
    /// snapshot. With an unbounded poll loop this resolves only once the
    /// report settles or an override commits.
    pub async fn settled(&self) -> ReportState {
        let mut rx = self.state_rx.clone();
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if snapshot.phase.is_terminal() {
                    return snapshot.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Validate `text` and commit it as the new report state.
    ///
    /// On rejection the session state is untouched and the validation
    /// message is returned.
    pub async fn override_report(&self, text: &str) -> AdlensResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Override {
                text: text.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| AdlensError::invariant("session worker is gone"))?;
        reply_rx
            .await
            .map_err(|_| AdlensError::invariant("session worker dropped the reply"))?
    }
}

struct Worker {
    state_tx: watch::Sender<ReportState>,
    acq_rx: mpsc::UnboundedReceiver<AcqEvent>,
    // Keepalive clone so the event branch never sees a closed channel.
    _acq_tx: mpsc::UnboundedSender<AcqEvent>,
    /// Generation the live acquisition task was authorized with. Bumped on
    /// override, which invalidates every event the task already sent.
    acq_generation: u64,
    acq_task: Option<AbortOnDrop>,
}

impl Worker {
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                command = cmd_rx.recv() => {
                    let Some(command) = command else { break };
                    match command {
                        Command::Override { text, reply } => {
                            let result = self.handle_override(&text);
                            let _ = reply.send(result);
                        }
                    }
                }
                Some(event) = self.acq_rx.recv() => {
                    self.apply_event(event);
                }
            }
        }
    }

    fn handle_override(&mut self, text: &str) -> AdlensResult<()> {
        let OverridePayload {
            blocks,
            metadata,
            editor_text,
        } = accept_override(text)?;

        // Supersede the in-flight acquisition; dropping the guard aborts it.
        self.acq_generation += 1;
        self.acq_task = None;

        self.state_tx.send_modify(|state| {
            state.generation += 1;
            state.blocks = blocks;
            state.metadata = metadata;
            state.editor_text = editor_text;
            state.phase = Phase::Ready;
        });
        tracing::info!(acq_generation = self.acq_generation, "override committed");
        Ok(())
    }

    fn apply_event(&mut self, event: AcqEvent) {
        if event.generation != self.acq_generation {
            tracing::debug!(
                event_generation = event.generation,
                current_generation = self.acq_generation,
                "dropping stale acquisition event"
            );
            return;
        }

        match event.update {
            AcqUpdate::Requesting => {
                self.state_tx.send_modify(|state| {
                    state.generation += 1;
                    state.phase = Phase::Requesting;
                });
            }
            AcqUpdate::Pending {
                blocks,
                metadata,
                attempt,
            } => {
                self.state_tx.send_modify(|state| {
                    state.generation += 1;
                    state.blocks = blocks;
                    state.metadata = metadata;
                    state.phase = Phase::Polling { attempt };
                });
            }
            AcqUpdate::Ready {
                blocks,
                metadata,
                editor_text,
            } => {
                self.acq_task = None;
                self.state_tx.send_modify(|state| {
                    state.generation += 1;
                    state.blocks = blocks;
                    state.metadata = metadata;
                    state.editor_text = editor_text;
                    state.phase = Phase::Ready;
                });
            }
            AcqUpdate::Failed { blocks } => {
                self.acq_task = None;
                self.state_tx.send_modify(|state| {
                    state.generation += 1;
                    state.blocks = blocks;
                    state.phase = Phase::Failed;
                });
            }
        }
    }
}

/// The acquisition routine. Runs once per session: one request, then a
/// retry loop for as long as the report stays pending. Every outcome is
/// reported as an event; the worker decides whether it still applies.
async fn acquire<B: FetchBackend>(
    backend: B,
    config: SessionConfig,
    params: ReportParams,
    generation: u64,
    events: mpsc::UnboundedSender<AcqEvent>,
) {
    let send = |update: AcqUpdate| {
        let _ = events.send(AcqEvent { generation, update });
    };

    tracing::info!(seller = %params.seller, date = %params.date, "starting report acquisition");
    send(AcqUpdate::Requesting);

    let mut attempt: u32 = 0;
    loop {
        match backend.fetch_report(&params.seller, &params.date).await {
            FetchOutcome::Success(raw) => {
                let envelope: Envelope = match serde_json::from_value(raw.clone()) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        tracing::warn!(error = %e, "report document failed to decode");
                        send(AcqUpdate::Failed {
                            blocks: failure_blocks(&e.to_string()),
                        });
                        return;
                    }
                };

                // Metadata commits even for a pending report.
                if envelope.data.first().map_or(false, is_loading_block) {
                    attempt += 1;
                    tracing::debug!(attempt, "report pending; scheduling retry");
                    send(AcqUpdate::Pending {
                        blocks: envelope.data,
                        metadata: envelope.metadata,
                        attempt,
                    });

                    if config.max_poll_attempts.is_some_and(|cap| attempt >= cap) {
                        tracing::warn!(attempt, "poll attempt cap exhausted");
                        send(AcqUpdate::Failed {
                            blocks: failure_blocks(&exhausted_detail(attempt)),
                        });
                        return;
                    }

                    tokio::time::sleep(config.poll_interval).await;
                    continue;
                }

                let editor_text = serde_json::to_string_pretty(&raw).unwrap_or_default();
                send(AcqUpdate::Ready {
                    blocks: envelope.data,
                    metadata: envelope.metadata,
                    editor_text,
                });
                return;
            }
            FetchOutcome::Transport { status } => {
                tracing::warn!(status, "report endpoint returned a failure status");
                send(AcqUpdate::Failed {
                    blocks: failure_blocks(&transport_detail(status)),
                });
                return;
            }
            FetchOutcome::Failed { detail } => {
                tracing::warn!(detail = %detail, "report acquisition failed");
                send(AcqUpdate::Failed {
                    blocks: failure_blocks(&detail),
                });
                return;
            }
        }
    }
}
