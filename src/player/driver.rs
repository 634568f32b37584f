//! Player dispatch loop
//!
//! Host callbacks (audio ticks, seeks, resizes, media errors) are queued as
//! [`PlayerInput`]s and handled one at a time alongside render completions,
//! so player state is only ever touched from this loop.

use super::player::LessonPlayer;
use super::sync::SyncOutcome;
use super::PlayerError;
use crate::recorder::TimeSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Input from the host's media element and viewport
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    /// Audio clock position
    TimeUpdate(u64),
    /// User moved the playhead
    Seek(u64),
    Resize { width: u32 },
    AudioReady,
    AudioFailed(String),
    Close,
}

/// Notifications published by the dispatch loop
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    Synced {
        position_ms: u64,
        slide: u32,
        outcome: SyncOutcome,
    },
    SlideRendered { page: u32 },
    Resized { width: u32, height: u32 },
    AudioUnavailable { message: String },
    Closed,
}

/// Run the dispatch loop until `Close` arrives or every sender is dropped.
///
/// Returns the player so callers can inspect its final state.
pub async fn run_player(
    mut player: LessonPlayer,
    mut inputs: mpsc::Receiver<PlayerInput>,
    updates: broadcast::Sender<PlayerUpdate>,
) -> LessonPlayer {
    let outcome = player.start();
    let _ = updates.send(synced(&player, outcome));

    loop {
        tokio::select! {
            biased;

            input = inputs.recv() => {
                let Some(input) = input else {
                    break;
                };
                if input == PlayerInput::Close {
                    break;
                }
                if let Err(e) = handle_input(&mut player, input, &updates) {
                    tracing::warn!("Player input rejected: {}", e);
                }
            }

            Some(done) = player.next_render() => {
                let page = done.page;
                if player.apply_render(done) {
                    let _ = updates.send(PlayerUpdate::SlideRendered { page });
                }
            }
        }
    }

    player.close();
    let _ = updates.send(PlayerUpdate::Closed);
    player
}

fn synced(player: &LessonPlayer, outcome: SyncOutcome) -> PlayerUpdate {
    PlayerUpdate::Synced {
        position_ms: player.position_ms(),
        slide: player.current_slide(),
        outcome,
    }
}

fn handle_input(
    player: &mut LessonPlayer,
    input: PlayerInput,
    updates: &broadcast::Sender<PlayerUpdate>,
) -> Result<(), PlayerError> {
    match input {
        PlayerInput::TimeUpdate(ms) => {
            let outcome = player.on_time_update(ms)?;
            // Quiet ticks are the common case
            if outcome.applied > 0 || outcome.rewound {
                let _ = updates.send(synced(player, outcome));
            }
        }
        PlayerInput::Seek(ms) => {
            let outcome = player.seek(ms)?;
            let _ = updates.send(synced(player, outcome));
        }
        PlayerInput::Resize { width } => {
            player.resize(width)?;
            let (width, height) = player.canvas_size();
            let _ = updates.send(PlayerUpdate::Resized { width, height });
        }
        PlayerInput::AudioReady => player.on_audio_ready(),
        PlayerInput::AudioFailed(reason) => {
            let error = player.on_audio_failed(reason);
            let _ = updates.send(PlayerUpdate::AudioUnavailable {
                message: error.to_string(),
            });
        }
        PlayerInput::Close => {}
    }
    Ok(())
}

/// Handle to a player running on its own task
pub struct PlayerHandle {
    inputs: mpsc::Sender<PlayerInput>,
    updates: broadcast::Sender<PlayerUpdate>,
    task: JoinHandle<LessonPlayer>,
}

impl PlayerHandle {
    /// Spawn the dispatch loop for `player`
    pub fn spawn(player: LessonPlayer, queue_capacity: usize) -> Self {
        let (inputs, rx) = mpsc::channel(queue_capacity.max(1));
        let (updates, _) = broadcast::channel(64);
        let task = tokio::spawn(run_player(player, rx, updates.clone()));
        Self {
            inputs,
            updates,
            task,
        }
    }

    /// Sender for host callbacks
    pub fn inputs(&self) -> mpsc::Sender<PlayerInput> {
        self.inputs.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerUpdate> {
        self.updates.subscribe()
    }

    pub async fn send(&self, input: PlayerInput) -> Result<(), PlayerError> {
        self.inputs.send(input).await.map_err(|_| PlayerError::Closed)
    }

    /// Close the player and wait for the loop to finish
    pub async fn close(self) -> Result<LessonPlayer, PlayerError> {
        let _ = self.inputs.send(PlayerInput::Close).await;
        self.task
            .await
            .map_err(|e| PlayerError::Task(e.to_string()))
    }
}

/// Emit `TimeUpdate`s from a clock at a fixed interval, standing in for a
/// media element when playing headless. Stops when the player goes away.
pub fn spawn_clock_ticks(
    inputs: mpsc::Sender<PlayerInput>,
    clock: Arc<dyn TimeSource>,
    interval_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        loop {
            ticker.tick().await;
            if inputs
                .send(PlayerInput::TimeUpdate(clock.now_ms()))
                .await
                .is_err()
            {
                break;
            }
        }
    })
}
