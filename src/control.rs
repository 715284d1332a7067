//! Control loop
//!
//! Runs a [`MediaPlayer`] on its own named thread so every transport
//! mutation happens on one owner. The loop selects over the command channel
//! and a publish ticker. The ticker is only armed while the publisher is
//! active; otherwise it is `never()`, so a pause cancels the schedule before
//! the next select. Commands that leave the publisher generation alone keep
//! the running ticker. A tick that was already queued is still harmless: the
//! transport rejects its stale token.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::engine::{MediaHandle, RenderEngine, TickToken};
use crate::error::{MediaError, Result};
use crate::events::PlayerEvent;
use crate::player::{Command, MediaPlayer};

const THREAD_NAME: &str = "mediaplay-control";

/// Messages accepted by the control thread
#[derive(Debug)]
pub enum ControlMessage {
    Command(Command),
    Load(MediaHandle),
    Shutdown,
}

/// Owner-side handle to a running control loop
///
/// Dropping the handle shuts the loop down and joins the thread.
#[derive(Debug)]
pub struct ControlHandle {
    cmd_tx: Sender<ControlMessage>,
    events_rx: Receiver<PlayerEvent>,
    join: Option<JoinHandle<()>>,
}

impl ControlHandle {
    /// Queue a UI command
    pub fn send(&self, command: Command) -> Result<()> {
        self.post(ControlMessage::Command(command))
    }

    /// Queue a media load
    pub fn load(&self, media: MediaHandle) -> Result<()> {
        self.post(ControlMessage::Load(media))
    }

    /// Receiver for events published by the loop
    pub fn events(&self) -> &Receiver<PlayerEvent> {
        &self.events_rx
    }

    /// Stop the loop and wait for the thread to exit. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        // The loop may already be gone if the receiver side hung up
        let _ = self.cmd_tx.send(ControlMessage::Shutdown);
        if join.join().is_err() {
            warn!("[CONTROL] Control thread panicked");
        }
        debug!("[CONTROL] Stopped");
    }

    fn post(&self, message: ControlMessage) -> Result<()> {
        self.cmd_tx.send(message).map_err(|_| {
            MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "control loop is not running",
            ))
        })
    }
}

impl Drop for ControlHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Move `player` onto a control thread
pub fn spawn<E>(player: MediaPlayer<E>) -> Result<ControlHandle>
where
    E: RenderEngine + Send + 'static,
{
    let (cmd_tx, cmd_rx) = unbounded();
    let (events_tx, events_rx) = unbounded();
    let interval = player.config().publish_interval();

    let join = thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || run_control_loop(player, cmd_rx, events_tx, interval))?;

    Ok(ControlHandle {
        cmd_tx,
        events_rx,
        join: Some(join),
    })
}

fn run_control_loop<E: RenderEngine>(
    mut player: MediaPlayer<E>,
    cmd_rx: Receiver<ControlMessage>,
    events_tx: Sender<PlayerEvent>,
    interval: Duration,
) {
    debug!("[CONTROL] Started, publishing every {:?}", interval);
    let mut armed_for = publisher_token(&player);
    let mut ticker = ticker_for(armed_for, interval);

    loop {
        select! {
            recv(cmd_rx) -> msg => {
                let Ok(msg) = msg else { break };
                match msg {
                    ControlMessage::Command(command) => player.handle(command),
                    ControlMessage::Load(media) => {
                        if let Err(e) = player.load(media) {
                            debug!("[CONTROL] Load failed: {}", e);
                        }
                    }
                    ControlMessage::Shutdown => break,
                }
            }
            recv(ticker) -> _ => {
                player.on_tick();
            }
        }

        // Only a new publisher generation restarts the schedule
        let token = publisher_token(&player);
        if token != armed_for {
            armed_for = token;
            ticker = ticker_for(armed_for, interval);
        }

        if !forward(&mut player, &events_tx) {
            break;
        }
    }

    player.shutdown();
    forward(&mut player, &events_tx);
    debug!("[CONTROL] Loop exited");
}

fn publisher_token<E: RenderEngine>(player: &MediaPlayer<E>) -> Option<TickToken> {
    player.transport().publisher().token()
}

/// A fresh ticker for a live generation, otherwise one that never fires
fn ticker_for(token: Option<TickToken>, interval: Duration) -> Receiver<Instant> {
    match token {
        Some(_) => tick(interval),
        None => never(),
    }
}

/// Forward queued events; false once the receiver is gone
fn forward<E: RenderEngine>(player: &mut MediaPlayer<E>, events_tx: &Sender<PlayerEvent>) -> bool {
    player
        .drain_events()
        .into_iter()
        .all(|event| events_tx.send(event).is_ok())
}
