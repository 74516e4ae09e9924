//! Per-connection trainer: owns one `Session`, applies client messages to it, and
//! paces challenge replacement after correct answers.
//!
//! The pacing delay runs as a one-shot tokio task that posts the `AdvanceTicket`
//! back through an mpsc channel. The task is aborted on any quadrant/activity change
//! and when the trainer is dropped; a ticket that still slips through is rejected
//! by the session's epoch check.

use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::board::Quadrant;
use crate::domain::Direction;
use crate::protocol::{board_out, to_out, ClientWsMessage, ServerWsMessage};
use crate::session::{AdvanceTicket, Session};
use crate::state::AppState;

pub struct Trainer {
  id: String,
  state: Arc<AppState>,
  session: Session,
  rng: StdRng,
  advance_tx: mpsc::UnboundedSender<AdvanceTicket>,
  pending: Option<JoinHandle<()>>,
}

impl Trainer {
  pub fn new(state: Arc<AppState>, advance_tx: mpsc::UnboundedSender<AdvanceTicket>) -> Self {
    Self::with_rng(state, advance_tx, StdRng::from_entropy())
  }

  pub fn with_rng(state: Arc<AppState>, advance_tx: mpsc::UnboundedSender<AdvanceTicket>, rng: StdRng) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      state,
      session: Session::new(),
      rng,
      advance_tx,
      pending: None,
    }
  }

  pub fn id(&self) -> &str { &self.id }

  /// Register the session and produce the greeting for the client.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn open(&self) -> Vec<ServerWsMessage> {
    info!(target: "session", id = %self.id, "Session opened");
    vec![
      ServerWsMessage::Hello { session_id: self.id.clone() },
      self.publish().await,
    ]
  }

  /// Apply one client message. `None` means nothing to send back (ignored input).
  #[instrument(level = "debug", skip(self), fields(session = %self.id))]
  pub async fn handle(&mut self, msg: ClientWsMessage) -> Option<ServerWsMessage> {
    match msg {
      ClientWsMessage::Ping => Some(ServerWsMessage::Pong),

      ClientWsMessage::Board => {
        let quadrant = self.session.quadrant().unwrap_or(Quadrant::All);
        Some(ServerWsMessage::Board { board: board_out(quadrant) })
      }

      ClientWsMessage::SelectQuadrant { quadrant } => {
        self.cancel_pending();
        self.session.select_quadrant(quadrant);
        info!(target: "session", id = %self.id, ?quadrant, "Quadrant selected");
        Some(self.publish().await)
      }

      ClientWsMessage::StartActivity { activity } => {
        match self.session.start_activity(activity, &mut self.rng) {
          Ok(()) => {
            self.cancel_pending();
            info!(target: "session", id = %self.id, ?activity, challenge = ?self.session.challenge(), "Activity started");
            Some(self.publish().await)
          }
          Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
        }
      }

      ClientWsMessage::Input { direction } => self.input(direction).await,

      ClientWsMessage::KeyDown { key } => match Direction::from_key(&key) {
        Some(direction) => self.input(direction).await,
        None => None,
      },
    }
  }

  async fn input(&mut self, direction: Direction) -> Option<ServerWsMessage> {
    let Some(judgement) = self.session.submit_input(direction) else {
      debug!(target: "session", id = %self.id, ?direction, "Input ignored");
      return None;
    };
    info!(
      target: "session",
      id = %self.id,
      ?direction,
      verdict = ?judgement.verdict,
      expected = ?judgement.expected,
      score = self.session.score(),
      "Input judged"
    );
    if let Some(ticket) = judgement.ticket {
      self.schedule(ticket);
    }
    Some(self.publish().await)
  }

  /// Called when a pacing task fires.
  #[instrument(level = "debug", skip(self), fields(session = %self.id))]
  pub async fn on_advance(&mut self, ticket: AdvanceTicket) -> Option<ServerWsMessage> {
    self.pending = None;
    if !self.session.advance(ticket, &mut self.rng) {
      return None;
    }
    debug!(target: "session", id = %self.id, challenge = ?self.session.challenge(), "Next challenge");
    Some(self.publish().await)
  }

  /// Unsubscribe: cancel pacing and drop the snapshot from the registry.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn close(mut self) {
    self.cancel_pending();
    self.state.unregister(&self.id).await;
    info!(target: "session", id = %self.id, score = self.session.score(), "Session closed");
  }

  fn schedule(&mut self, ticket: AdvanceTicket) {
    self.cancel_pending();
    let tx = self.advance_tx.clone();
    let delay = self.state.config.pacing.delay();
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      // Receiver gone means the connection is closing.
      let _ = tx.send(ticket);
    }));
  }

  fn cancel_pending(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  async fn publish(&self) -> ServerWsMessage {
    let snapshot = to_out(&self.session, &self.state.config.feedback);
    self.state.publish(&self.id, snapshot.clone()).await;
    ServerWsMessage::State { session: snapshot }
  }
}

impl Drop for Trainer {
  fn drop(&mut self) {
    self.cancel_pending();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  use crate::board::Coordinate;
  use crate::config::TrainerConfig;
  use crate::domain::{Activity, Challenge, Verdict};
  use crate::protocol::SessionOut;
  use crate::session::Phase;

  fn c(s: &str) -> Coordinate { s.parse().unwrap() }

  fn setup() -> (Arc<AppState>, Trainer, mpsc::UnboundedReceiver<AdvanceTicket>) {
    let state = Arc::new(AppState::with_config(TrainerConfig::default()));
    let (tx, rx) = mpsc::unbounded_channel();
    let trainer = Trainer::with_rng(state.clone(), tx, StdRng::seed_from_u64(42));
    (state, trainer, rx)
  }

  fn session_of(msg: Option<ServerWsMessage>) -> SessionOut {
    match msg {
      Some(ServerWsMessage::State { session }) => session,
      other => panic!("expected state message, got {other:?}"),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn open_registers_and_close_unregisters() {
    let (state, trainer, _rx) = setup();
    let greeting = trainer.open().await;
    assert!(matches!(&greeting[0], ServerWsMessage::Hello { session_id } if session_id == trainer.id()));
    let id = trainer.id().to_string();
    assert_eq!(state.get_session(&id).await.unwrap().phase, Phase::Idle);

    trainer.close().await;
    assert!(state.get_session(&id).await.is_none());
    assert_eq!(state.live_sessions().await, 0);
  }

  #[tokio::test(start_paused = true)]
  async fn correct_answer_advances_after_pacing_delay() {
    let (state, mut trainer, mut rx) = setup();
    trainer.handle(ClientWsMessage::SelectQuadrant { quadrant: Quadrant::BottomLeft }).await;
    trainer.handle(ClientWsMessage::StartActivity { activity: Activity::Grid }).await;
    trainer.session.force_challenge(Challenge::Single { coordinate: c("a1") });

    let out = session_of(trainer.handle(ClientWsMessage::Input { direction: Direction::Left }).await);
    assert_eq!(out.feedback, Some(Verdict::Correct));
    assert_eq!(out.feedback_text, "Correct!");
    assert_eq!(out.score, 1);
    assert!(out.awaiting_next);
    assert_eq!(state.get_session(trainer.id()).await.unwrap().score, 1);

    let started = tokio::time::Instant::now();
    let ticket = rx.recv().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(500));

    let out = session_of(trainer.on_advance(ticket).await);
    assert!(!out.awaiting_next);
    assert_eq!(out.feedback, None);
    assert_eq!(out.score, 1);
    assert_ne!(out.challenge, Some(Challenge::Single { coordinate: c("a1") }));
  }

  #[tokio::test(start_paused = true)]
  async fn input_is_ignored_while_advance_is_pending() {
    let (_state, mut trainer, _rx) = setup();
    trainer.handle(ClientWsMessage::SelectQuadrant { quadrant: Quadrant::TopRight }).await;
    trainer.handle(ClientWsMessage::StartActivity { activity: Activity::Pair }).await;
    trainer.session.force_challenge(Challenge::Pair { c1: c("e5"), c2: c("f5") });

    let out = session_of(trainer.handle(ClientWsMessage::Input { direction: Direction::Right }).await);
    assert_eq!(out.score, 1);
    assert!(trainer.handle(ClientWsMessage::Input { direction: Direction::Left }).await.is_none());
    assert!(trainer.handle(ClientWsMessage::KeyDown { key: "ArrowRight".into() }).await.is_none());
    assert_eq!(trainer.session.score(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn quadrant_change_cancels_pending_advance() {
    let (_state, mut trainer, mut rx) = setup();
    trainer.handle(ClientWsMessage::SelectQuadrant { quadrant: Quadrant::BottomLeft }).await;
    trainer.handle(ClientWsMessage::StartActivity { activity: Activity::Text }).await;
    trainer.session.force_challenge(Challenge::Single { coordinate: c("b1") });
    trainer.handle(ClientWsMessage::KeyDown { key: "ArrowRight".into() }).await;

    trainer.handle(ClientWsMessage::SelectQuadrant { quadrant: Quadrant::All }).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(trainer.session.phase(), Phase::QuadrantSelected);
  }

  #[tokio::test(start_paused = true)]
  async fn wrong_answer_does_not_schedule() {
    let (_state, mut trainer, mut rx) = setup();
    trainer.handle(ClientWsMessage::SelectQuadrant { quadrant: Quadrant::BottomLeft }).await;
    trainer.handle(ClientWsMessage::StartActivity { activity: Activity::Grid }).await;
    trainer.session.force_challenge(Challenge::Single { coordinate: c("a1") });

    let out = session_of(trainer.handle(ClientWsMessage::Input { direction: Direction::Right }).await);
    assert_eq!(out.feedback, Some(Verdict::Wrong));
    assert_eq!(out.feedback_text, "Wrong!");
    assert_eq!(out.score, 0);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn rejected_and_ignored_messages() {
    let (_state, mut trainer, _rx) = setup();
    assert!(matches!(
      trainer.handle(ClientWsMessage::StartActivity { activity: Activity::Grid }).await,
      Some(ServerWsMessage::Error { .. })
    ));
    assert!(trainer.handle(ClientWsMessage::Input { direction: Direction::Left }).await.is_none());
    assert!(trainer.handle(ClientWsMessage::KeyDown { key: "Enter".into() }).await.is_none());
    assert!(matches!(trainer.handle(ClientWsMessage::Ping).await, Some(ServerWsMessage::Pong)));
    match trainer.handle(ClientWsMessage::Board).await {
      Some(ServerWsMessage::Board { board }) => assert_eq!(board.coordinates.len(), 64),
      other => panic!("expected board, got {other:?}"),
    }
  }
}
