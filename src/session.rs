//! Trainer session state machine.
//!
//! `Idle` (no quadrant) -> `QuadrantSelected` -> `Active` (activity + challenge).
//!
//! A correct answer does not replace the challenge immediately: the caller gets an
//! `AdvanceTicket` and is expected to hand it back through `advance` after the pacing
//! delay. While a ticket is outstanding all input is ignored, and any quadrant or
//! activity change invalidates it.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::board::{coordinates_for, Coordinate, Quadrant};
use crate::domain::{Activity, Challenge, Direction, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    QuadrantSelected,
    Active,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("select a quadrant before starting an activity")]
    NoQuadrant,
}

/// Permission to replace the challenge that was just answered correctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceTicket {
    epoch: u64,
}

/// Result of a judged input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Judgement {
    pub verdict: Verdict,
    pub expected: Direction,
    /// Present only for correct answers.
    pub ticket: Option<AdvanceTicket>,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    quadrant: Option<Quadrant>,
    activity: Option<Activity>,
    challenge: Option<Challenge>,
    score: u32,
    feedback: Option<Verdict>,
    // Bumped whenever the challenge is replaced or the session is reset.
    epoch: u64,
    pending: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quadrant(&self) -> Option<Quadrant> {
        self.quadrant
    }
    pub fn activity(&self) -> Option<Activity> {
        self.activity
    }
    pub fn challenge(&self) -> Option<Challenge> {
        self.challenge
    }
    pub fn score(&self) -> u32 {
        self.score
    }
    pub fn feedback(&self) -> Option<Verdict> {
        self.feedback
    }
    pub fn awaiting_next(&self) -> bool {
        self.pending.is_some()
    }

    pub fn phase(&self) -> Phase {
        match (self.quadrant, self.activity) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::QuadrantSelected,
            (Some(_), Some(_)) => Phase::Active,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn select_quadrant(&mut self, quadrant: Quadrant) {
        self.quadrant = Some(quadrant);
        self.activity = None;
        self.challenge = None;
        self.feedback = None;
        self.score = 0;
        self.invalidate();
    }

    #[instrument(level = "debug", skip(self, rng))]
    pub fn start_activity<R: Rng>(&mut self, activity: Activity, rng: &mut R) -> Result<(), SessionError> {
        if self.quadrant.is_none() {
            return Err(SessionError::NoQuadrant);
        }
        self.activity = Some(activity);
        self.score = 0;
        self.invalidate();
        self.generate_challenge(rng);
        Ok(())
    }

    /// Judge directional input. `None` means the input was ignored: no activity,
    /// no challenge, or the current challenge is already answered and waiting to advance.
    #[instrument(level = "debug", skip(self))]
    pub fn submit_input(&mut self, input: Direction) -> Option<Judgement> {
        if self.activity.is_none() || self.pending.is_some() {
            return None;
        }
        let challenge = self.challenge?;
        let verdict = challenge.judge(input);
        self.feedback = Some(verdict);

        let ticket = match verdict {
            Verdict::Correct => {
                self.score += 1;
                self.pending = Some(self.epoch);
                Some(AdvanceTicket { epoch: self.epoch })
            }
            Verdict::Wrong => None,
        };
        Some(Judgement { verdict, expected: challenge.expected(), ticket })
    }

    /// Replace the answered challenge. Stale tickets are ignored and return `false`.
    pub fn advance<R: Rng>(&mut self, ticket: AdvanceTicket, rng: &mut R) -> bool {
        if self.pending != Some(ticket.epoch) || ticket.epoch != self.epoch {
            debug!(target: "session", ticket = ticket.epoch, epoch = self.epoch, "Dropping stale advance ticket");
            return false;
        }
        self.pending = None;
        self.generate_challenge(rng);
        true
    }

    fn invalidate(&mut self) {
        self.epoch += 1;
        self.pending = None;
    }

    /// Draw a fresh challenge from the selected quadrant, never repeating the
    /// previous one in place when the pool has more than one cell.
    fn generate_challenge<R: Rng>(&mut self, rng: &mut R) {
        let (Some(quadrant), Some(activity)) = (self.quadrant, self.activity) else {
            return;
        };
        let pool = coordinates_for(quadrant);
        let previous = self.challenge;
        let draw = |rng: &mut R| -> Coordinate { pool[rng.gen_range(0..pool.len())] };

        let next = loop {
            let candidate = match activity {
                Activity::Grid | Activity::Text => Challenge::Single { coordinate: draw(rng) },
                Activity::Pair => Challenge::Pair { c1: draw(rng), c2: draw(rng) },
            };
            if previous != Some(candidate) || pool.len() <= 1 {
                break candidate;
            }
        };

        self.challenge = Some(next);
        self.feedback = None;
        self.epoch += 1;
    }

    #[cfg(test)]
    pub(crate) fn force_challenge(&mut self, challenge: Challenge) {
        self.challenge = Some(challenge);
        self.pending = None;
        self.epoch += 1;
    }
}
