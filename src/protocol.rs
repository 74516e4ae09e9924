//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::board::{coordinates_for, grid_rows, is_dark, is_in_quadrant, quadrant_of, Coordinate, Quadrant};
use crate::config::FeedbackLabels;
use crate::domain::{Activity, Challenge, Direction, Verdict};
use crate::session::{Phase, Session};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectQuadrant { quadrant: Quadrant },
    StartActivity { activity: Activity },
    Input { direction: Direction },
    /// Raw key name as reported by the browser, e.g. "ArrowLeft".
    KeyDown { key: String },
    Board,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Hello {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    State { session: SessionOut },
    Board { board: BoardOut },
    Error { message: String },
}

/// Everything the presentation layer needs to render one session.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub phase: Phase,
    pub quadrant: Option<Quadrant>,
    pub activity: Option<Activity>,
    pub challenge: Option<Challenge>,
    pub score: u32,
    pub feedback: Option<Verdict>,
    pub feedback_text: String,
    pub awaiting_next: bool,
    /// Present once a quadrant is selected.
    pub board: Option<Vec<Vec<CellOut>>>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellOut {
    pub coordinate: Coordinate,
    pub in_quadrant: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BoardOut {
    pub quadrant: Quadrant,
    pub rows: Vec<Vec<CellOut>>,
    pub coordinates: Vec<Coordinate>,
}

/// 8x8 grid (rank 8 first) with each cell flagged against `quadrant`.
pub fn masked_grid(quadrant: Quadrant) -> Vec<Vec<CellOut>> {
    grid_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|coordinate| CellOut { coordinate, in_quadrant: is_in_quadrant(coordinate, quadrant) })
                .collect()
        })
        .collect()
}

pub fn board_out(quadrant: Quadrant) -> BoardOut {
    BoardOut { quadrant, rows: masked_grid(quadrant), coordinates: coordinates_for(quadrant) }
}

/// Convert the internal `Session` to the public DTO.
pub fn to_out(s: &Session, labels: &FeedbackLabels) -> SessionOut {
    let feedback_text = match s.feedback() {
        Some(Verdict::Correct) => labels.correct_text.clone(),
        Some(Verdict::Wrong) => labels.wrong_text.clone(),
        None => String::new(),
    };
    SessionOut {
        phase: s.phase(),
        quadrant: s.quadrant(),
        activity: s.activity(),
        challenge: s.challenge(),
        score: s.score(),
        feedback: s.feedback(),
        feedback_text,
        awaiting_next: s.awaiting_next(),
        board: s.quadrant().map(masked_grid),
    }
}

//
// HTTP request/response DTOs
//

/// `?quadrant=TL`; absent means the whole board.
#[derive(Debug, Deserialize)]
pub struct QuadrantQuery {
    pub quadrant: Option<Quadrant>,
}

impl QuadrantQuery {
    pub fn quadrant(&self) -> Quadrant {
        self.quadrant.unwrap_or(Quadrant::All)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareOut {
    pub coordinate: Coordinate,
    pub dark: bool,
    /// Corner quadrant that contains the square.
    pub quadrant: Quadrant,
    pub in_quadrant: bool,
}

impl SquareOut {
    pub fn new(coordinate: Coordinate, selected: Quadrant) -> Self {
        Self {
            coordinate,
            dark: is_dark(coordinate),
            quadrant: quadrant_of(coordinate),
            in_quadrant: is_in_quadrant(coordinate, selected),
        }
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
