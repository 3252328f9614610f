//! Arrival schedule presentation.
//!
//! Turns the raw arrival rows for one (route, stop) pair into a short board
//! per direction of travel: duplicates removed, rows grouped by direction,
//! and times that already passed today shown as tomorrow's first departures.

mod board;
mod render;

pub use board::{
    BoardTime, DirectionBoard, TIMES_PER_DIRECTION, build_board, dedup_arrivals, direction_key,
};
pub use render::render_text;
