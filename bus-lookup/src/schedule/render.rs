//! Plain-text rendering of an arrival board.

use std::fmt::Write;

use super::board::DirectionBoard;

/// Render boards for a terminal, one block per direction.
///
/// ```text
/// Reisisadam
///   Next stop: Vabaduse väljak
///   21:00
///   06:00 (tomorrow)
/// ```
pub fn render_text(boards: &[DirectionBoard]) -> String {
    let mut out = String::new();

    for (i, board) in boards.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", board.direction);
        let _ = writeln!(out, "  Next stop: {}", board.next_stop);
        for t in &board.times {
            if t.next_day {
                let _ = writeln!(out, "  {} (tomorrow)", t.time);
            } else {
                let _ = writeln!(out, "  {}", t.time);
            }
        }
    }

    out
}
