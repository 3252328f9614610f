//! Building the per-direction arrival board.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;

use crate::domain::ArrivalTime;
use crate::store::ArrivalRow;

/// Maximum times listed for one direction.
pub const TIMES_PER_DIRECTION: usize = 5;

/// One displayed arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardTime {
    pub time: ArrivalTime,

    /// The time already passed today and is shown as tomorrow's.
    pub next_day: bool,
}

/// Upcoming arrivals in one direction of travel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionBoard {
    /// Direction label (trip long name, headsign or route name)
    pub direction: String,

    /// Stop after this one, from the first row of the direction
    pub next_stop: String,

    /// At most [`TIMES_PER_DIRECTION`] times, today's first
    pub times: Vec<BoardTime>,
}

type DedupKey<'a> = (&'a str, Option<&'a str>, Option<&'a str>, &'a str);

/// Remove rows that would display identically.
///
/// Rows are identical when arrival time, headsign, route name and next stop
/// all match. A duplicate keeps the position of its first occurrence but
/// takes the contents of the last one.
pub fn dedup_arrivals(rows: &[ArrivalRow]) -> Vec<&ArrivalRow> {
    let mut seen: HashMap<DedupKey<'_>, usize> = HashMap::new();
    let mut unique: Vec<&ArrivalRow> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = (
            row.arrival_time.as_str(),
            row.trip_headsign.as_deref(),
            row.route_long_name.as_deref(),
            row.next_stop.as_str(),
        );
        match seen.entry(key) {
            Entry::Occupied(slot) => unique[*slot.get()] = row,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(row);
            }
        }
    }

    unique
}

/// The direction a row belongs to.
///
/// First non-empty of trip long name, trip headsign and route long name.
pub fn direction_key(row: &ArrivalRow) -> &str {
    [
        row.trip_long_name.as_deref(),
        row.trip_headsign.as_deref(),
        row.route_long_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .unwrap_or("")
}

/// Group rows by direction, in order of first appearance.
fn group_by_direction<'a>(rows: Vec<&'a ArrivalRow>) -> Vec<(&'a str, Vec<&'a ArrivalRow>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&ArrivalRow>)> = Vec::new();

    for row in rows {
        let key = direction_key(row);
        match index.entry(key) {
            Entry::Occupied(slot) => groups[*slot.get()].1.push(row),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    groups
}

/// Pick the displayed times for one direction.
///
/// Times are ordered by value, not by their text, so `"8:05"` precedes
/// `"10:00"`. Times at or after `now` come first. If fewer than
/// [`TIMES_PER_DIRECTION`] remain today, the earliest of the times that
/// already passed fill the list, tagged as next-day.
fn select_times(rows: &[&ArrivalRow], now: ArrivalTime) -> Vec<BoardTime> {
    let parsed = rows.iter().filter_map(|row| match ArrivalTime::parse(&row.arrival_time) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!(arrival_time = %row.arrival_time, error = %e, "dropping arrival with bad time");
            None
        }
    });

    let mut parsed: Vec<ArrivalTime> = parsed.collect();
    parsed.sort();

    let (today, earlier): (Vec<ArrivalTime>, Vec<ArrivalTime>) =
        parsed.into_iter().partition(|time| *time >= now);

    let mut times: Vec<BoardTime> = today
        .into_iter()
        .map(|time| BoardTime {
            time,
            next_day: false,
        })
        .collect();

    let room = TIMES_PER_DIRECTION.saturating_sub(times.len());
    times.extend(earlier.into_iter().take(room).map(|time| BoardTime {
        time,
        next_day: true,
    }));
    times.truncate(TIMES_PER_DIRECTION);

    times
}

/// Build the arrival board for one (route, stop) pair.
///
/// Directions appear in the order of their first row. `now` is the local
/// time of day at render time.
pub fn build_board(rows: &[ArrivalRow], now: ArrivalTime) -> Vec<DirectionBoard> {
    group_by_direction(dedup_arrivals(rows))
        .into_iter()
        .map(|(direction, rows)| DirectionBoard {
            direction: direction.to_string(),
            next_stop: rows[0].next_stop.clone(),
            times: select_times(&rows, now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: &str, headsign: &str, next_stop: &str) -> ArrivalRow {
        ArrivalRow {
            arrival_time: time.into(),
            trip_headsign: Some(headsign.into()),
            trip_long_name: None,
            route_long_name: Some("Mõigu - Reisisadam".into()),
            next_stop: next_stop.into(),
        }
    }

    fn at(s: &str) -> ArrivalTime {
        ArrivalTime::parse(s).unwrap()
    }

    fn shown(board: &DirectionBoard) -> Vec<(String, bool)> {
        board
            .times
            .iter()
            .map(|t| (t.time.to_string(), t.next_day))
            .collect()
    }

    #[test]
    fn identical_rows_collapse() {
        let rows = vec![
            row("09:00:00", "Reisisadam", "Vabaduse väljak"),
            row("09:00:00", "Reisisadam", "Vabaduse väljak"),
            row("09:10:00", "Reisisadam", "Vabaduse väljak"),
        ];
        assert_eq!(dedup_arrivals(&rows).len(), 2);

        let board = build_board(&rows, at("08:00"));
        assert_eq!(board.len(), 1);
        assert_eq!(
            shown(&board[0]),
            [("09:00".to_string(), false), ("09:10".to_string(), false)]
        );
    }

    #[test]
    fn dedup_ignores_trip_long_name_and_keeps_last_contents() {
        let mut first = row("09:00:00", "Reisisadam", "Vabaduse väljak");
        first.trip_long_name = Some("Express".into());
        let second = row("09:00:00", "Reisisadam", "Vabaduse väljak");
        let later = row("09:30:00", "Reisisadam", "Vabaduse väljak");

        let rows = vec![first, later, second];
        let unique = dedup_arrivals(&rows);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].arrival_time, "09:00:00");
        assert_eq!(unique[0].trip_long_name, None);
        assert_eq!(unique[1].arrival_time, "09:30:00");
    }

    #[test]
    fn direction_key_priority() {
        let mut r = row("09:00", "Reisisadam", "X");
        assert_eq!(direction_key(&r), "Reisisadam");

        r.trip_long_name = Some("Väike-Õismäe".into());
        assert_eq!(direction_key(&r), "Väike-Õismäe");

        r.trip_long_name = Some(String::new());
        r.trip_headsign = None;
        assert_eq!(direction_key(&r), "Mõigu - Reisisadam");

        r.route_long_name = None;
        assert_eq!(direction_key(&r), "");
    }

    #[test]
    fn groups_in_order_of_first_appearance() {
        let rows = vec![
            row("08:00", "Mõigu", "Kaubamaja"),
            row("08:05", "Reisisadam", "Balti jaam"),
            row("08:10", "Mõigu", "Kaubamaja"),
        ];
        let board = build_board(&rows, at("07:00"));
        let directions: Vec<&str> = board.iter().map(|d| d.direction.as_str()).collect();
        assert_eq!(directions, ["Mõigu", "Reisisadam"]);
        assert_eq!(board[0].times.len(), 2);
        assert_eq!(board[1].next_stop, "Balti jaam");
    }

    #[test]
    fn next_stop_from_first_row() {
        let rows = vec![
            row("08:00", "Reisisadam", "Vabaduse väljak"),
            row("08:30", "Reisisadam", "Kaubamaja"),
        ];
        let board = build_board(&rows, at("08:15"));
        assert_eq!(board[0].next_stop, "Vabaduse väljak");
    }

    #[test]
    fn rollover_when_nothing_left_today() {
        let rows: Vec<ArrivalRow> = ["23:40", "00:10", "00:20", "00:30", "00:40", "00:50"]
            .into_iter()
            .map(|t| row(t, "Reisisadam", "Vabaduse väljak"))
            .collect();

        let board = build_board(&rows, at("23:50"));
        assert_eq!(
            shown(&board[0]),
            [
                ("23:40".to_string(), true),
                ("00:10".to_string(), true),
                ("00:20".to_string(), true),
                ("00:30".to_string(), true),
                ("00:40".to_string(), true),
            ]
        );
    }

    #[test]
    fn fills_with_next_day_after_today() {
        let rows: Vec<ArrivalRow> = ["06:00", "07:00", "08:00", "21:00", "22:00"]
            .into_iter()
            .map(|t| row(t, "Reisisadam", "Vabaduse väljak"))
            .collect();

        let board = build_board(&rows, at("20:30"));
        assert_eq!(
            shown(&board[0]),
            [
                ("21:00".to_string(), false),
                ("22:00".to_string(), false),
                ("06:00".to_string(), true),
                ("07:00".to_string(), true),
                ("08:00".to_string(), true),
            ]
        );
    }

    #[test]
    fn at_most_five_today() {
        let rows: Vec<ArrivalRow> = (10..18)
            .map(|h| row(&format!("{h}:00"), "Reisisadam", "Vabaduse väljak"))
            .collect();

        let board = build_board(&rows, at("09:00"));
        let times: Vec<String> = board[0].times.iter().map(|t| t.time.to_string()).collect();
        assert_eq!(times, ["10:00", "11:00", "12:00", "13:00", "14:00"]);
        assert!(board[0].times.iter().all(|t| !t.next_day));
    }

    #[test]
    fn arrival_equal_to_now_is_today() {
        let rows = vec![row("12:00:00", "Reisisadam", "Vabaduse väljak")];
        let board = build_board(&rows, at("12:00"));
        assert!(!board[0].times[0].next_day);
    }

    #[test]
    fn numeric_comparison_for_unpadded_times() {
        // Lexically "9:30" > "10:00"; numerically it has passed.
        let rows = vec![row("9:30", "Reisisadam", "Vabaduse väljak")];
        let board = build_board(&rows, at("10:00"));
        assert!(board[0].times[0].next_day);
    }

    #[test]
    fn unpadded_times_shown_in_time_order() {
        // Textual order, as a store sorting the raw strings returns them.
        let rows: Vec<ArrivalRow> = ["10:00", "11:00", "7:30", "8:05", "9:00"]
            .into_iter()
            .map(|t| row(t, "Reisisadam", "Vabaduse väljak"))
            .collect();

        let board = build_board(&rows, at("08:00"));
        assert_eq!(
            shown(&board[0]),
            [
                ("08:05".to_string(), false),
                ("09:00".to_string(), false),
                ("10:00".to_string(), false),
                ("11:00".to_string(), false),
                ("07:30".to_string(), true),
            ]
        );
    }

    #[test]
    fn next_day_fill_takes_earliest_times() {
        let rows: Vec<ArrivalRow> = ["23:00", "6:45", "10:15", "5:50", "9:05", "7:20"]
            .into_iter()
            .map(|t| row(t, "Reisisadam", "Vabaduse väljak"))
            .collect();

        let board = build_board(&rows, at("22:00"));
        let times: Vec<String> = board[0].times.iter().map(|t| t.time.to_string()).collect();
        assert_eq!(times, ["23:00", "05:50", "06:45", "07:20", "09:05"]);
    }

    #[test]
    fn bad_times_are_dropped() {
        let rows = vec![
            row("soon", "Reisisadam", "Vabaduse väljak"),
            row("09:00", "Reisisadam", "Vabaduse väljak"),
        ];
        let board = build_board(&rows, at("08:00"));
        assert_eq!(board[0].times.len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_board() {
        assert!(build_board(&[], at("08:00")).is_empty());
    }
}
