//! Askama templates for the web frontend.

use askama::Template;

use crate::schedule::DirectionBoard;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the region picker.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub regions: Vec<String>,
}

/// Stops of one region.
#[derive(Template)]
#[template(path = "stops.html")]
pub struct StopsTemplate {
    pub region: String,
    pub stops: Vec<String>,
}

/// Buses serving one stop, in natural label order.
#[derive(Template)]
#[template(path = "buses.html")]
pub struct BusesTemplate {
    pub stop: String,
    pub region: String,
    pub buses: Vec<String>,
}

/// Upcoming arrivals of one bus, grouped by direction.
#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    pub bus: String,
    pub stop: String,
    pub region: Option<String>,
    pub boards: Vec<DirectionBoard>,
}

/// The stop closest to the user.
#[derive(Template)]
#[template(path = "nearest.html")]
pub struct NearestTemplate {
    pub stop: String,
    pub region: String,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArrivalTime;
    use crate::schedule::BoardTime;

    #[test]
    fn board_marks_next_day_times() {
        let template = BoardTemplate {
            bus: "2".into(),
            stop: "Balti jaam".into(),
            region: Some("Tallinn".into()),
            boards: vec![DirectionBoard {
                direction: "Reisisadam".into(),
                next_stop: "Vabaduse väljak".into(),
                times: vec![
                    BoardTime {
                        time: ArrivalTime::from_hm(23, 55).unwrap(),
                        next_day: false,
                    },
                    BoardTime {
                        time: ArrivalTime::from_hm(6, 5).unwrap(),
                        next_day: true,
                    },
                ],
            }],
        };

        let html = template.render().unwrap();
        assert!(html.contains("Reisisadam"));
        assert!(html.contains("Vabaduse väljak"));
        assert!(html.contains("23:55"));
        assert!(html.contains(r#"<li class="next-day">06:05"#));
    }

    #[test]
    fn stop_names_are_escaped() {
        let template = StopsTemplate {
            region: "Tallinn".into(),
            stops: vec!["<Kaubamaja>".into()],
        };
        let html = template.render().unwrap();
        assert!(html.contains("&lt;Kaubamaja&gt;"));
        assert!(!html.contains("<Kaubamaja>"));
    }

    #[test]
    fn error_page_shows_message() {
        let template = ErrorTemplate {
            title: "Not found".into(),
            message: "no data for the selected bus".into(),
        };
        let html = template.render().unwrap();
        assert!(html.contains("no data for the selected bus"));
    }
}
