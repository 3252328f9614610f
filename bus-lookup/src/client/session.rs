//! Front-end session state.
//!
//! A [`Session`] holds everything the user has selected so far (region, stop,
//! bus) and what is on screen. All changes go through [`Session::update`],
//! which takes one [`Event`] and returns the fetches to start as
//! [`Effect`]s. The caller performs the fetches and feeds the results back as
//! events carrying the same [`RequestTag`].
//!
//! Each kind of fetch has one pending tag. Starting a new fetch or changing
//! an upstream selection replaces it, so a slow response for an old
//! selection is discarded instead of overwriting the current one.

use tracing::debug;

use crate::domain::{ArrivalTime, Coordinates, sort_labels};
use crate::locator::NearestStop;
use crate::schedule::{DirectionBoard, build_board};
use crate::store::ArrivalRow;
use crate::suggest::SuggestionBox;

use super::error::ApiError;

/// Message shown when a fetch fails.
pub const LOAD_ERROR_MESSAGE: &str = "An error occurred while loading data.";

/// Message shown when the nearest-stop lookup fails.
pub const LOCATE_ERROR_MESSAGE: &str = "Could not determine the nearest stop.";

/// Identifies one fetch so its response can be matched to the selection
/// that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag(u64);

/// A fetch the session wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchRegions {
        tag: RequestTag,
    },
    FetchStops {
        tag: RequestTag,
        region: String,
    },
    FetchBuses {
        tag: RequestTag,
        stop: String,
        region: String,
    },
    FetchDetails {
        tag: RequestTag,
        bus: String,
        stop: String,
        region: String,
    },
    FetchNearest {
        tag: RequestTag,
        position: Coordinates,
    },
}

/// Something that happened: user input or a fetch completing.
#[derive(Debug)]
pub enum Event {
    /// The front-end opened.
    Started,
    RegionsLoaded {
        tag: RequestTag,
        result: Result<Vec<String>, ApiError>,
    },
    /// The user typed into the region input.
    RegionTyped(String),
    /// The user picked a region suggestion.
    RegionChosen(String),
    StopsLoaded {
        tag: RequestTag,
        result: Result<Vec<String>, ApiError>,
    },
    /// The user typed into the stop input.
    StopTyped(String),
    /// The user picked a stop suggestion.
    StopChosen(String),
    BusesLoaded {
        tag: RequestTag,
        result: Result<Vec<String>, ApiError>,
    },
    /// The user picked a bus.
    BusChosen(String),
    DetailsLoaded {
        tag: RequestTag,
        result: Result<Vec<ArrivalRow>, ApiError>,
        /// Local time of day when the response is rendered
        now: ArrivalTime,
    },
    /// A position fix is available.
    LocateRequested(Coordinates),
    /// The user refused location access.
    LocationDenied,
    NearestLoaded {
        tag: RequestTag,
        result: Result<NearestStop, ApiError>,
    },
    /// The user cleared the form.
    Cleared,
}

/// Contents of the arrivals panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Empty,
    Loading,
    Locating,
    Board(Vec<DirectionBoard>),
    NoData,
    LocationDenied,
    Error(String),
}

#[derive(Debug, Default)]
struct Pending {
    regions: Option<RequestTag>,
    stops: Option<RequestTag>,
    buses: Option<RequestTag>,
    details: Option<RequestTag>,
    nearest: Option<RequestTag>,
}

/// Take the pending tag if `tag` matches it.
fn accept(slot: &mut Option<RequestTag>, tag: RequestTag, what: &str) -> bool {
    if *slot == Some(tag) {
        *slot = None;
        true
    } else {
        debug!(?tag, what, "discarding stale response");
        false
    }
}

/// Selection and display state of one front-end.
#[derive(Debug)]
pub struct Session {
    regions: Vec<String>,
    stops: Vec<String>,
    region_input: SuggestionBox,
    stop_input: SuggestionBox,
    stop_enabled: bool,
    buses: Option<Vec<String>>,
    buses_loading: bool,
    active_bus: Option<String>,
    panel: Panel,
    pending: Pending,
    next_tag: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            stops: Vec::new(),
            region_input: SuggestionBox::default(),
            stop_input: SuggestionBox::default(),
            stop_enabled: false,
            buses: None,
            buses_loading: false,
            active_bus: None,
            panel: Panel::Empty,
            pending: Pending::default(),
            next_tag: 0,
        }
    }

    /// Apply one event and return the fetches to start.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Started => {
                let tag = self.issue();
                self.pending.regions = Some(tag);
                vec![Effect::FetchRegions { tag }]
            }
            Event::RegionsLoaded { tag, result } => {
                if accept(&mut self.pending.regions, tag, "regions") {
                    match result {
                        Ok(regions) => self.regions = regions,
                        Err(e) => self.fail(&e, LOAD_ERROR_MESSAGE),
                    }
                }
                Vec::new()
            }
            Event::RegionTyped(text) => {
                // Editing a chosen region drops everything that depended on it.
                let committed = self.stop_enabled || self.pending.stops.is_some();
                if committed && text != self.region_input.value {
                    self.clear(true);
                }
                self.region_input.type_text(&text, &self.regions);
                Vec::new()
            }
            Event::RegionChosen(region) => {
                self.clear(true);
                self.region_input.choose(&region);
                vec![self.fetch_stops(region)]
            }
            Event::StopsLoaded { tag, result } => {
                if accept(&mut self.pending.stops, tag, "stops") {
                    match result {
                        Ok(stops) => {
                            self.stops = stops;
                            self.stop_enabled = true;
                        }
                        Err(e) => self.fail(&e, LOAD_ERROR_MESSAGE),
                    }
                }
                Vec::new()
            }
            Event::StopTyped(text) => {
                if !self.stop_enabled {
                    self.stop_input.hide();
                } else {
                    self.stop_input.type_text(&text, &self.stops);
                }
                Vec::new()
            }
            Event::StopChosen(stop) => {
                if !self.stop_enabled {
                    self.stop_input.hide();
                    return Vec::new();
                }
                self.stop_input.choose(&stop);
                vec![self.fetch_buses()]
            }
            Event::BusesLoaded { tag, result } => {
                if accept(&mut self.pending.buses, tag, "buses") {
                    self.buses_loading = false;
                    match result {
                        Ok(mut buses) => {
                            sort_labels(&mut buses);
                            self.buses = Some(buses);
                        }
                        Err(e) => self.fail(&e, LOAD_ERROR_MESSAGE),
                    }
                }
                Vec::new()
            }
            Event::BusChosen(bus) => {
                if self.active_bus.as_deref() == Some(bus.as_str()) {
                    return Vec::new();
                }
                let (stop, region) = (&self.stop_input.value, &self.region_input.value);
                if stop.is_empty() || region.is_empty() {
                    return Vec::new();
                }
                let (stop, region) = (stop.clone(), region.clone());

                self.active_bus = Some(bus.clone());
                self.panel = Panel::Loading;
                let tag = self.issue();
                self.pending.details = Some(tag);
                vec![Effect::FetchDetails {
                    tag,
                    bus,
                    stop,
                    region,
                }]
            }
            Event::DetailsLoaded { tag, result, now } => {
                if accept(&mut self.pending.details, tag, "details") {
                    self.panel = match result {
                        Ok(rows) if rows.is_empty() => Panel::NoData,
                        Ok(rows) => Panel::Board(build_board(&rows, now)),
                        Err(ApiError::NotFound(_)) => Panel::NoData,
                        Err(e) => {
                            debug!(error = %e, "arrival fetch failed");
                            // Allow choosing the same bus again to retry.
                            self.active_bus = None;
                            Panel::Error(LOAD_ERROR_MESSAGE.to_string())
                        }
                    };
                }
                Vec::new()
            }
            Event::LocateRequested(position) => {
                self.pending.stops = None;
                self.pending.buses = None;
                self.pending.details = None;
                self.panel = Panel::Locating;
                let tag = self.issue();
                self.pending.nearest = Some(tag);
                vec![Effect::FetchNearest { tag, position }]
            }
            Event::LocationDenied => {
                self.pending.nearest = None;
                self.panel = Panel::LocationDenied;
                Vec::new()
            }
            Event::NearestLoaded { tag, result } => {
                if !accept(&mut self.pending.nearest, tag, "nearest") {
                    return Vec::new();
                }
                match result {
                    Ok(found) => {
                        self.clear(false);
                        self.region_input.choose(&found.region);
                        self.stop_input.choose(&found.stop);
                        let stops = self.fetch_stops(found.region);
                        // The stop is already chosen, so it stays editable.
                        self.stop_enabled = true;
                        vec![stops, self.fetch_buses()]
                    }
                    Err(e) => {
                        self.fail(&e, LOCATE_ERROR_MESSAGE);
                        Vec::new()
                    }
                }
            }
            Event::Cleared => {
                self.clear(false);
                Vec::new()
            }
        }
    }

    /// Known regions.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Stops of the chosen region.
    pub fn stops(&self) -> &[String] {
        &self.stops
    }

    /// The region input.
    pub fn region_input(&self) -> &SuggestionBox {
        &self.region_input
    }

    /// The stop input.
    pub fn stop_input(&self) -> &SuggestionBox {
        &self.stop_input
    }

    /// Whether a stop can be entered yet.
    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    /// Buses at the chosen stop in natural order, once loaded.
    pub fn buses(&self) -> Option<&[String]> {
        self.buses.as_deref()
    }

    /// Whether the bus list is being fetched.
    pub fn buses_loading(&self) -> bool {
        self.buses_loading
    }

    /// The bus whose arrivals are shown or loading.
    pub fn active_bus(&self) -> Option<&str> {
        self.active_bus.as_deref()
    }

    /// The arrivals panel.
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    fn issue(&mut self) -> RequestTag {
        self.next_tag += 1;
        RequestTag(self.next_tag)
    }

    fn fetch_stops(&mut self, region: String) -> Effect {
        self.stops.clear();
        self.stop_enabled = false;
        let tag = self.issue();
        self.pending.stops = Some(tag);
        Effect::FetchStops { tag, region }
    }

    /// Start loading buses for the chosen (stop, region).
    fn fetch_buses(&mut self) -> Effect {
        self.buses = None;
        self.buses_loading = true;
        self.active_bus = None;
        self.panel = Panel::Empty;
        self.pending.details = None;

        let tag = self.issue();
        self.pending.buses = Some(tag);
        Effect::FetchBuses {
            tag,
            stop: self.stop_input.value.clone(),
            region: self.region_input.value.clone(),
        }
    }

    fn fail(&mut self, error: &ApiError, message: &str) {
        debug!(error = %error, "fetch failed");
        self.buses_loading = false;
        self.panel = Panel::Error(message.to_string());
    }

    /// Reset every selection below the region, and the region itself unless
    /// `keep_region` is set. Pending fetches for cleared fields are dropped.
    fn clear(&mut self, keep_region: bool) {
        if !keep_region {
            self.region_input.clear();
        }
        self.stop_input.clear();
        self.stops.clear();
        self.stop_enabled = false;
        self.buses = None;
        self.buses_loading = false;
        self.active_bus = None;
        self.panel = Panel::Empty;
        self.pending.stops = None;
        self.pending.buses = None;
        self.pending.details = None;
        self.pending.nearest = None;
    }
}
