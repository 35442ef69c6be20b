pub mod booking;
pub mod config;
pub mod locator;
pub mod race;
pub mod schedule;
pub mod testing;
pub mod upstream;

pub use booking::{BookingOutcome, FailureKind, TicketBooker};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    SanitizedConfig,
};
pub use locator::{select_departure, DepartureLocator, Direction, Selection, SelectionPolicy};
pub use race::{
    RaceConfig, RaceError, RaceOrchestrator, RaceReport, RaceState, TransitionObserver,
    DEFAULT_ROUTE,
};
pub use schedule::{
    parse_time_of_day, resolve_target, Clock, PrecisionWaiter, SleepPolicy, SystemClock,
    TargetError,
};
pub use upstream::{
    BookingRequest, BookingResponse, BusApi, Departure, HttpBusApi, Route, UpstreamError,
};
