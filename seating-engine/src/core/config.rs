use shared::models::{DEFAULT_AISLE_MIN, DEFAULT_VENUE_HEIGHT, DEFAULT_VENUE_WIDTH};

/// Engine configuration
///
/// # Environment variables
///
/// Every field can be overridden through an environment variable:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | SEATING_MAX_SEATS_PER_TABLE | 0 (unset) | global per-table seat maximum |
/// | SEATING_HISTORY_LIMIT | 100 | undo depth |
/// | SEATING_SNAP_TO_GRID | false | snap committed positions to the grid |
/// | SEATING_GRID_STEP_CM | 20 | grid step |
/// | SEATING_AISLE_MIN_CM | 80 | minimum aisle width |
/// | SEATING_VENUE_WIDTH_CM | 1800 | default venue width |
/// | SEATING_VENUE_HEIGHT_CM | 1200 | default venue height |
/// | SEATING_SOLVER_URL | http://localhost:3001 | remote solver base URL |
/// | SEATING_SOLVER_TIMEOUT_SECS | 30 | solver HTTP timeout |
/// | SEATING_LOG_LEVEL | info | log level |
/// | SEATING_LOG_JSON | false | JSON log output |
///
/// # Example
///
/// ```ignore
/// SEATING_MAX_SEATS_PER_TABLE=12 SEATING_SNAP_TO_GRID=true cargo run
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Global per-table seat maximum, `None` when unlimited
    pub max_seats_per_table: Option<u32>,
    /// Maximum number of undo steps kept
    pub history_limit: usize,
    /// Snap committed table positions to `grid_step`
    pub snap_to_grid: bool,
    /// Grid step (cm)
    pub grid_step: f64,
    /// Minimum aisle width for new areas (cm)
    pub aisle_min: f64,
    /// Default venue width for new areas (cm)
    pub venue_width: f64,
    /// Default venue height for new areas (cm)
    pub venue_height: f64,
    /// Remote assignment solver base URL
    pub solver_url: String,
    /// Remote assignment solver timeout (seconds)
    pub solver_timeout_secs: u64,
    /// Log level (trace | debug | info | warn | error)
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            max_seats_per_table: env_parse::<u32>("SEATING_MAX_SEATS_PER_TABLE")
                .filter(|&n| n > 0),
            history_limit: env_parse("SEATING_HISTORY_LIMIT").unwrap_or(100),
            snap_to_grid: env_parse("SEATING_SNAP_TO_GRID").unwrap_or(false),
            grid_step: env_parse::<f64>("SEATING_GRID_STEP_CM")
                .filter(|s| *s > 0.0)
                .unwrap_or(20.0),
            aisle_min: env_parse("SEATING_AISLE_MIN_CM").unwrap_or(DEFAULT_AISLE_MIN),
            venue_width: env_parse("SEATING_VENUE_WIDTH_CM").unwrap_or(DEFAULT_VENUE_WIDTH),
            venue_height: env_parse("SEATING_VENUE_HEIGHT_CM").unwrap_or(DEFAULT_VENUE_HEIGHT),
            solver_url: std::env::var("SEATING_SOLVER_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            solver_timeout_secs: env_parse("SEATING_SOLVER_TIMEOUT_SECS").unwrap_or(30),
            log_level: std::env::var("SEATING_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("SEATING_LOG_JSON").unwrap_or(false),
        }
    }

    /// Set the global per-table maximum
    ///
    /// Mostly used by tests.
    pub fn with_max_seats(mut self, max: u32) -> Self {
        self.max_seats_per_table = (max > 0).then_some(max);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_snap_to_grid(mut self, step: f64) -> Self {
        self.snap_to_grid = true;
        self.grid_step = step;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
