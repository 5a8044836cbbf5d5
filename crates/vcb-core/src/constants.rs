//! Package-level constants.

/// Current version of the board server (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default layout for a page when the configuration omits it.
pub const DEFAULT_LAYOUT: &str = "grid";

/// Default number of grid columns for a page.
pub const DEFAULT_GRID_COLUMNS: u32 = 3;
