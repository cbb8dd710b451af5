//! Terminal user interface (TUI) for lanes.
//!
//! ## Entry points
//!
//! - [`board::run_board_tui`]: full-screen board with mouse drag between cells.

pub mod board;
