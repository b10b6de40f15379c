//! Desktop-windowing task layout for the launcher's Recents/Overview grid.

pub mod common;
pub mod geometry;
pub mod layout_engine;
