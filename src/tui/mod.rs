//! Terminal front end — ratatui presentation of the viewer.
//!
//! Renders the tab strip, the bank node tree and the text views. The
//! controller owns all state; this layer only projects it and turns keys
//! into viewer actions.
//!
//! ## Architecture (TEA)
//!
//! Model (`TuiApp`) + Update (message handler) + View (render).
//! Immediate mode: every frame is rebuilt from controller state.

pub mod app;
pub mod event;
pub mod input;
pub mod layout;
pub mod node_tree;
pub mod runner;
pub mod surface;
