//! bankview — lazy-loading viewer for wwiser bank dumps.
//!
//! Talks to the viewer backend over HTTP, keeps one pane per tab, and
//! expands the bank tree node by node, fetching each node's detail the
//! first time it is opened.

pub mod config;
pub mod controller;
pub mod node;
pub mod service;
pub mod tui;
pub mod view;
