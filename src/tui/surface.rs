//! Terminal display surface — alerts, notices and prompts for the viewer.
//!
//! Alerts and prompts queue up as modals and block input until answered.
//! Notices go to the status bar.

use std::collections::VecDeque;

use crate::controller::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Acknowledge with any key.
    Alert,
    /// Yes/no.
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub kind: ModalKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct TuiSurface {
    modals: VecDeque<Modal>,
    notice: Option<String>,
}

impl TuiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The modal currently on screen.
    pub fn current_modal(&self) -> Option<&Modal> {
        self.modals.front()
    }

    /// Remove the modal on screen.
    pub fn dismiss(&mut self) -> Option<Modal> {
        self.modals.pop_front()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

impl Surface for TuiSurface {
    fn alert(&mut self, message: &str) {
        self.modals.push_back(Modal {
            kind: ModalKind::Alert,
            message: message.to_string(),
        });
    }

    fn notify(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    fn prompt(&mut self, message: &str) {
        self.modals.push_back(Modal {
            kind: ModalKind::Confirm,
            message: message.to_string(),
        });
    }
}
