//! Capture session management
//!
//! This module contains:
//! - Action and startup message types shared by windows and orchestrator
//! - Keyboard and mouse shortcuts
//! - The per-display capture view
//! - The multi-display orchestrator

pub mod messages;
pub mod orchestrator;
pub mod shortcuts;
pub mod view;
