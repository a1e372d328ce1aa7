//! # UI Module
//!
//! Layout and canvas widgets for the spectrum analyzer window.

pub mod bar_display;
pub mod main_display;
