//! E-paper journey panel.
//!
//! Drives a 7.5" black-and-white e-paper display through the day: upcoming
//! train departures in the morning, artwork during the day, and a blank
//! sleeping panel at night.

pub mod art;
pub mod config;
pub mod controller;
pub mod device;
pub mod domain;
pub mod logging;
pub mod refresh;
pub mod render;
pub mod skanetrafiken;
