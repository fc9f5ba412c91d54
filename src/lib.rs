//! Flappy Bird in the terminal.
//!
//! `game` holds the loop controller and is independent of the terminal;
//! `render` and `input` adapt it to crossterm.

pub mod config;
pub mod game;
pub mod input;
pub mod render;
pub mod schedule;
