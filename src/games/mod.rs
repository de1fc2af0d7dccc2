//! Pure game logic, free of persistence and transport.

pub mod hangman;
