pub mod actor;
pub mod grid;
pub mod input;
pub mod movement;
pub mod rules;
