pub mod event;
pub mod history;
pub mod level;
pub mod session;
pub mod step;
pub mod world;
