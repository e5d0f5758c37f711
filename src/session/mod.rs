pub mod commands;
pub mod controller;
pub mod state;

pub use controller::SessionController;
pub use state::{AppView, Session, SessionSnapshot};
