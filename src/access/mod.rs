pub mod commands;
pub mod controller;
pub mod state;

pub use controller::AccessTokenController;
pub use state::AccessTokenState;
