pub mod advice;
pub mod carousel;
pub mod commands;

pub use advice::{AdviceService, EnergyTipsState};
pub use carousel::CarouselController;
