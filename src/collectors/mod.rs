pub mod checks;
pub mod dataset;
