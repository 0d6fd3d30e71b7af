pub mod envelope;
pub mod fixture;
pub mod resas;
pub mod table_export;

pub use resas::{PopulationSource, ResasClient};
