pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod model;
pub mod proxy;

pub use config::{ResasConfig, ServerConfig};
pub use dashboard::{fetch_all, CycleOutcome, Dashboard, DashboardView, Selection};
pub use error::PrefPopError;
pub use io::{PopulationSource, ResasClient};
pub use model::{aggregate, build_chart, normalize, AggregatedRow, Category, CompositionRecord, PrefCode, Prefecture};
