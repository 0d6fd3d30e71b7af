pub mod aggregate;
pub mod chart;
pub mod composition;
pub mod normalize;

pub use aggregate::{aggregate, AggregatedRow};
pub use chart::{build_chart, ChartData, ChartSeries};
pub use composition::{
    Category, CompositionRecord, DataPoint, LabeledSeries, PrefCode, Prefecture, PrefectureRecords,
    RawLabeledSeries,
};
pub use normalize::normalize;
