pub mod aggregate;
pub mod query_engine;
pub mod results;
pub mod window;

pub use aggregate::{frequency_counts, MeanAccumulator, MissingValuePolicy};
pub use query_engine::{QueryEngine, QueryOptions, QueryRequest};
pub use results::{
    CategoryCount, DailyMean, DailyResult, NumericSlice, QueryResult, RangedResult, RankingEntry,
    StationComparison, TimePoint,
};
pub use window::{RangePolicy, TimeWindow};
