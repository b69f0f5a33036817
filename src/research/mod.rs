// Research Stages
// Query planning, search fan-out, relevance filtering and context aggregation

pub mod aggregate;
pub mod fanout;
pub mod planner;
pub mod relevance;

pub use aggregate::{aggregate, SourceText};
pub use fanout::{FanoutResult, SearchFanout};
pub use planner::{QueryPlan, QueryPlanner};
pub use relevance::RelevanceClassifier;
