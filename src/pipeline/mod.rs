// Research Pipeline
// Orchestrates the research stages under partial-failure tolerance

mod debug;
mod orchestrator;
mod settle;
mod stage;


pub use debug::DebugTrail;
pub use orchestrator::{PipelineComponents, ResearchPipeline};
pub use settle::{settle_all, Settled};
pub use stage::{PipelineError, PipelineStage};
