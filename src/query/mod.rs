pub mod ast;
pub mod matcher;
pub mod pipeline;
pub mod planner;
pub mod types;
