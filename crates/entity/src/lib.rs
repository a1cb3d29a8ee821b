pub mod client;
pub mod opportunity;
pub mod opportunity_stage_history;
pub mod strategy;
