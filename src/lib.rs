pub mod config;
pub mod curriculum;
pub mod database;
pub mod erd;
pub mod executor;
pub mod optimizer;
pub mod parser;
pub mod planner;
pub mod samples;
pub mod storage;
pub mod types;
pub mod validate;
