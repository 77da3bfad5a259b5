pub mod answer;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod demo;
pub mod domain;
pub mod error;
pub mod telemetry;
