pub mod fetch_orchestrator;
pub mod search_controller;

pub use fetch_orchestrator::FetchOrchestrator;
pub use search_controller::{SearchController, SearchPhase, SearchState};
