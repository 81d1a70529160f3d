// Title generation engine.
// Implements: prompt building, cost estimation, row normalization, single and batch generation.
// All completion calls go through llm_client — no direct HTTP calls here.

pub mod batch;
pub mod cost;
pub mod generator;
pub mod handlers;
pub mod normalizer;
pub mod prompts;

#[cfg(test)]
pub mod testing;
