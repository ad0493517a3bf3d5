// Assessment recommendation engine.
// Catalog load → embedding index → per query: requirement extraction and
// similarity ranking, combined by the balancer.

pub mod balancer;
pub mod catalog;
pub mod encoder;
pub mod engine;
pub mod enrichment;
pub mod evaluation;
pub mod handlers;
pub mod index;
pub mod prompts;
pub mod ranking;
pub mod requirements;
