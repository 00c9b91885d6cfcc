pub mod ai_agents;
pub mod seed;

pub use ai_agents::{generator_from_config, DemoGenerator, GenerationError, GenerationRequest, TextGenerator};
