pub mod llm_service;
pub mod rasterizer;
pub mod vision_service;

pub use llm_service::{ChatModel, LlmService};
pub use rasterizer::Rasterizer;
pub use vision_service::{TextRecognizer, VisionService};
