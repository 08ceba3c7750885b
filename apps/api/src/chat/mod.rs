// Career conversation: the tool-augmented turn engine and its HTTP surface.

pub mod engine;
pub mod handlers;
pub mod prompts;
