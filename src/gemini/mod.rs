pub mod client;
mod response;
pub mod types;

pub use client::GeminiClient;
