pub mod client;
pub mod request;
pub mod types;

pub use client::OpenAiHttpClient;
pub use request::build_chat_request;
