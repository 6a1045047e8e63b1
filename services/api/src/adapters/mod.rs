pub mod db;
pub mod gemini;

pub use db::PgStore;
pub use gemini::GeminiGateway;
