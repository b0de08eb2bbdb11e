pub mod conversion;
pub mod health;
pub mod jobs;
