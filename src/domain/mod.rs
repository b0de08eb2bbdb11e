pub mod audio;
pub mod conversion;
pub mod document;
pub mod job;
