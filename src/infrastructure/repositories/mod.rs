pub mod espeak_synthesizer;
pub mod job_repository;
pub mod openai_synthesizer;
pub mod polly_synthesizer;
pub mod synthesizer;

pub use espeak_synthesizer::EspeakSynthesizer;
pub use job_repository::JobRepository;
pub use openai_synthesizer::OpenAiSynthesizer;
pub use polly_synthesizer::PollySynthesizer;
pub use synthesizer::Synthesizer;
