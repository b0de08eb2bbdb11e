// End-to-end tests for the DocVoice Backend API
//
// Each test gets its own server on an ephemeral port, backed by a fresh
// temporary storage directory and a local tone synthesizer, so tests run
// in parallel without sharing state.

mod helpers;
mod test_conversion;
mod test_health;
mod test_jobs;
