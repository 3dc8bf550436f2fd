pub mod artifact;
pub mod clock;
pub mod errors;
pub mod extract;
pub mod key_manager;
pub mod models;
pub mod narrative;
pub mod pipeline;
pub mod poller;
pub mod prompt_template;
pub mod providers;
