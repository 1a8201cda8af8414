pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    BuilderConfig, Config, DispatcherConfig, GithubConfig, ServerConfig, WebhookConfig,
};
