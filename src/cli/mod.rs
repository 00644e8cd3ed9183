pub mod credentials;
pub mod error;
pub mod kantik_client;
pub mod progress;
