pub mod analysis;
pub mod auth;
pub mod client;
pub mod token;
pub mod user;

pub use analysis::{AnalysisApi, HttpAnalysisApi};
pub use auth::{AuthClient, User};
pub use client::ApiClient;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use user::UserClient;
