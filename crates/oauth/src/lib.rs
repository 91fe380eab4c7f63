pub mod callback_server;
pub mod defaults;
pub mod flow;
pub mod types;

pub use callback_server::CallbackServer;
pub use flow::OAuthFlow;
pub use types::{AuthRequest, OAuthConfig, OAuthTokens};
