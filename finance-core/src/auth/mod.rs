mod gate;
mod session;

pub use gate::{AUTH_POLL_INTERVAL, AuthGate};
pub use session::{REFRESH_TOKEN_KEY, TOKEN_KEY, TokenSession, USER_KEY};
