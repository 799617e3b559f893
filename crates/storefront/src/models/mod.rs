//! Types stored in the session.

mod session;

pub use session::keys as session_keys;
