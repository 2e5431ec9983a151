//! Session and authentication state for the portfolio client
//!
//! The session is an explicit context object: it owns the link between
//! the persisted token slot and the credential attached to the HTTP
//! client, and is handed to whatever needs to know who is logged in.

pub mod session;

pub use session::{LoginOutcome, SessionManager, SessionState};
