pub mod countdown_service;
pub mod session_store;

pub use countdown_service::{CountdownObserver, CountdownService};
pub use session_store::SessionStore;
