//! Session persistence with a request-scoped read memo.

mod memo;
mod model;
mod store;

pub use memo::ReadMemo;
pub use model::{
    DEFAULT_SESSION_TIMEOUT_MILLIS, PersistentSession, Session, SessionIdGenerator,
    UuidSessionIdGenerator,
};
pub use store::SessionStore;
