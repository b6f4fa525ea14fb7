//! Parameterized queries against the three tables. Every function takes the
//! pool explicitly; nothing here holds connection state.

pub mod attendees;
pub mod events;
pub mod users;
