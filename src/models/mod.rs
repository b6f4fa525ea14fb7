pub mod attendee;
pub mod event;
pub mod user;

pub use attendee::{Attendee, AttendeeWithEvent};
pub use event::Event;
pub use user::{Role, User};
