#![forbid(unsafe_code)]

//! Content model and learning-session engine.
//!
//! Sessions operate purely on an in-memory [`model::Module`] snapshot: a
//! [`session::QuizSession`] walks a flattened question list and scores it, a
//! [`session::FlashcardSession`] runs a first pass over a deck followed by
//! optional review passes over the cards marked wrong.

pub mod model;
pub mod notify;
pub mod session;
pub mod time;

pub use notify::{Notification, NotificationSink, RecordingSink};
pub use time::Clock;
