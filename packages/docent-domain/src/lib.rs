pub mod messages;
pub mod passage;
pub mod ranking;

pub use passage::{Passage, ParseResponseTypeError, ResponseType};
pub use ranking::{Ranked, filter_and_rank};
