pub mod contracts;
pub mod http;
pub mod schedule;
pub mod source;
pub mod worker;

pub use contracts::*;
pub use http::*;
pub use schedule::*;
pub use source::*;
pub use worker::*;
