//! BIRD control protocol framing.
//!
//! Requests are single lines of text. Replies are sequences of lines, each
//! starting with a four-digit code followed by a space (last line of the
//! reply) or a minus sign (the reply continues on the next line). Codes whose
//! first digit is `0` report that the action completed.
//!
//! ```text
//! 0001 BIRD 2.14 ready.
//! 1000-BIRD 2.14
//! 1011-Router ID is 192.0.2.1
//! 0000
//! ```
//!
//! Only the framing is handled here; the text after the code is returned to
//! the caller untouched.

mod frame;

pub use frame::*;
