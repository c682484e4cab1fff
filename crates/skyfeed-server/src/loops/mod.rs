//! Background loops for continuous processing.

pub mod feed_loop;
