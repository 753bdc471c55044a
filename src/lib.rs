pub mod attachment;
pub mod common;
pub mod seat;
pub mod sys;
