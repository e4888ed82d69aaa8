pub mod extraction;
pub mod recognition;
pub mod processor;
