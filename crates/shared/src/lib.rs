pub mod domain;
pub mod error;
pub mod filter;
pub mod protocol;
pub mod validation;
