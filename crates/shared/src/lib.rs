pub mod domain;
pub mod error;
pub mod names;
pub mod path;
pub mod protocol;
pub mod provided;
pub mod validation;
pub mod witness;
