//! Core math modules.

pub mod bayes;
pub mod bayes_factor;
