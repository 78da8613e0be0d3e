//! Bundled game definitions.

pub mod grange;
