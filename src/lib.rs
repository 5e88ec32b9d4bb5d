//! Indian income tax computation for a single assessment year.

pub mod tax;
