//! Internal helpers.

pub(crate) mod normalize;
