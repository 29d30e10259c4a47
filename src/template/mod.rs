//! Template documents and the registry that owns them.

pub(crate) mod model;
pub(crate) mod registry;
