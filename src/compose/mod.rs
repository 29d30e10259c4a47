pub(crate) mod blend;
pub(crate) mod compositor;
pub(crate) mod layers;
pub(crate) mod pending;
pub(crate) mod place;
