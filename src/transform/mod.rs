pub(crate) mod ellipse;
pub(crate) mod perspective;
pub(crate) mod resize;
pub(crate) mod rotate;
pub(crate) mod sample;
