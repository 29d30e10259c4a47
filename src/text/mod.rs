pub(crate) mod layout;
pub(crate) mod shaper;
pub(crate) mod substitute;

#[cfg(test)]
#[path = "../../tests/unit/text/box_shaper.rs"]
pub(crate) mod box_shaper;
