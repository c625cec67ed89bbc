pub(crate) mod composite;
pub(crate) mod geometry;
pub(crate) mod item;
pub(crate) mod planner;
pub(crate) mod surface;
