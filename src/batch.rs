pub(crate) mod packager;
pub(crate) mod pipeline;
