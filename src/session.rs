pub(crate) mod drag;
pub(crate) mod editor;
pub(crate) mod scheduler;
