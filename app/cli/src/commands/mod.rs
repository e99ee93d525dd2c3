pub(crate) mod bg;
pub(crate) mod glob;
pub(crate) mod run;
