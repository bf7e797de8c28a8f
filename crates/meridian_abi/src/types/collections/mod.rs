mod array_dynamic;
mod array_static;
pub(crate) mod tuple;
