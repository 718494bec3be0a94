pub(crate) mod layout;
pub(crate) mod request;
pub(crate) mod style;
pub(crate) mod text;
pub(crate) mod wire;
