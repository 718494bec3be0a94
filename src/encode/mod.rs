pub(crate) mod image_out;
