pub(crate) mod converter;
