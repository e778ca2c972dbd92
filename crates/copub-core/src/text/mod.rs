//! Text processing for name comparison

mod normalization;

pub use normalization::{normalize_author_list, normalize_name};
