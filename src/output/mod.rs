mod console;

pub use console::{percent, Console};
