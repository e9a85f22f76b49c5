mod paint;

pub use paint::*;
