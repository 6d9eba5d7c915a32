pub mod calc;
pub mod drift;
pub mod fuse;
