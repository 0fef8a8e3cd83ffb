//! Building blocks of the patch descriptor: where a window sits
//! and how its pixels become a unit-norm vector

pub mod patch;
pub mod window;
