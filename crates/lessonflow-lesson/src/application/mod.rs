//! The lesson controller and the handle used to steer it.

pub mod controller;
pub mod handle;
