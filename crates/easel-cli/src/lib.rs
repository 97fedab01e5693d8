pub mod demo;
pub mod verify;
pub mod window;
