pub mod reply;

pub use reply::{edit_screen, send_screen};
