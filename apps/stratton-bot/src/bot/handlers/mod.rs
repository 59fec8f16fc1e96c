pub mod callback;
pub mod command;
pub mod voice;
