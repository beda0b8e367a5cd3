pub mod changelog;
pub mod console;
pub mod notes;
pub mod state;
