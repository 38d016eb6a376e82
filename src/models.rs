pub mod device;
pub mod engine;
pub mod format;
pub mod settings;
pub mod status;
