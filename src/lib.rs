// persisted key-value configuration store
pub mod config;

// sequential render queue over external blender processes
pub mod manager;

// typed render settings, formats and queue status events
pub mod models;

// one queued blend file and its render configuration
pub mod project;

// path helpers and blender executable discovery
pub mod util;
