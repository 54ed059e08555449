pub mod app;
pub mod audio;
pub mod camera;
pub mod config;
pub mod error;
pub mod greeting;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod telemetry;

pub use app::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};
pub use error::Error;
pub use session::SharedSession;
