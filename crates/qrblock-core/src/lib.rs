pub mod cache;
pub mod config;
pub mod course;
pub mod encoder;
pub mod error;
pub mod logging;

pub use cache::{CacheStatus, QrCacheManager, COMPONENT_DIR};
pub use config::{CacheConfig, CoreConfig, LoggingConfig, QrConfig, SiteConfig};
pub use course::{course_url, Course, CourseId};
pub use encoder::{ErrorCorrection, PngQrEncoder, QrEncoder};
pub use error::{format_error_chain, CoreError, CoreResult};
