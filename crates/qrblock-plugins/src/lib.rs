pub mod block;
pub mod bus;
pub mod download;
pub mod error;
pub mod host_api;
pub mod manifest;
pub mod permissions;
pub mod renderer;

pub use block::{observe_course_deleted, register_observers, BlockContent, PageContext, QrCodeBlock};
pub use bus::{BusEvent, CourseDeleted, EventBus, InMemoryBus};
pub use download::{download, Download};
pub use error::{PluginError, PluginResult};
pub use host_api::{HostApi, StaticHost};
pub use manifest::{ApplicableFormats, PluginManifest};
pub use permissions::{Archetype, Capability, PermissionSet};
pub use renderer::{BlockRenderer, HtmlRenderer};
