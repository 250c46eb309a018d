use crate::bus::{handler, CourseDeleted, EventBus};
use crate::error::{PluginError, PluginResult};
use crate::host_api::HostApi;
use crate::manifest::{ApplicableFormats, PluginManifest};
use crate::permissions::Capability;
use crate::renderer::BlockRenderer;
use qrblock_core::{Course, PngQrEncoder, QrCacheManager, QrEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The page a block instance is rendered on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub course: Course,
    pub page_type: String,
}

impl PageContext {
    pub fn course_view(course: Course) -> Self {
        Self {
            course,
            page_type: "course-view".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContent {
    pub text: String,
    pub footer: String,
}

/// Block showing a QR code that links to the current course.
pub struct QrCodeBlock<E = PngQrEncoder> {
    manifest: PluginManifest,
    cache: Arc<QrCacheManager<E>>,
    title: String,
    content: Option<BlockContent>,
}

impl<E: QrEncoder> QrCodeBlock<E> {
    pub fn init(host: &dyn HostApi, cache: Arc<QrCacheManager<E>>) -> Self {
        Self {
            manifest: PluginManifest::block_qrcode(),
            cache,
            title: host.get_string("pluginname"),
            content: None,
        }
    }

    pub fn with_manifest(mut self, manifest: PluginManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn applicable_formats(&self) -> &ApplicableFormats {
        &self.manifest.formats
    }

    /// Builds the block body once per instance and returns it on later calls.
    pub fn get_content(
        &mut self,
        host: &dyn HostApi,
        renderer: &dyn BlockRenderer,
        ctx: &PageContext,
    ) -> PluginResult<&BlockContent> {
        let content = match self.content.take() {
            Some(content) => content,
            None => self.build_content(host, renderer, ctx)?,
        };
        Ok(self.content.insert(content))
    }

    fn build_content(
        &self,
        host: &dyn HostApi,
        renderer: &dyn BlockRenderer,
        ctx: &PageContext,
    ) -> PluginResult<BlockContent> {
        if !self.manifest.formats.allows(&ctx.page_type) {
            return Err(PluginError::NotApplicable(ctx.page_type.clone()));
        }

        let cfg = host.get_config();
        let url = ctx.course.url(&cfg.site.wwwroot)?;
        let path = self.cache.ensure_image(ctx.course.id, url.as_str())?;

        let mut text = renderer.display_image(&path)?;
        if host.has_capability(Capability::SeeButton, ctx) {
            text.push_str("<br>");
            text.push_str(&renderer.display_download_link(&path, ctx.course.id));
        }

        Ok(BlockContent {
            text,
            footer: String::new(),
        })
    }
}

/// Drops the cached image of a deleted course.
pub fn observe_course_deleted<E: QrEncoder>(
    cache: &QrCacheManager<E>,
    event: &CourseDeleted,
) -> PluginResult<bool> {
    Ok(cache.invalidate(event.course_id)?)
}

pub fn register_observers<E: QrEncoder + 'static>(
    bus: &dyn EventBus,
    cache: Arc<QrCacheManager<E>>,
) {
    bus.subscribe(
        CourseDeleted::TOPIC,
        handler(move |event| {
            let deleted = CourseDeleted::from_event(event)?;
            observe_course_deleted(&*cache, &deleted)?;
            Ok(())
        }),
    );
}
