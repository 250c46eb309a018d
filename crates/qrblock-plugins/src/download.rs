use crate::block::PageContext;
use crate::error::{PluginError, PluginResult};
use crate::host_api::HostApi;
use crate::permissions::Capability;
use qrblock_core::{QrCacheManager, QrEncoder};

pub const PNG_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serves the course image as an attachment. Regenerates it if it was evicted
/// after the link was rendered.
pub fn download<E: QrEncoder>(
    host: &dyn HostApi,
    cache: &QrCacheManager<E>,
    ctx: &PageContext,
) -> PluginResult<Download> {
    if !host.has_capability(Capability::SeeButton, ctx) {
        return Err(PluginError::PermissionDenied(Capability::SeeButton));
    }

    let cfg = host.get_config();
    let url = ctx.course.url(&cfg.site.wwwroot)?;
    let path = cache.ensure_image(ctx.course.id, url.as_str())?;
    let bytes = std::fs::read(&path)?;
    tracing::debug!(course_id = %ctx.course.id, bytes = bytes.len(), "serving qr download");

    Ok(Download {
        filename: download_filename(&ctx.course.shortname, ctx.course.id.get()),
        content_type: PNG_CONTENT_TYPE,
        bytes,
    })
}

fn download_filename(shortname: &str, course_id: u64) -> String {
    let clean: String = shortname
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if clean.is_empty() {
        format!("qrcode-course-{course_id}.png")
    } else {
        format!("qrcode-{clean}.png")
    }
}
