use crate::error::PluginResult;
use crate::host_api::HostApi;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use qrblock_core::CourseId;
use std::fs;
use std::path::Path;

pub trait BlockRenderer {
    /// Self-contained image fragment for the PNG at `path`.
    fn display_image(&self, path: &Path) -> PluginResult<String>;

    fn display_download_link(&self, path: &Path, course_id: CourseId) -> String;
}

#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    wwwroot: String,
    alt_text: String,
    download_label: String,
}

impl HtmlRenderer {
    pub fn new(
        wwwroot: impl Into<String>,
        alt_text: impl Into<String>,
        download_label: impl Into<String>,
    ) -> Self {
        Self {
            wwwroot: wwwroot.into().trim_end_matches('/').to_string(),
            alt_text: alt_text.into(),
            download_label: download_label.into(),
        }
    }

    /// Site root and labels come from the host, the same config the block
    /// builds course links from.
    pub fn from_host(host: &dyn HostApi) -> Self {
        Self::new(
            host.get_config().site.wwwroot,
            host.get_string("qrcode"),
            host.get_string("download"),
        )
    }

    pub fn download_url(&self, course_id: CourseId) -> String {
        format!("{}/blocks/qrcode/download.php?courseid={course_id}", self.wwwroot)
    }
}

impl BlockRenderer for HtmlRenderer {
    fn display_image(&self, path: &Path) -> PluginResult<String> {
        let png = fs::read(path)?;
        Ok(format!(
            r#"<img src="data:image/png;base64,{}" alt="{}" class="img-responsive" />"#,
            BASE64.encode(png),
            escape_html(&self.alt_text)
        ))
    }

    fn display_download_link(&self, path: &Path, course_id: CourseId) -> String {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("course-{course_id}.png"));
        format!(
            r#"<a href="{}" download="{}" class="btn btn-secondary">{}</a>"#,
            escape_html(&self.download_url(course_id)),
            escape_html(&filename),
            escape_html(&self.download_label)
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn image_fragment_embeds_file_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("course-1.png");
        fs::write(&path, b"\x89PNG").unwrap();

        let renderer = HtmlRenderer::new("https://example.org", "QR", "Download");
        let html = renderer.display_image(&path).unwrap();
        assert!(html.starts_with(r#"<img src="data:image/png;base64,iVBORw==""#));
        assert!(html.contains(r#"alt="QR""#));
    }

    #[test]
    fn missing_image_is_an_error() {
        let renderer = HtmlRenderer::new("https://example.org", "QR", "Download");
        assert!(renderer.display_image(Path::new("/nonexistent/course-1.png")).is_err());
    }

    #[test]
    fn download_link_points_at_course() {
        let renderer = HtmlRenderer::new("https://example.org/", "QR", "Get <it>");
        let id = CourseId::new(42).unwrap();
        let html = renderer.display_download_link(Path::new("/c/block_qrcode/course-42.png"), id);
        assert_eq!(
            html,
            r#"<a href="https://example.org/blocks/qrcode/download.php?courseid=42" download="course-42.png" class="btn btn-secondary">Get &lt;it&gt;</a>"#
        );
    }

    #[test]
    fn from_host_follows_site_config() {
        use crate::host_api::StaticHost;
        use crate::permissions::PermissionSet;
        use qrblock_core::CoreConfig;

        let mut config = CoreConfig::default();
        config.site.wwwroot = "https://lms.example.edu/moodle/".to_string();
        let host = StaticHost::new(config, PermissionSet::default()).with_string("download", "Save");

        let renderer = HtmlRenderer::from_host(&host);
        let id = CourseId::new(8).unwrap();
        assert_eq!(
            renderer.download_url(id),
            "https://lms.example.edu/moodle/blocks/qrcode/download.php?courseid=8"
        );
        assert!(renderer
            .display_download_link(Path::new("course-8.png"), id)
            .ends_with(">Save</a>"));
    }

    #[test]
    fn escapes_attribute_values() {
        assert_eq!(escape_html(r#"a&b"c'<>"#), "a&amp;b&quot;c&#39;&lt;&gt;");
    }
}
