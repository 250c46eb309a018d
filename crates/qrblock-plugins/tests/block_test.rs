//! End-to-end behaviour of the QR code block against a static host

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use qrblock_core::{CoreConfig, Course, CourseId, QrCacheManager};
use qrblock_plugins::{
    download, register_observers, Archetype, Capability, CourseDeleted, EventBus, HtmlRenderer,
    InMemoryBus, PageContext, PermissionSet, PluginError, QrCodeBlock, StaticHost,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const WWWROOT: &str = "https://example.org";

struct Fixture {
    _temp_dir: TempDir,
    host: StaticHost,
    cache: Arc<QrCacheManager>,
    renderer: HtmlRenderer,
}

fn setup(archetype: Archetype) -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let mut config = CoreConfig::default();
    config.site.wwwroot = WWWROOT.to_string();
    config.cache.root_dir = Some(temp_dir.path().to_path_buf());
    config.validate().unwrap();

    let cache = Arc::new(QrCacheManager::from_core_config(&config).unwrap());
    let host = StaticHost::new(config, PermissionSet::for_archetype(archetype));
    let renderer = HtmlRenderer::from_host(&host);
    Fixture {
        _temp_dir: temp_dir,
        host,
        cache,
        renderer,
    }
}

fn course_page(raw: i64) -> PageContext {
    let course = Course::new(CourseId::new(raw).unwrap()).with_names("BIO-1", "Biology");
    PageContext::course_view(course)
}

fn embedded_png(html: &str) -> Vec<u8> {
    let start = html.find("base64,").unwrap() + "base64,".len();
    let end = start + html[start..].find('"').unwrap();
    BASE64.decode(&html[start..end]).unwrap()
}

#[test]
fn student_sees_image_without_download_link() {
    let f = setup(Archetype::Student);
    let mut block = QrCodeBlock::init(&f.host, f.cache.clone());
    let ctx = course_page(42);

    let content = block.get_content(&f.host, &f.renderer, &ctx).unwrap().clone();

    assert_eq!(block.title(), "QR code");
    assert!(content.text.starts_with("<img "));
    assert!(!content.text.contains("<br>"));
    assert!(!content.text.contains("download.php"));

    let png = embedded_png(&content.text);
    let luma = image::load_from_memory(&png).unwrap().to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        luma.width() as usize,
        luma.height() as usize,
        |x, y| luma.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    let (_meta, payload) = grids[0].decode().unwrap();
    assert_eq!(payload, "https://example.org/course/view.php?id=42");
}

#[test]
fn teacher_gets_download_link() {
    let f = setup(Archetype::EditingTeacher);
    let mut block = QrCodeBlock::init(&f.host, f.cache.clone());

    let content = block.get_content(&f.host, &f.renderer, &course_page(42)).unwrap();

    assert!(content.text.contains("<br><a href=\"https://example.org/blocks/qrcode/download.php?courseid=42\""));
    assert!(content.text.contains("download=\"course-42.png\""));
}

#[test]
fn content_is_built_once_per_instance() {
    let f = setup(Archetype::Teacher);
    let mut block = QrCodeBlock::init(&f.host, f.cache.clone());
    let ctx = course_page(7);

    let first = block.get_content(&f.host, &f.renderer, &ctx).unwrap().clone();
    f.cache.invalidate(ctx.course.id).unwrap();
    let second = block.get_content(&f.host, &f.renderer, &ctx).unwrap().clone();

    assert_eq!(first, second);
    assert!(!f.cache.contains(ctx.course.id));
}

#[test]
fn refuses_pages_outside_course_view() {
    let f = setup(Archetype::Manager);
    let mut block = QrCodeBlock::init(&f.host, f.cache.clone());
    let mut ctx = course_page(3);
    ctx.page_type = "mod-forum-view".to_string();

    let err = block.get_content(&f.host, &f.renderer, &ctx).unwrap_err();

    assert!(matches!(err, PluginError::NotApplicable(page) if page == "mod-forum-view"));
    assert!(!f.cache.contains(ctx.course.id));
    assert!(!block.applicable_formats().allows("my-index"));
}

#[test]
fn course_deleted_event_evicts_image() {
    let f = setup(Archetype::Student);
    let bus = InMemoryBus::new();
    register_observers(&bus, f.cache.clone());

    let ctx = course_page(42);
    let mut block = QrCodeBlock::init(&f.host, f.cache.clone());
    block.get_content(&f.host, &f.renderer, &ctx).unwrap();
    let path = f.cache.path_for(ctx.course.id);
    assert!(path.is_file());

    bus.emit(CourseDeleted { course_id: ctx.course.id }.to_event());
    assert!(!path.exists());

    // Deleting again, or a course that never rendered, is harmless.
    bus.emit(CourseDeleted { course_id: ctx.course.id }.to_event());
    bus.emit(
        CourseDeleted {
            course_id: CourseId::new(99).unwrap(),
        }
        .to_event(),
    );
    assert!(!path.exists());

    let mut fresh = QrCodeBlock::init(&f.host, f.cache.clone());
    fresh.get_content(&f.host, &f.renderer, &ctx).unwrap();
    assert!(path.is_file());
}

#[test]
fn download_requires_see_button() {
    let f = setup(Archetype::Student);
    let err = download(&f.host, &*f.cache, &course_page(42)).unwrap_err();
    assert!(matches!(err, PluginError::PermissionDenied(Capability::SeeButton)));
}

#[test]
fn download_serves_cached_png() {
    let f = setup(Archetype::Teacher);
    let ctx = course_page(42);

    let served = download(&f.host, &*f.cache, &ctx).unwrap();

    assert_eq!(served.filename, "qrcode-BIO-1.png");
    assert_eq!(served.content_type, "image/png");
    assert_eq!(served.bytes, fs::read(f.cache.path_for(ctx.course.id)).unwrap());
}
