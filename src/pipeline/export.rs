//! Deck export: rendered slides → one multi-page PDF.
//!
//! Every agenda item that carries a slide image becomes one 1920×1080 page,
//! in agenda order; items without an image are skipped rather than rendered
//! as blank pages. The images are already generated at the target size, so
//! each one is placed at the origin and stretched to the full page.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not safe to drive
//! from async contexts. Decoding and assembly run on the blocking pool.

use crate::agenda::AgendaItem;
use crate::config::AppConfig;
use crate::error::SlideDeckError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Page width in PDF points.
pub const PAGE_WIDTH: f32 = 1920.0;
/// Page height in PDF points.
pub const PAGE_HEIGHT: f32 = 1080.0;
/// File name offered for download.
pub const DECK_FILE_NAME: &str = "meeting-slides.pdf";

/// A finished PDF held in memory.
#[derive(Debug, Clone)]
pub struct ExportedDeck {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Split a `data:<mime>;base64,<payload>` URI into its media type and bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| "data URI is not base64-encoded".to_string())?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64: {e}"))?;
    Ok((mime.to_string(), bytes))
}

/// Decode the slide of every item that has one, keeping agenda order.
pub fn slide_images(items: &[AgendaItem]) -> Result<Vec<DynamicImage>, SlideDeckError> {
    let mut images = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let Some(uri) = item.slide_image.as_deref() else {
            debug!("Skipping '{}': no slide", item.title);
            continue;
        };
        let invalid = |detail: String| SlideDeckError::InvalidImage {
            index: i + 1,
            detail,
        };
        let (mime, bytes) = decode_data_uri(uri).map_err(invalid)?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| invalid(format!("cannot decode {mime}: {e}")))?;
        images.push(image);
    }
    if images.is_empty() {
        return Err(SlideDeckError::NothingToExport);
    }
    Ok(images)
}

/// Bind to pdfium: an explicit library file or directory, else the system library.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, SlideDeckError> {
    let bindings = match library {
        Some(path) if path.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
        }
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| SlideDeckError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of PDF assembly.
fn build_pdf_blocking(
    images: &[DynamicImage],
    library: Option<&Path>,
) -> Result<Vec<u8>, SlideDeckError> {
    let pdfium = bind_pdfium(library)?;
    let failed = |e: PdfiumError| SlideDeckError::ExportFailed(format!("{e:?}"));

    let mut document = pdfium.create_new_pdf().map_err(failed)?;

    for (i, image) in images.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(PAGE_WIDTH),
                PdfPoints::new(PAGE_HEIGHT),
            ))
            .map_err(failed)?;

        page.objects_mut()
            .create_image_object(
                PdfPoints::new(0.0),
                PdfPoints::new(0.0),
                image,
                Some(PdfPoints::new(PAGE_WIDTH)),
                Some(PdfPoints::new(PAGE_HEIGHT)),
            )
            .map_err(failed)?;

        debug!(
            "Placed slide {} ({}x{} px) on page {}",
            i + 1,
            image.width(),
            image.height(),
            i + 1
        );
    }

    document.save_to_bytes().map_err(failed)
}

/// Assemble the slides of `items` into a PDF held in memory.
pub async fn export_pdf(
    items: &[AgendaItem],
    config: &AppConfig,
) -> Result<ExportedDeck, SlideDeckError> {
    let items = items.to_vec();
    let library = config.pdfium_library_path.clone();

    tokio::task::spawn_blocking(move || {
        let images = slide_images(&items)?;
        let bytes = build_pdf_blocking(&images, library.as_deref())?;
        info!("Exported {} slides ({} bytes)", images.len(), bytes.len());
        Ok(ExportedDeck {
            bytes,
            page_count: images.len(),
        })
    })
    .await
    .map_err(|e| SlideDeckError::Internal(format!("Export task panicked: {e}")))?
}

/// Export the deck and write it to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn export_to_file(
    items: &[AgendaItem],
    output_path: impl AsRef<Path>,
    config: &AppConfig,
) -> Result<ExportedDeck, SlideDeckError> {
    let deck = export_pdf(items, config).await?;
    write_atomically(output_path.as_ref(), &deck.bytes).await?;
    Ok(deck)
}

/// Write `bytes` next to `path` as `*.pdf.tmp`, then rename into place.
/// The temp file is removed again if either step fails.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), SlideDeckError> {
    let write_failed = |source: std::io::Error| SlideDeckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_failed)?;
    }

    let tmp_path: PathBuf = path.with_extension("pdf.tmp");
    let written = match tokio::fs::write(&tmp_path, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(write_failed(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_data_uri(color: [u8; 4]) -> String {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba(color)));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode png");
        format!("data:image/png;base64,{}", STANDARD.encode(&buf))
    }

    #[test]
    fn decode_data_uri_splits_mime_and_payload() {
        let (mime, bytes) = decode_data_uri("data:image/jpeg;base64,AQID").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn decode_data_uri_rejects_other_shapes() {
        assert!(decode_data_uri("https://example.com/a.png").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png,rawbytes").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn items_without_slides_are_skipped() {
        let items = vec![
            AgendaItem::new("A", "a").with_slide(png_data_uri([255, 0, 0, 255])),
            AgendaItem::new("B", "b"),
            AgendaItem::new("C", "c").with_slide(png_data_uri([0, 0, 255, 255])),
        ];
        let images = slide_images(&items).unwrap();
        assert_eq!(images.len(), 2);
        // Order follows the agenda: red first, blue second.
        assert_eq!(images[0].to_rgba8().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(images[1].to_rgba8().get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn no_slides_is_nothing_to_export() {
        let items = vec![AgendaItem::new("A", "a")];
        assert!(matches!(
            slide_images(&items),
            Err(SlideDeckError::NothingToExport)
        ));
        assert!(matches!(
            slide_images(&[]),
            Err(SlideDeckError::NothingToExport)
        ));
    }

    #[test]
    fn corrupt_slide_reports_its_position() {
        let items = vec![
            AgendaItem::new("A", "a").with_slide(png_data_uri([1, 2, 3, 255])),
            AgendaItem::new("B", "b").with_slide("data:image/png;base64,AAAA"),
        ];
        match slide_images(&items) {
            Err(SlideDeckError::InvalidImage { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected InvalidImage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn atomic_write_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join(DECK_FILE_NAME);
        write_atomically(&out, b"%PDF-1.7").await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.7");
        assert!(!out.with_extension("pdf.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        let out = dir.path().join(DECK_FILE_NAME);
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("keep"), b"x").unwrap();

        let err = write_atomically(&out, b"%PDF-1.7").await.unwrap_err();
        assert!(matches!(err, SlideDeckError::OutputWriteFailed { .. }), "{err:?}");
        assert!(!out.with_extension("pdf.tmp").exists());
        assert!(out.join("keep").exists());
    }

    /// Needs a pdfium shared library; set PDFIUM_TEST_LIB to run.
    #[tokio::test]
    async fn exports_one_page_per_slide() {
        let Ok(lib) = std::env::var("PDFIUM_TEST_LIB") else {
            println!("SKIP — set PDFIUM_TEST_LIB=/path/to/libpdfium to run");
            return;
        };
        let config = AppConfig::builder()
            .pdfium_library_path(&lib)
            .build()
            .unwrap();
        let items = vec![
            AgendaItem::new("A", "a").with_slide(png_data_uri([255, 0, 0, 255])),
            AgendaItem::new("B", "b"),
            AgendaItem::new("C", "c").with_slide(png_data_uri([0, 255, 0, 255])),
        ];

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(DECK_FILE_NAME);
        let deck = export_to_file(&items, &out, &config).await.unwrap();
        assert_eq!(deck.page_count, 2);
        assert!(deck.bytes.starts_with(b"%PDF"));

        let pdfium = bind_pdfium(Some(Path::new(&lib))).unwrap();
        let reread = pdfium.load_pdf_from_file(&out, None).unwrap();
        assert_eq!(reread.pages().len(), 2);

        // Agenda order survives: red slide first, green slide second.
        let render = PdfRenderConfig::new().set_target_width(64);
        let centres: Vec<[u8; 3]> = reread
            .pages()
            .iter()
            .map(|page| {
                assert_eq!(page.width().value, PAGE_WIDTH);
                assert_eq!(page.height().value, PAGE_HEIGHT);
                let img = page.render_with_config(&render).unwrap().as_image().to_rgb8();
                img.get_pixel(img.width() / 2, img.height() / 2).0
            })
            .collect();
        assert!(centres[0][0] > 200 && centres[0][1] < 60, "page 1: {:?}", centres[0]);
        assert!(centres[1][1] > 200 && centres[1][0] < 60, "page 2: {:?}", centres[1]);
    }
}
