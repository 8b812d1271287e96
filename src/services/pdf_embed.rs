//! 向已有 PDF 追加一页图片

use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// A4 尺寸（pt）
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 36.0;

/// 把图片作为新的一页追加到 PDF 末尾，原有页面保持不变
///
/// 图片水平居中、贴顶放置，超出页面时等比缩小。
pub fn append_image_page(pdf_path: &Path, image_path: &Path) -> AppResult<()> {
    let image = image::open(image_path)
        .map_err(|e| AppError::pdf_failed(image_path, e))?
        .to_rgb8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::pdf_failed(image_path, "截图尺寸为 0"));
    }

    let mut doc = Document::load(pdf_path).map_err(|e| AppError::pdf_failed(pdf_path, e))?;
    let pages_id = pages_root(&doc).map_err(|e| AppError::pdf_failed(pdf_path, e))?;

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        image.into_raw(),
    ));

    let (draw_width, draw_height) = fit(width as f64, height as f64);
    let x = (PAGE_WIDTH - draw_width) / 2.0;
    let y = PAGE_HEIGHT - MARGIN - draw_height;
    let content = format!(
        "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Screenshot Do Q",
        draw_width, draw_height, x, y
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH as i64),
            Object::Integer(PAGE_HEIGHT as i64),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Screenshot" => image_id,
            },
        },
    });

    let pages = doc
        .get_object_mut(pages_id)
        .and_then(|object| object.as_dict_mut())
        .map_err(|e| AppError::pdf_failed(pdf_path, e))?;
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages
        .get_mut(b"Kids")
        .and_then(|object| object.as_array_mut())
        .map_err(|e| AppError::pdf_failed(pdf_path, e))?
        .push(Object::Reference(page_id));
    pages.set("Count", Object::Integer(count + 1));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::pdf_failed(pdf_path, e))?;
    std::fs::write(pdf_path, bytes).map_err(|e| AppError::write_failed(pdf_path, e))?;

    debug!(
        "已将 {} 追加到 {} (第 {} 页)",
        image_path.display(),
        pdf_path.display(),
        count + 1
    );
    Ok(())
}

/// 页面树根节点
fn pages_root(doc: &Document) -> lopdf::Result<ObjectId> {
    let catalog_id = doc.trailer.get(b"Root").and_then(Object::as_reference)?;
    doc.get_dictionary(catalog_id)?
        .get(b"Pages")
        .and_then(Object::as_reference)
}

/// 在页边距内等比缩放，不放大
fn fit(width: f64, height: f64) -> (f64, f64) {
    let max_width = PAGE_WIDTH - 2.0 * MARGIN;
    let max_height = PAGE_HEIGHT - 2.0 * MARGIN;
    let scale = (max_width / width).min(max_height / height).min(1.0);
    (width * scale, height * scale)
}
