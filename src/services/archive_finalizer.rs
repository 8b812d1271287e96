//! 收据打包 - 业务能力层

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, AppResult};

/// 收据打包能力
pub trait ArchiveFinalizer: Send + Sync {
    /// 把 `receipts_dir` 中所有 PDF 打包到 `archive_path`，返回打包的文件数
    ///
    /// 总是完整重建，已有的压缩包会被覆盖。
    fn archive(&self, receipts_dir: &Path, archive_path: &Path) -> AppResult<usize>;
}

/// zip 打包实现
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveFinalizer;

impl ZipArchiveFinalizer {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveFinalizer for ZipArchiveFinalizer {
    fn archive(&self, receipts_dir: &Path, archive_path: &Path) -> AppResult<usize> {
        let receipts = list_pdfs(receipts_dir).map_err(|e| archive_error(receipts_dir, e))?;
        info!(
            "📦 正在打包 {} 份收据到 {}",
            receipts.len(),
            archive_path.display()
        );

        let file = File::create(archive_path).map_err(|e| AppError::write_failed(archive_path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for receipt in &receipts {
            let name = receipt
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            zip.start_file(name.as_str(), options)
                .map_err(|e| archive_error(archive_path, e))?;
            let mut source = File::open(receipt).map_err(|e| archive_error(receipt, e))?;
            io::copy(&mut source, &mut zip).map_err(|e| archive_error(archive_path, e))?;
            debug!("已加入压缩包: {}", name);
        }

        zip.finish().map_err(|e| archive_error(archive_path, e))?;
        info!("✓ 压缩包已生成: {}", archive_path.display());
        Ok(receipts.len())
    }
}

/// 目录中的 PDF 文件，按文件名排序
fn list_pdfs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

fn archive_error(path: &Path, detail: impl ToString) -> AppError {
    AppError::ArchiveFailure {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}
