//! BookProbe - EPUB结构元数据提取库
//!
//! 不解包整个EPUB文件，只按依赖顺序定位并解析其中的三个描述
//! 文件：container、package文档和目录文档。每个文件的位置由上
//! 一个文件解析得出，解析结果按需计算并缓存。

pub mod epub;

// === 核心API重新导出 ===

/// EPUB解析管线（主要接口）
pub use epub::Document;

/// 压缩包访问器（底层接口）
pub use epub::Archive;

/// 错误处理
pub use epub::{EpubError, Result};

// === 数据结构 ===

/// container信息
pub use epub::{Container, Rootfile};

/// package信息
pub use epub::{ManifestItem, Package};

/// 目录信息
pub use epub::{TableOfContents, TocEntry};

// === 库信息 ===

/// BookProbe库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// BookProbe库的描述
pub const DESCRIPTION: &str = "一个用于提取EPUB文件结构元数据的Rust库";

// === 便捷函数 ===

/// 快速打开EPUB文件
///
/// 这是 `Document::from_path` 的便捷包装函数。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<Document>` - 解析管线实例
///
/// # 示例
///
/// ```no_run
/// let mut doc = bookprobe::open("book.epub")?;
/// println!("rootfile: {}", doc.rootfile_path()?);
/// # Ok::<(), bookprobe::EpubError>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Document> {
    Document::from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_open_invalid_path() {
        let result = open("does_not_exist.epub");
        assert!(matches!(result, Err(EpubError::InvalidArchive(_))));
    }
}
