pub mod archive;
pub mod container;
pub mod document;
pub mod error;
pub mod package;
pub mod path;
pub mod toc;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出压缩包访问器
pub use archive::Archive;

// 重新导出解析管线
pub use document::Document;

// 重新导出各描述文件的解析结果
pub use container::{Container, Rootfile};
pub use package::{ManifestItem, Package};
pub use toc::{TableOfContents, TocEntry};
