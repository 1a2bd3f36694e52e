use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("无效的EPUB压缩包: {0}")]
    InvalidArchive(String),

    #[error("压缩包中缺少条目: {0}")]
    MissingEntry(String),

    #[error("条目不是有效的UTF-8文本: {0}")]
    InvalidEncoding(String),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("container.xml解析错误: {0}")]
    ContainerParseError(String),

    #[error("package文档解析错误: {0}")]
    PackageParseError(String),

    #[error("目录文档解析错误: {0}")]
    TocParseError(String),
}
