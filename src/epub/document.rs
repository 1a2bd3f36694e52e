use std::path::Path;

use crate::epub::archive::Archive;
use crate::epub::container::Container;
use crate::epub::error::Result;
use crate::epub::package::Package;
use crate::epub::path;
use crate::epub::toc::TableOfContents;

/// EPUB文档的解析管线
///
/// 三个描述文件按固定的依赖链解析：container声明package文档的
/// 位置，package文档声明目录文档的位置。每个解析结果只在首次
/// 访问时计算并缓存；解析失败不缓存，下次访问会重试。
///
/// 访问器都是`&mut self`方法，多线程共享一个实例需要调用方
/// 自行加锁。
#[derive(Debug)]
pub struct Document {
    archive: Archive,
    container: Option<Container>,
    package: Option<Package>,
    toc: Option<TableOfContents>,
    rootfile_dir: Option<String>,
}

impl Document {
    /// container.xml在EPUB压缩包中的固定位置
    pub const CONTAINER_FILE_PATH: &'static str = "META-INF/container.xml";

    /// 从文件路径创建Document实例
    ///
    /// 构造时校验一次压缩包的有效性，描述文件的解析推迟到首次
    /// 访问对应的访问器。
    ///
    /// # 参数
    /// * `path` - EPUB文件的路径
    ///
    /// # 返回值
    /// * `Result<Document>` - 成功返回Document实例；路径不存在或
    ///   不是有效zip时返回`InvalidArchive`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Document> {
        Ok(Document {
            archive: Archive::open(path)?,
            container: None,
            package: None,
            toc: None,
            rootfile_dir: None,
        })
    }

    /// 获取底层的压缩包访问器
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// 获取解析后的container信息
    ///
    /// 首次访问时读取`META-INF/container.xml`并解析，之后返回
    /// 缓存值，不再产生任何IO。
    ///
    /// # 返回值
    /// * `Result<&Container>` - container信息；文件缺失返回
    ///   `MissingEntry`，解析错误原样向上传播
    pub fn container(&mut self) -> Result<&Container> {
        if self.container.is_none() {
            let xml = self.archive.read_text(Self::CONTAINER_FILE_PATH)?;
            self.container = Some(Container::parse_xml(&xml)?);
        }
        Ok(self.container.as_ref().unwrap())
    }

    /// 获取解析后的package信息
    ///
    /// 解析依赖是严格有序的：访问package会先强制解析container，
    /// 再读取其中声明的rootfile路径。
    ///
    /// # 返回值
    /// * `Result<&Package>` - package信息
    pub fn package(&mut self) -> Result<&Package> {
        if self.package.is_none() {
            let rootfile = self.container()?.rootfile_path().to_string();
            let xml = self.archive.read_text(&rootfile)?;
            self.package = Some(Package::parse_xml(&xml)?);
        }
        Ok(self.package.as_ref().unwrap())
    }

    /// 获取rootfile（package文档）的路径
    pub fn rootfile_path(&mut self) -> Result<String> {
        Ok(self.container()?.rootfile_path().to_string())
    }

    /// 获取rootfile所在的目录
    ///
    /// 该目录是目录文档href的解析基准。rootfile位于压缩包根目录
    /// 时为空字符串。结果只计算一次。
    pub fn rootfile_dir(&mut self) -> Result<String> {
        if self.rootfile_dir.is_none() {
            let rootfile = self.container()?.rootfile_path().to_string();
            self.rootfile_dir = Some(path::parent(&rootfile));
        }
        Ok(self.rootfile_dir.clone().unwrap_or_default())
    }

    /// 获取解析后的目录信息
    ///
    /// 按版本选择目录载体，判定顺序固定：
    /// 1. 主版本为"3"且存在导航文档href时使用导航文档；
    /// 2. 否则主版本为"2"且存在NCX href时使用传统NCX；
    /// 3. 否则返回`None`——出版物缺少目录元数据是合法状态，
    ///    不是错误。
    ///
    /// 选中的href相对于rootfile所在目录解析。`None`不会被缓存，
    /// 重复调用会重新执行同样的（廉价）判定并确定性地再次返回
    /// `None`；成功解析的目录会被缓存。
    ///
    /// # 返回值
    /// * `Result<Option<&TableOfContents>>` - 目录信息，缺少目录
    ///   元数据时为`None`
    pub fn toc(&mut self) -> Result<Option<&TableOfContents>> {
        if self.toc.is_none() {
            let href = {
                let package = self.package()?;
                if package.major_version() == "3" && package.nav_href().is_some() {
                    package.nav_href().map(String::from)
                } else if package.major_version() == "2" && package.toc_href().is_some() {
                    package.toc_href().map(String::from)
                } else {
                    None
                }
            };

            let href = match href {
                Some(href) => href,
                None => return Ok(None),
            };

            let base_dir = self.rootfile_dir()?;
            let toc_path = path::join(&base_dir, &href);
            let content = self.archive.read_text(&toc_path)?;
            self.toc = Some(TableOfContents::parse(&content)?);
        }
        Ok(self.toc.as_ref())
    }
}
