use crate::epub::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// OPF包文档的标准media-type
const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// container.xml中声明的rootfile条目
#[derive(Debug, Clone)]
pub struct Rootfile {
    pub full_path: String,
    pub media_type: String,
}

/// META-INF/container.xml的解析结果
///
/// container.xml是EPUB中唯一位置固定的描述文件，它的职责只有
/// 一个：声明package文档（rootfile）在压缩包中的位置。
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<Rootfile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 解析结果；未声明任何rootfile时返回
    ///   `ContainerParseError`
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"rootfiles" => {
                        in_rootfiles = true;
                    }
                    b"rootfile" if in_rootfiles => {
                        let mut full_path = String::new();
                        let mut media_type = String::new();

                        for attr_result in e.attributes() {
                            let attr = attr_result.map_err(|e| {
                                EpubError::XmlError(quick_xml::Error::InvalidAttr(e))
                            })?;
                            match attr.key.local_name().as_ref() {
                                b"full-path" => {
                                    full_path = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                b"media-type" => {
                                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }

                        if !full_path.is_empty() {
                            rootfiles.push(Rootfile {
                                full_path,
                                media_type,
                            });
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::ContainerParseError(
                "没有找到任何rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 获取package文档（rootfile）的路径
    ///
    /// 优先返回media-type为`application/oebps-package+xml`的条目，
    /// 没有标准类型时退回第一个rootfile。路径相对于压缩包根目录。
    ///
    /// # 返回值
    /// * `&str` - rootfile的路径（解析成功的Container至少有一个条目）
    pub fn rootfile_path(&self) -> &str {
        let preferred = self
            .rootfiles
            .iter()
            .find(|rf| rf.media_type == PACKAGE_MEDIA_TYPE);

        match preferred.or_else(|| self.rootfiles.first()) {
            Some(rootfile) => &rootfile.full_path,
            None => "",
        }
    }
}
