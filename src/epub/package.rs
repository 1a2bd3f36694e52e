use crate::epub::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// NCX文档的标准media-type（EPUB 2的目录机制）
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// manifest中的清单项
#[derive(Debug, Clone)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl ManifestItem {
    /// 检查properties属性中是否包含指定token
    fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .map(|props| props.split_whitespace().any(|p| p == property))
            .unwrap_or(false)
    }
}

/// package文档（rootfile/OPF）的解析结果
///
/// 解析管线只依赖版本号和两种目录引用的定位信息，因此这里
/// 不展开metadata和spine的完整内容。
#[derive(Debug, Clone)]
pub struct Package {
    /// package元素的version属性
    version: String,
    /// manifest清单项（保持文档中的声明顺序）
    manifest: Vec<ManifestItem>,
    /// spine元素的toc属性（指向NCX清单项的id）
    spine_toc: Option<String>,
}

impl Package {
    /// 解析package文档内容
    ///
    /// # 参数
    /// * `xml_content` - package文档的XML内容
    ///
    /// # 返回值
    /// * `Result<Package>` - 解析结果；没有package根元素时返回
    ///   `PackageParseError`
    pub fn parse_xml(xml_content: &str) -> Result<Package> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut version = String::new();
        let mut manifest = Vec::new();
        let mut spine_toc = None;
        let mut found_package = false;

        let mut buf = Vec::new();
        let mut current_section = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "package" => {
                            found_package = true;
                            version = Self::parse_version_attribute(e)?;
                        }
                        "manifest" => {
                            current_section = "manifest".to_string();
                        }
                        "spine" => {
                            current_section = "spine".to_string();
                            spine_toc = Self::parse_spine_toc(e)?;
                        }
                        "item" if current_section == "manifest" => {
                            Self::parse_manifest_item(e, &mut manifest)?;
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    match local_name_bytes.as_ref() {
                        b"manifest" | b"spine" => {
                            current_section.clear();
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !found_package {
            return Err(EpubError::PackageParseError(
                "没有找到package根元素".to_string(),
            ));
        }

        Ok(Package {
            version,
            manifest,
            spine_toc,
        })
    }

    /// 解析package元素的version属性
    fn parse_version_attribute(e: &quick_xml::events::BytesStart) -> Result<String> {
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"version" {
                return Ok(String::from_utf8_lossy(&attr.value).to_string());
            }
        }
        // version缺失按未知版本处理，由调用方决定目录是否可用
        Ok(String::new())
    }

    /// 解析spine元素的toc属性
    fn parse_spine_toc(e: &quick_xml::events::BytesStart) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"toc" {
                return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
            }
        }
        Ok(None)
    }

    /// 解析manifest中的item元素
    fn parse_manifest_item(
        e: &quick_xml::events::BytesStart,
        manifest: &mut Vec<ManifestItem>,
    ) -> Result<()> {
        let mut id = String::new();
        let mut href = String::new();
        let mut media_type = String::new();
        let mut properties = None;

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    id = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"href" => {
                    href = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"media-type" => {
                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"properties" => {
                    properties = Some(String::from_utf8_lossy(&attr.value).to_string());
                }
                _ => {}
            }
        }

        if !href.is_empty() {
            manifest.push(ManifestItem {
                id,
                href,
                media_type,
                properties,
            });
        }

        Ok(())
    }

    /// 获取完整的版本号字符串
    pub fn version(&self) -> &str {
        &self.version
    }

    /// 获取主版本号（版本号中第一个`.`之前的部分）
    ///
    /// # 返回值
    /// * `&str` - 如`"3.0"`返回`"3"`；version缺失时为空字符串
    pub fn major_version(&self) -> &str {
        self.version.split('.').next().unwrap_or_default()
    }

    /// 获取manifest清单项列表
    pub fn manifest(&self) -> &[ManifestItem] {
        &self.manifest
    }

    /// 获取EPUB 3导航文档的href
    ///
    /// 即manifest中properties包含`nav` token的清单项。
    ///
    /// # 返回值
    /// * `Option<&str>` - 导航文档相对于package文档目录的引用
    pub fn nav_href(&self) -> Option<&str> {
        self.manifest
            .iter()
            .find(|item| item.has_property("nav"))
            .map(|item| item.href.as_str())
    }

    /// 获取EPUB 2传统NCX目录的href
    ///
    /// 优先使用spine的toc属性引用的清单项；没有该属性时退回
    /// manifest中第一个NCX media-type的清单项。
    ///
    /// # 返回值
    /// * `Option<&str>` - NCX文档相对于package文档目录的引用
    pub fn toc_href(&self) -> Option<&str> {
        if let Some(toc_id) = self.spine_toc.as_deref() {
            if let Some(item) = self.manifest.iter().find(|item| item.id == toc_id) {
                return Some(&item.href);
            }
        }

        self.manifest
            .iter()
            .find(|item| item.media_type == NCX_MEDIA_TYPE)
            .map(|item| item.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epub3_package() {
        let opf_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>测试书籍</dc:title>
    </metadata>
    <manifest>
        <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
        <item id="chapter1" href="text/chapter1.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine>
        <itemref idref="chapter1"/>
    </spine>
</package>"#;

        let package = Package::parse_xml(opf_xml).unwrap();
        assert_eq!(package.version(), "3.0");
        assert_eq!(package.major_version(), "3");
        assert_eq!(package.nav_href(), Some("nav.xhtml"));
        assert_eq!(package.manifest().len(), 2);
    }

    #[test]
    fn test_parse_epub2_package_with_spine_toc() {
        let opf_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf">
    <manifest>
        <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
        <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine toc="ncx">
        <itemref idref="chapter1"/>
    </spine>
</package>"#;

        let package = Package::parse_xml(opf_xml).unwrap();
        assert_eq!(package.major_version(), "2");
        assert_eq!(package.toc_href(), Some("toc.ncx"));
        assert_eq!(package.nav_href(), None);
    }

    #[test]
    fn test_toc_href_falls_back_to_ncx_media_type() {
        // spine没有toc属性时按media-type查找NCX
        let opf_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf">
    <manifest>
        <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
        <item id="ncx" href="legacy/toc.ncx" media-type="application/x-dtbncx+xml"/>
    </manifest>
    <spine>
        <itemref idref="chapter1"/>
    </spine>
</package>"#;

        let package = Package::parse_xml(opf_xml).unwrap();
        assert_eq!(package.toc_href(), Some("legacy/toc.ncx"));
    }

    #[test]
    fn test_package_without_toc_references() {
        let opf_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf">
    <manifest>
        <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine>
        <itemref idref="chapter1"/>
    </spine>
</package>"#;

        // 两种目录引用都缺失不是解析错误
        let package = Package::parse_xml(opf_xml).unwrap();
        assert_eq!(package.nav_href(), None);
        assert_eq!(package.toc_href(), None);
    }

    #[test]
    fn test_parse_without_package_element() {
        let result = Package::parse_xml("<html><body>不是OPF</body></html>");
        assert!(matches!(result, Err(EpubError::PackageParseError(_))));
    }

    #[test]
    fn test_major_version_of_unusual_version() {
        let opf_xml = r#"<package version="1.2" xmlns="http://www.idpf.org/2007/opf">
    <manifest/>
    <spine/>
</package>"#;

        let package = Package::parse_xml(opf_xml).unwrap();
        assert_eq!(package.major_version(), "1");
    }
}
