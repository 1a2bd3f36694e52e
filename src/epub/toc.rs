//! 目录文档解析模块
//!
//! EPUB的目录有两种载体：EPUB 2的NCX（XML）和EPUB 3的XHTML导航
//! 文档。两者解析为同一种`TableOfContents`结构，调用方不需要
//! 关心来源格式。

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use scraper::{ElementRef, Html, Selector};

use crate::epub::error::{EpubError, Result};

static NAV_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("nav").unwrap());
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

/// 目录中的一个条目
#[derive(Debug, Clone)]
pub struct TocEntry {
    /// 条目的显示文本
    pub label: String,
    /// 条目指向的文档引用（相对于目录文档所在目录）
    pub href: String,
    /// 嵌套的子条目
    pub children: Vec<TocEntry>,
}

/// 目录文档的解析结果
#[derive(Debug, Clone)]
pub struct TableOfContents {
    /// 目录标题（NCX的docTitle或导航文档的标题元素）
    pub title: Option<String>,
    /// 顶层目录条目
    pub entries: Vec<TocEntry>,
}

/// 目录文档的两种载体格式
enum TocFormat {
    Ncx,
    Nav,
}

impl TableOfContents {
    /// 解析目录文档内容
    ///
    /// 按根元素自动识别格式：`<ncx>`按NCX解析，`<html>`按XHTML
    /// 导航文档解析，其他根元素返回`TocParseError`。
    ///
    /// # 参数
    /// * `content` - 目录文档的文本内容
    ///
    /// # 返回值
    /// * `Result<TableOfContents>` - 解析后的目录信息
    pub fn parse(content: &str) -> Result<TableOfContents> {
        match Self::sniff_format(content)? {
            TocFormat::Ncx => Self::parse_ncx(content),
            TocFormat::Nav => Self::parse_nav(content),
        }
    }

    /// 识别目录文档的根元素
    fn sniff_format(content: &str) -> Result<TocFormat> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    return match e.local_name().as_ref() {
                        b"ncx" => Ok(TocFormat::Ncx),
                        b"html" => Ok(TocFormat::Nav),
                        other => Err(EpubError::TocParseError(format!(
                            "无法识别的目录文档根元素: {}",
                            String::from_utf8_lossy(other)
                        ))),
                    };
                }
                Event::Eof => {
                    return Err(EpubError::TocParseError("目录文档为空".to_string()));
                }
                _ => {}
            }
            buf.clear();
        }
    }

    /// 解析NCX格式的目录文档
    fn parse_ncx(xml_content: &str) -> Result<TableOfContents> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut title = None;
        let mut roots: Vec<NcxPoint> = Vec::new();

        let mut buf = Vec::new();
        let mut point_stack: Vec<NcxPoint> = Vec::new();
        let mut current_point: Option<NcxPoint> = None;
        let mut in_nav_label = false;
        let mut in_doc_title = false;
        let mut text_content = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"docTitle" => {
                        in_doc_title = true;
                        text_content.clear();
                    }
                    b"navPoint" => {
                        // 嵌套的navPoint：未完成的父节点入栈
                        if let Some(point) = current_point.take() {
                            point_stack.push(point);
                        }
                        current_point = Some(NcxPoint {
                            play_order: Self::parse_play_order(e)?,
                            label: String::new(),
                            href: String::new(),
                            children: Vec::new(),
                        });
                    }
                    b"navLabel" => {
                        in_nav_label = true;
                        text_content.clear();
                    }
                    b"content" => {
                        if let Some(ref mut point) = current_point {
                            point.href = Self::parse_content_src(e)?;
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"docTitle" => {
                        let text = text_content.trim();
                        if !text.is_empty() {
                            title = Some(text.to_string());
                        }
                        in_doc_title = false;
                    }
                    b"navLabel" => {
                        if let Some(ref mut point) = current_point {
                            if point.label.is_empty() {
                                point.label = text_content.trim().to_string();
                            }
                        }
                        in_nav_label = false;
                    }
                    b"navPoint" => {
                        if let Some(point) = current_point.take() {
                            if let Some(mut parent) = point_stack.pop() {
                                parent.children.push(point);
                                current_point = Some(parent);
                            } else {
                                roots.push(point);
                            }
                        }
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if in_nav_label || in_doc_title {
                        text_content.push_str(&e.unescape()?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        roots.sort_by_key(|point| point.play_order.unwrap_or(u32::MAX));
        let entries = roots.into_iter().map(NcxPoint::into_entry).collect();

        Ok(TableOfContents { title, entries })
    }

    /// 解析navPoint元素的playOrder属性
    fn parse_play_order(e: &quick_xml::events::BytesStart) -> Result<Option<u32>> {
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"playOrder" {
                return Ok(String::from_utf8_lossy(&attr.value).parse().ok());
            }
        }
        Ok(None)
    }

    /// 解析content元素的src属性
    fn parse_content_src(e: &quick_xml::events::BytesStart) -> Result<String> {
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"src" {
                return Ok(String::from_utf8_lossy(&attr.value).to_string());
            }
        }
        Ok(String::new())
    }

    /// 解析XHTML导航文档
    ///
    /// 优先使用`epub:type="toc"`的nav元素，没有时退回文档中第一个
    /// nav元素。条目来自其中嵌套的ol/li/a结构。
    fn parse_nav(html_content: &str) -> Result<TableOfContents> {
        let document = Html::parse_document(html_content);

        let nav = document
            .select(&NAV_SELECTOR)
            .find(|nav| nav.value().attr("epub:type") == Some("toc"))
            .or_else(|| document.select(&NAV_SELECTOR).next())
            .ok_or_else(|| {
                EpubError::TocParseError("导航文档中没有nav元素".to_string())
            })?;

        let title = nav
            .select(&HEADING_SELECTOR)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty());

        let entries = match find_child_element(nav, "ol") {
            Some(list) => parse_nav_list(list),
            None => Vec::new(),
        };

        Ok(TableOfContents { title, entries })
    }

    /// 获取目录条目的平铺列表（深度优先）
    pub fn flatten(&self) -> Vec<&TocEntry> {
        fn walk<'a>(entries: &'a [TocEntry], result: &mut Vec<&'a TocEntry>) {
            for entry in entries {
                result.push(entry);
                walk(&entry.children, result);
            }
        }

        let mut result = Vec::new();
        walk(&self.entries, &mut result);
        result
    }

    /// 获取目录条目总数（含嵌套条目）
    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    /// 检查目录是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// NCX解析过程中的navPoint中间表示
struct NcxPoint {
    play_order: Option<u32>,
    label: String,
    href: String,
    children: Vec<NcxPoint>,
}

impl NcxPoint {
    /// 转换为目录条目，子条目按playOrder排序
    fn into_entry(mut self) -> TocEntry {
        self.children
            .sort_by_key(|child| child.play_order.unwrap_or(u32::MAX));
        TocEntry {
            label: self.label,
            href: self.href,
            children: self.children.into_iter().map(NcxPoint::into_entry).collect(),
        }
    }
}

/// 提取元素的纯文本内容（空白折叠为单个空格）
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 查找指定名称的直接子元素
fn find_child_element<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == name)
}

/// 解析导航文档中的一层ol列表
fn parse_nav_list(list: ElementRef) -> Vec<TocEntry> {
    let mut entries = Vec::new();

    for li in list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
    {
        let mut label = String::new();
        let mut href = String::new();
        let mut children = Vec::new();

        for child in li.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                // a是正常条目，span是无链接的分组标题
                "a" | "span" => {
                    if label.is_empty() {
                        label = element_text(child);
                        href = child.value().attr("href").unwrap_or("").to_string();
                    }
                }
                "ol" => {
                    children = parse_nav_list(child);
                }
                _ => {}
            }
        }

        if !label.is_empty() || !children.is_empty() {
            entries.push(TocEntry {
                label,
                href,
                children,
            });
        }
    }

    entries
}
