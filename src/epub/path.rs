//! 压缩包内部虚拟路径处理模块
//!
//! Zip条目名不是宿主文件系统路径：不同的制作工具可能混用`/`和`\`，
//! 也可能带有`.`、`..`或重复的分隔符。这里提供一套独立于
//! `std::path`的归一化规则，保证跨平台匹配结果一致。

/// 归一化压缩包内部路径
///
/// 规则：同时按`/`和`\`切分，丢弃空段和`.`段，`..`段弹出前一个
/// 普通段（无可弹出时保留，与`os.path.normpath`的行为对齐），
/// 最后用`/`重新拼接。
///
/// # 参数
/// * `path` - 压缩包内部的原始路径
///
/// # 返回值
/// * `String` - 归一化后的路径
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), None | Some(&"..")) {
                    segments.push("..");
                } else {
                    segments.pop();
                }
            }
            _ => segments.push(segment),
        }
    }

    segments.join("/")
}

/// 把相对引用拼接到基准目录上
///
/// 空的基准目录表示压缩包根目录，此时直接归一化`href`本身。
///
/// # 参数
/// * `base` - 基准目录（归一化形式，可为空字符串）
/// * `href` - 相对于基准目录的引用
///
/// # 返回值
/// * `String` - 归一化后的完整路径
pub fn join(base: &str, href: &str) -> String {
    if base.is_empty() {
        normalize(href)
    } else {
        normalize(&format!("{}/{}", base, href))
    }
}

/// 取路径的目录部分
///
/// 根目录下的文件没有目录部分，返回空字符串。
///
/// # 参数
/// * `path` - 压缩包内部路径
///
/// # 返回值
/// * `String` - 归一化后的目录部分
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(index) => normalized[..index].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_path() {
        assert_eq!(normalize("OEBPS/content.opf"), "OEBPS/content.opf");
        assert_eq!(normalize("META-INF/container.xml"), "META-INF/container.xml");
    }

    #[test]
    fn test_normalize_separator_styles() {
        // 不同制作工具的分隔符风格必须归一化为同一结果
        assert_eq!(normalize("a\\b\\c.xml"), "a/b/c.xml");
        assert_eq!(normalize("./a/b/c.xml"), "a/b/c.xml");
        assert_eq!(normalize("a//b/c.xml"), "a/b/c.xml");
        assert_eq!(normalize("a/b\\c.xml"), "a/b/c.xml");
    }

    #[test]
    fn test_normalize_dot_dot_segments() {
        assert_eq!(normalize("OEBPS/../OEBPS/nav.xhtml"), "OEBPS/nav.xhtml");
        assert_eq!(normalize("a/b/../../c.xml"), "c.xml");
        // 无可弹出的`..`保留，与os.path.normpath一致
        assert_eq!(normalize("../a.xml"), "../a.xml");
        assert_eq!(normalize("../../a.xml"), "../../a.xml");
    }

    #[test]
    fn test_join_with_base_dir() {
        assert_eq!(join("OEBPS", "nav.xhtml"), "OEBPS/nav.xhtml");
        assert_eq!(join("OEBPS", "toc.ncx"), "OEBPS/toc.ncx");
        assert_eq!(join("OEBPS", "../toc.ncx"), "toc.ncx");
        assert_eq!(join("OEBPS", "text\\nav.xhtml"), "OEBPS/text/nav.xhtml");
    }

    #[test]
    fn test_join_with_empty_base() {
        // 根目录下的rootfile：引用直接相对于压缩包根解析
        assert_eq!(join("", "toc.ncx"), "toc.ncx");
        assert_eq!(join("", "./toc.ncx"), "toc.ncx");
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("OEBPS/content.opf"), "OEBPS");
        assert_eq!(parent("a/b/c.xml"), "a/b");
        assert_eq!(parent("content.opf"), "");
        assert_eq!(parent("OEBPS\\content.opf"), "OEBPS");
    }
}
