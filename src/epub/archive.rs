use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::epub::error::{EpubError, Result};
use crate::epub::path;

/// EPUB压缩包访问器
///
/// 构造时校验一次zip结构的有效性，之后每次读取都会临时重新打开
/// 压缩包，不在读取之间持有文件句柄。本层不缓存任何条目内容，
/// 缓存是上层解析管线的职责。
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    /// 打开压缩包并校验其有效性
    ///
    /// 要求路径存在且文件是结构上有效的zip容器（通过实际读取
    /// 中央目录校验，而不是检查扩展名）。该校验只在构造时执行一次。
    ///
    /// # 参数
    /// * `path` - 压缩包文件的路径
    ///
    /// # 返回值
    /// * `Result<Archive>` - 成功返回访问器，无效时返回`InvalidArchive`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Archive> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path)
            .map_err(|_| EpubError::InvalidArchive(path.display().to_string()))?;
        ZipArchive::new(file)
            .map_err(|_| EpubError::InvalidArchive(path.display().to_string()))?;

        Ok(Archive { path })
    }

    /// 获取压缩包文件的路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 临时重新打开压缩包
    fn open_zip(&self) -> Result<ZipArchive<File>> {
        let file = File::open(&self.path)?;
        Ok(ZipArchive::new(file)?)
    }

    /// 列出压缩包中所有条目的原始名称（按目录顺序）
    ///
    /// # 返回值
    /// * `Result<Vec<String>>` - 条目名称列表
    pub fn entry_names(&self) -> Result<Vec<String>> {
        let mut zip = self.open_zip()?;
        let mut names = Vec::new();

        for i in 0..zip.len() {
            let entry = zip.by_index(i)?;
            names.push(entry.name().to_string());
        }

        Ok(names)
    }

    /// 读取指定逻辑路径的条目并解码为UTF-8文本
    ///
    /// 条目名和查询路径使用同一套规则归一化后匹配，因此分隔符
    /// 风格或冗余路径段的差异不影响查找。归一化后同名的条目以
    /// 目录顺序中先出现者为准。
    ///
    /// # 参数
    /// * `logical_path` - 压缩包内部的逻辑路径
    ///
    /// # 返回值
    /// * `Result<String>` - 条目的文本内容；条目不存在返回
    ///   `MissingEntry`，字节不是有效UTF-8返回`InvalidEncoding`
    pub fn read_text(&self, logical_path: &str) -> Result<String> {
        let mut zip = self.open_zip()?;

        // 归一化名称 -> 原始条目名的映射，冲突时先出现者保留
        let mut lookup: HashMap<String, String> = HashMap::new();
        for i in 0..zip.len() {
            let name = zip.by_index(i)?.name().to_string();
            lookup.entry(path::normalize(&name)).or_insert(name);
        }

        let normalized = path::normalize(logical_path);
        let stored_name = match lookup.get(&normalized) {
            Some(name) => name.clone(),
            None => return Err(EpubError::MissingEntry(logical_path.to_string())),
        };

        let mut entry = zip.by_name(&stored_name)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;

        String::from_utf8(bytes).map_err(|_| EpubError::InvalidEncoding(stored_name))
    }
}
