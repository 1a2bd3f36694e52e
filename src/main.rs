use bookprobe::{Document, Result, TocEntry};
use clap::Parser;

/// 📚 BookProbe - EPUB结构元数据查看工具
#[derive(Parser)]
#[command(name = "bookprobe")]
#[command(about = "一个用于查看EPUB结构元数据的Rust工具")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要查看的EPUB文件路径")]
    epub_file: String,

    /// 详细输出模式
    #[arg(short, long, help = "列出压缩包中的所有条目")]
    verbose: bool,

    /// 显示package文档信息
    #[arg(short, long, help = "显示package文档的版本和目录引用")]
    package: bool,

    /// 显示目录
    #[arg(short, long, help = "显示目录树结构")]
    toc: bool,
}

fn main() {
    let args = Args::parse();

    println!("📚 BookProbe - EPUB结构元数据查看工具");
    println!("正在检查EPUB文件: {}", args.epub_file);

    match probe_epub(&args.epub_file, args.verbose, args.package, args.toc) {
        Ok(_) => println!("\n🎉 EPUB文件检查完成！"),
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            std::process::exit(1);
        }
    }
}

fn probe_epub(path: &str, verbose: bool, show_package: bool, show_toc: bool) -> Result<()> {
    // 创建Document实例，构造时校验zip结构
    let mut doc = Document::from_path(path)?;

    if verbose {
        println!("\n📁 压缩包条目:");
        let names = doc.archive().entry_names()?;
        for (i, name) in names.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }

    println!("\n📄 container信息:");
    println!("  rootfile路径: {}", doc.rootfile_path()?);
    let rootfile_dir = doc.rootfile_dir()?;
    if rootfile_dir.is_empty() {
        println!("  rootfile位于压缩包根目录");
    } else {
        println!("  rootfile目录: {}", rootfile_dir);
    }

    if show_package {
        println!("\n📦 package信息:");
        let package = doc.package()?;
        println!("  版本: {} (主版本: {})", package.version(), package.major_version());
        match package.nav_href() {
            Some(href) => println!("  导航文档: {}", href),
            None => println!("  导航文档: 无"),
        }
        match package.toc_href() {
            Some(href) => println!("  NCX目录: {}", href),
            None => println!("  NCX目录: 无"),
        }
        println!("  manifest条目数: {}", package.manifest().len());
    }

    if show_toc {
        println!("\n🌳 目录:");
        match doc.toc()? {
            Some(toc) => {
                if let Some(ref title) = toc.title {
                    println!("  标题: {}", title);
                }
                print_entries(&toc.entries, 1);
                println!("  共 {} 个条目", toc.len());
            }
            None => println!("  该出版物没有目录元数据"),
        }
    }

    Ok(())
}

/// 按缩进层级打印目录条目
fn print_entries(entries: &[TocEntry], depth: usize) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        if entry.href.is_empty() {
            println!("{}- {}", indent, entry.label);
        } else {
            println!("{}- {} ({})", indent, entry.label, entry.href);
        }
        print_entries(&entry.children, depth + 1);
    }
}
