//! 语言扫描主流程（单线程深度优先遍历）
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::idea::scan_idea_dir;
use crate::options::{DetectOptions, DetectStats};
use crate::oracle::{HeuristicOracle, LanguageOracle};
use crate::rank::{append_unique, rank_languages};
use crate::sample::read_prefix;
use crate::types::{FileVerdict, IgnoreReason, LanguageKind};

/// 一次扫描的结果
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// 排名后的语言（次数降序、名称升序），其后追加 .idea 补充语言
    pub languages: Vec<String>,
    pub counts: HashMap<String, usize>,
    pub stats: DetectStats,
}

/// 使用默认选项与内置启发式扫描项目，返回语言序列
pub fn detect(project_root: &Path) -> Result<Vec<String>> {
    let oracle = HeuristicOracle::new();
    Ok(detect_with(project_root, &DetectOptions::default(), &oracle)?.languages)
}

/// 扫描项目目录
/// 稳定性保证：
/// - 计数与遍历顺序无关，排名使用显式的次级排序键（名称）；
/// - .idea 补充语言按文件名顺序发现，只追加在排名列表之后。
/// 错误策略：根目录遍历失败返回 `Error::ScanRoot`；其余条目级错误跳过并计入 `unreadable`。
pub fn detect_with(project_root: &Path, opts: &DetectOptions, oracle: &dyn LanguageOracle) -> Result<Detection> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut stats = DetectStats::default();

    let mut it = WalkDir::new(project_root).follow_links(false).into_iter();
    while let Some(entry) = it.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(Error::ScanRoot { path: project_root.to_path_buf(), source: err });
            }
            Err(err) => {
                trace!(%err, "skipping unreadable entry");
                stats.unreadable += 1;
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let rel = match entry.path().strip_prefix(project_root) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let is_dir = entry.file_type().is_dir();

        if opts.is_in_ignored_dir(rel) {
            if is_dir { it.skip_current_dir(); } else { stats.files_ignored += 1; }
            continue;
        }

        let mut rel_str = slash_path(rel);
        if is_dir {
            rel_str.push('/');
            // 目录只做路径判定，命中则跳过整棵子树
            if oracle.classify(&rel_str, None).ignore_reason().is_some() {
                trace!(dir = %rel_str, "skipping directory");
                it.skip_current_dir();
            }
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        stats.files_seen += 1;
        match classify_entry(&rel_str, entry.path(), opts, oracle) {
            FileVerdict::Language(lang) => {
                stats.files_counted += 1;
                *counts.entry(lang).or_insert(0) += 1;
            }
            FileVerdict::Ignored(IgnoreReason::Unreadable) => stats.unreadable += 1,
            FileVerdict::Ignored(_) => stats.files_ignored += 1,
            FileVerdict::NotProgramming => {}
        }
    }

    let mut languages = rank_languages(&counts);
    if opts.read_idea {
        append_unique(&mut languages, scan_idea_dir(project_root, &mut stats));
    }

    debug!(?languages, ?stats, "language scan finished");
    Ok(Detection { languages, counts, stats })
}

/// 对单个文件给出分类结论（路径相对 `project_root`）
pub fn classify_file(project_root: &Path, path: &Path, opts: &DetectOptions, oracle: &dyn LanguageOracle) -> FileVerdict {
    let rel = path.strip_prefix(project_root).unwrap_or(path);
    if opts.is_in_ignored_dir(rel) {
        return FileVerdict::Ignored(IgnoreReason::ToolingDir);
    }
    classify_entry(&slash_path(rel), path, opts, oracle)
}

fn classify_entry(rel: &str, path: &Path, opts: &DetectOptions, oracle: &dyn LanguageOracle) -> FileVerdict {
    if let Some(reason) = oracle.classify(rel, None).ignore_reason() {
        return FileVerdict::Ignored(reason);
    }

    // 只读前缀，超大文件的读取成本固定
    let content = match read_prefix(path, opts.content_limit) {
        Ok(c) => c,
        Err(err) => {
            trace!(file = rel, %err, "cannot read file");
            return FileVerdict::Ignored(IgnoreReason::Unreadable);
        }
    };

    // 部分生成器只能从内容识别（头部注释等）
    if oracle.classify(rel, Some(&content)).generated {
        return FileVerdict::Ignored(IgnoreReason::Generated);
    }

    let name = rel.rsplit('/').next().unwrap_or(rel);
    match oracle.detect_language(name, &content) {
        Some(lang) if oracle.language_kind(&lang) == LanguageKind::Programming => FileVerdict::Language(lang),
        _ => FileVerdict::NotProgramming,
    }
}

/// 目录是否至少包含一个条目
pub fn has_files(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
