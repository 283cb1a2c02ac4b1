//! 语言计数排名（内部使用，亦对外暴露）
use std::collections::HashMap;

/// 将语言计数稳定排序为名称序列：次数降序 → 名称字典序升序
/// 与 HashMap 的迭代顺序无关，两次扫描结果逐项一致。
pub fn rank_languages(counts: &HashMap<String, usize>) -> Vec<String> {
    let mut entries: Vec<(&String, &usize)> = counts.iter().collect();
    entries.sort_by(|a, b| {
        use std::cmp::Ordering;
        match b.1.cmp(a.1) {
            Ordering::Equal => a.0.cmp(b.0),
            o => o,
        }
    });
    entries.into_iter().map(|(lang, _)| lang.clone()).collect()
}

/// 追加尚未出现的名称，保留各自的首次出现顺序
pub(crate) fn append_unique(target: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    for lang in extra {
        if !target.contains(&lang) {
            target.push(lang);
        }
    }
}
