//! 字面量标记集合（Aho-Corasick）
//!
//! 用于两处：
//! - 生成文件的头部注释标记（只在内容前缀上匹配）；
//! - IDE 模块描述文件（.iml）中的语言标记。

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

/// 一组字面量标记，每个标记对应一个标签
pub(crate) struct MarkerSet {
    ac: AhoCorasick,
    labels: Vec<&'static str>,
}

impl MarkerSet {
    /// 从 (字面量, 标签) 列表构建；标签顺序即 `labels_in` 的输出顺序
    pub(crate) fn build(entries: &[(&'static str, &'static str)]) -> Self {
        let patterns: Vec<&str> = entries.iter().map(|(p, _)| *p).collect();
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .expect("build aho-corasick");
        Self { ac, labels: entries.iter().map(|(_, l)| *l).collect() }
    }

    pub(crate) fn is_match(&self, haystack: &[u8]) -> bool {
        self.ac.is_match(haystack)
    }

    /// 返回命中的标签（按构建顺序，去重）
    pub(crate) fn labels_in(&self, haystack: &[u8]) -> Vec<&'static str> {
        let mut hit = vec![false; self.labels.len()];
        for m in self.ac.find_iter(haystack) {
            hit[m.pattern().as_usize()] = true;
        }
        let mut out: Vec<&'static str> = Vec::new();
        for (i, label) in self.labels.iter().enumerate() {
            if hit[i] && !out.contains(label) {
                out.push(label);
            }
        }
        out
    }
}

/// 生成文件头部标记
pub(crate) const GENERATED_HEADERS: &[(&str, &str)] = &[
    ("Code generated by", "go-generate"),
    ("DO NOT EDIT", "do-not-edit"),
    ("<auto-generated", "dotnet"),
    ("@generated", "generated-tag"),
    ("Generated by the protocol buffer compiler", "protoc"),
    ("This file was automatically generated", "auto"),
    ("Autogenerated by Thrift", "thrift"),
];

/// 生成标记只看文件最前面的这段内容
pub(crate) const GENERATED_HEADER_WINDOW: usize = 2048;

/// IDE 模块描述文件中的语言标记
pub(crate) const IML_MARKERS: &[(&str, &str)] = &[
    ("JAVA_MODULE", "Java"),
    ("PYTHON_MODULE", "Python"),
    ("\"Go\"", "Go"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_header_found_in_prefix() {
        let set = MarkerSet::build(GENERATED_HEADERS);
        assert!(set.is_match(b"// Code generated by protoc-gen-go. DO NOT EDIT.\npackage x"));
        assert!(!set.is_match(b"package main\n\nfunc main() {}\n"));
    }

    #[test]
    fn iml_labels_follow_marker_order() {
        let set = MarkerSet::build(IML_MARKERS);
        let text = br#"<module type="PYTHON_MODULE"><component name="Go" enabled="true"/></module>"#;
        assert_eq!(set.labels_in(text), vec!["Python", "Go"]);
        let java = br#"<module type="JAVA_MODULE" version="4"/>"#;
        assert_eq!(set.labels_in(java), vec!["Java"]);
    }

    #[test]
    fn repeated_markers_reported_once() {
        let set = MarkerSet::build(IML_MARKERS);
        let text = br#"JAVA_MODULE PYTHON_MODULE JAVA_MODULE"#;
        assert_eq!(set.labels_in(text), vec!["Java", "Python"]);
    }
}
