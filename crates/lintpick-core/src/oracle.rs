//! 文件分类与语言识别（启发式实现）
//!
//! `LanguageOracle` 是扫描器依赖的外部能力；`HeuristicOracle` 是内置实现：
//! - 路径类：vendor / dotfile / documentation / configuration / generated，基于正则集合；
//! - 内容类：生成文件头部标记（Aho-Corasick）与压缩文件（平均行长）；
//! - 语言：扩展名表 → 精确文件名表 → shebang 解释器，二进制内容一律视为未知。

use regex::{Regex, RegexSet};

use crate::markers::{MarkerSet, GENERATED_HEADERS, GENERATED_HEADER_WINDOW};
use crate::sample::is_probably_binary;
use crate::types::{LanguageKind, PathTraits};

/// 文件分类能力（可替换）
pub trait LanguageOracle {
    /// 按相对路径（目录以 `/` 结尾）与可选内容样本判定路径特征
    fn classify(&self, rel_path: &str, content: Option<&[u8]>) -> PathTraits;
    /// 由文件名与内容样本识别语言；无法识别返回 None
    fn detect_language(&self, filename: &str, content: &[u8]) -> Option<String>;
    /// 语言类型
    fn language_kind(&self, language: &str) -> LanguageKind;
}

const VENDOR_PATTERNS: &[&str] = &[
    r"(^|/)cache/",
    r"^[Dd]ependencies/",
    r"(^|/)dist/",
    r"^deps/",
    r"(^|/)configure$",
    r"(^|/)config\.(guess|sub)$",
    r"(^|/)node_modules/",
    r"(^|/)bower_components/",
    r"(^|/)[Vv]endor/",
    r"(^|/)(third|3rd)[-_]?party/",
    r"(^|/)extern(al)?/",
    r"(^|/)Pods/",
    r"(^|/)Carthage/",
    r"(^|/)Godeps/_workspace/",
    r"(^|/)\.?venv/",
    r"(^|/)site-packages/",
    r"^[Pp]ackages/.+\.\d+/",
    r"\.min\.(js|css)$",
    r"(^|/)jquery([^.]*)\.js$",
    r"(^|/)bootstrap([^/.]*)(\.min)?\.(js|css)$",
    r"(^|/)gradlew(\.bat)?$",
    r"(^|/)mvnw(\.cmd)?$",
    r"(^|/)\.mvn/wrapper/",
];

const DOCUMENTATION_PATTERNS: &[&str] = &[
    r"^[Dd]ocs?/",
    r"(^|/)[Dd]ocumentation/",
    r"(^|/)[Gg]roovydoc/",
    r"(^|/)[Jj]avadoc/",
    r"^[Mm]an/",
    r"^[Ee]xamples/",
    r"^[Dd]emos?/",
    r"^[Ss]amples?/",
    r"(^|/)CITATION(\.cff|S)?(\.(bib|md))?$",
    r"(^|/)CHANGE(S|LOG)?(\.|$)",
    r"(^|/)CONTRIBUTING(\.|$)",
    r"(^|/)COPYING(\.|$)",
    r"(^|/)INSTALL(\.|$)",
    r"(^|/)LICEN[CS]E(\.|$)",
    r"(^|/)[Ll]icen[cs]e(\.|$)",
    r"(^|/)README(\.|$)",
    r"(^|/)[Rr]eadme(\.|$)",
];

const GENERATED_PATH_PATTERNS: &[&str] = &[
    r"\.(nib|xcworkspacedata|xcuserstate)$",
    r"_pb2(_grpc)?\.py$",
    r"\.pb\.(go|cc|h)$",
    r"_pb\.js$",
    r"\.pb\.gw\.go$",
    r"(^|/)[^/]+\.[Dd]esigner\.(cs|vb)$",
    r"\.g\.(i\.)?cs$",
    r"(^|/)package-lock\.json$",
    r"(^|/)yarn\.lock$",
    r"(^|/)composer\.lock$",
    r"(^|/)Cargo\.lock$",
    r"\.(js|css)\.map$",
    r"(^|/)__generated__/",
];

/// 扩展名（小写，不含点）→ 语言
const EXTENSIONS: &[(&str, &str)] = &[
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("py", "Python"),
    ("pyw", "Python"),
    ("pyi", "Python"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("mts", "TypeScript"),
    ("cts", "TypeScript"),
    ("go", "Go"),
    ("php", "PHP"),
    ("cs", "C#"),
    ("fs", "F#"),
    ("fsi", "F#"),
    ("fsx", "F#"),
    ("vb", "Visual Basic .NET"),
    ("rs", "Rust"),
    ("rb", "Ruby"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("hh", "C++"),
    ("m", "Objective-C"),
    ("swift", "Swift"),
    ("scala", "Scala"),
    ("groovy", "Groovy"),
    ("gradle", "Gradle"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("ps1", "PowerShell"),
    ("lua", "Lua"),
    ("pl", "Perl"),
    ("pm", "Perl"),
    ("r", "R"),
    ("dart", "Dart"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("hs", "Haskell"),
    ("clj", "Clojure"),
    ("vue", "Vue"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("less", "Less"),
    ("md", "Markdown"),
    ("markdown", "Markdown"),
    ("rst", "reStructuredText"),
    ("txt", "Text"),
    ("xml", "XML"),
    ("csproj", "XML"),
    ("json", "JSON"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("toml", "TOML"),
    ("ini", "INI"),
    ("cfg", "INI"),
    ("properties", "Java Properties"),
    ("csv", "CSV"),
    ("svg", "SVG"),
    ("sql", "SQL"),
];

/// 精确文件名 → 语言
const FILENAMES: &[(&str, &str)] = &[
    ("Makefile", "Makefile"),
    ("GNUmakefile", "Makefile"),
    ("Dockerfile", "Dockerfile"),
    ("Rakefile", "Ruby"),
    ("Gemfile", "Ruby"),
    ("Jenkinsfile", "Groovy"),
    ("CMakeLists.txt", "CMake"),
    ("BUILD.bazel", "Starlark"),
];

/// shebang 解释器前缀 → 语言
const INTERPRETERS: &[(&str, &str)] = &[
    ("python", "Python"),
    ("node", "JavaScript"),
    ("bash", "Shell"),
    ("sh", "Shell"),
    ("zsh", "Shell"),
    ("ruby", "Ruby"),
    ("perl", "Perl"),
    ("php", "PHP"),
];

const CONFIGURATION_LANGUAGES: &[&str] = &["INI", "JSON", "TOML", "XML", "YAML", "Java Properties"];

/// 压缩文件判定阈值：平均行长超过该值视为生成文件
const MINIFIED_AVG_LINE: usize = 110;

/// 内置启发式实现
pub struct HeuristicOracle {
    vendor: RegexSet,
    documentation: RegexSet,
    generated_paths: RegexSet,
    dotfile: Regex,
    generated_headers: MarkerSet,
}

impl Default for HeuristicOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicOracle {
    pub fn new() -> Self {
        Self {
            vendor: RegexSet::new(VENDOR_PATTERNS).expect("vendor patterns"),
            documentation: RegexSet::new(DOCUMENTATION_PATTERNS).expect("documentation patterns"),
            generated_paths: RegexSet::new(GENERATED_PATH_PATTERNS).expect("generated patterns"),
            dotfile: Regex::new(r"(^|/)\.([^/.]|\.[^/.])").expect("dotfile pattern"),
            generated_headers: MarkerSet::build(GENERATED_HEADERS),
        }
    }

    fn is_configuration(&self, rel_path: &str) -> bool {
        if rel_path.ends_with('/') {
            return false;
        }
        match language_by_path(rel_path) {
            Some(lang) => CONFIGURATION_LANGUAGES.contains(&lang),
            None => false,
        }
    }

    fn is_generated_content(&self, rel_path: &str, content: &[u8]) -> bool {
        let head = &content[..content.len().min(GENERATED_HEADER_WINDOW)];
        if self.generated_headers.is_match(head) {
            return true;
        }
        let ext = extension(base_name(rel_path));
        matches!(ext.as_deref(), Some("js") | Some("css")) && is_minified(content)
    }
}

impl LanguageOracle for HeuristicOracle {
    fn classify(&self, rel_path: &str, content: Option<&[u8]>) -> PathTraits {
        let mut generated = self.generated_paths.is_match(rel_path);
        if !generated {
            if let Some(content) = content {
                generated = self.is_generated_content(rel_path, content);
            }
        }
        PathTraits {
            vendor: self.vendor.is_match(rel_path),
            dotfile: self.dotfile.is_match(rel_path),
            documentation: self.documentation.is_match(rel_path),
            configuration: self.is_configuration(rel_path),
            generated,
        }
    }

    fn detect_language(&self, filename: &str, content: &[u8]) -> Option<String> {
        if is_probably_binary(content) {
            return None;
        }
        language_by_path(filename)
            .or_else(|| language_by_shebang(content))
            .map(str::to_string)
    }

    fn language_kind(&self, language: &str) -> LanguageKind {
        match language {
            "HTML" | "CSS" | "SCSS" | "Less" | "Vue" => LanguageKind::Markup,
            "XML" | "JSON" | "YAML" | "TOML" | "INI" | "Java Properties" | "CSV" | "SVG" | "SQL" | "Gradle" => {
                LanguageKind::Data
            }
            "Markdown" | "reStructuredText" | "Text" => LanguageKind::Prose,
            l if EXTENSIONS.iter().any(|(_, lang)| *lang == l)
                || FILENAMES.iter().any(|(_, lang)| *lang == l) =>
            {
                LanguageKind::Programming
            }
            _ => LanguageKind::Unknown,
        }
    }
}

fn base_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn language_by_path(path: &str) -> Option<&'static str> {
    let name = base_name(path);
    if let Some((_, lang)) = FILENAMES.iter().find(|(f, _)| *f == name) {
        return Some(lang);
    }
    let ext = extension(name)?;
    EXTENSIONS.iter().find(|(e, _)| *e == ext).map(|(_, lang)| *lang)
}

/// `#!/usr/bin/env python3` / `#!/bin/sh` → 解释器名 → 语言
fn language_by_shebang(content: &[u8]) -> Option<&'static str> {
    let first = content.split(|&b| b == b'\n').next()?;
    let line = std::str::from_utf8(first).ok()?.trim();
    let rest = line.strip_prefix("#!")?;
    let mut parts = rest.split_whitespace();
    let mut prog = base_name(parts.next()?);
    if prog == "env" {
        prog = parts.find(|p| !p.starts_with('-'))?;
    }
    INTERPRETERS
        .iter()
        .find(|(name, _)| prog == *name || (prog.starts_with(name) && prog[name.len()..].chars().all(|c| c.is_ascii_digit() || c == '.')))
        .map(|(_, lang)| *lang)
}

fn is_minified(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }
    let lines = content.split(|&b| b == b'\n').filter(|l| !l.is_empty()).count().max(1);
    content.len() / lines > MINIFIED_AVG_LINE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_and_docs_by_path() {
        let o = HeuristicOracle::new();
        assert!(o.classify("node_modules/", None).vendor);
        assert!(o.classify("src/vendor/lib.go", None).vendor);
        assert!(o.classify("static/app.min.js", None).vendor);
        assert!(o.classify("docs/", None).documentation);
        assert!(o.classify("README.md", None).documentation);
        assert!(!o.classify("src/main.go", None).vendor);
    }

    #[test]
    fn dotfiles_but_not_relative_segments() {
        let o = HeuristicOracle::new();
        assert!(o.classify(".github/", None).dotfile);
        assert!(o.classify("src/.env", None).dotfile);
        assert!(!o.classify("src/main.rs", None).dotfile);
    }

    #[test]
    fn configuration_languages() {
        let o = HeuristicOracle::new();
        assert!(o.classify("config/app.yaml", None).configuration);
        assert!(o.classify("package.json", None).configuration);
        assert!(!o.classify("src/App.java", None).configuration);
        assert!(!o.classify("json/", None).configuration);
    }

    #[test]
    fn generated_by_path_and_content() {
        let o = HeuristicOracle::new();
        assert!(o.classify("api/service.pb.go", None).generated);
        assert!(!o.classify("api/service.go", None).generated);
        let header = b"// Code generated by mockgen. DO NOT EDIT.\npackage api\n";
        assert!(o.classify("api/mock.go", Some(header)).generated);
        let minified = format!("var a={};\n", "x".repeat(500));
        assert!(o.classify("web/app.js", Some(minified.as_bytes())).generated);
        assert!(!o.classify("web/app.py", Some(minified.as_bytes())).generated);
    }

    #[test]
    fn language_by_extension_filename_and_shebang() {
        let o = HeuristicOracle::new();
        assert_eq!(o.detect_language("Main.java", b"class Main {}"), Some("Java".into()));
        assert_eq!(o.detect_language("Program.CS", b"class P {}"), Some("C#".into()));
        assert_eq!(o.detect_language("Dockerfile", b"FROM scratch"), Some("Dockerfile".into()));
        assert_eq!(o.detect_language("run", b"#!/usr/bin/env python3\nprint()"), Some("Python".into()));
        assert_eq!(o.detect_language("build", b"#!/bin/bash\necho"), Some("Shell".into()));
        assert_eq!(o.detect_language("build.gradle", b"plugins { id 'java' }"), Some("Gradle".into()));
        assert_eq!(o.detect_language("LICENSE", b"MIT"), None);
        assert_eq!(o.detect_language("blob.go", b"\x00\x01\x02"), None);
    }

    #[test]
    fn language_kinds() {
        let o = HeuristicOracle::new();
        assert_eq!(o.language_kind("Go"), LanguageKind::Programming);
        assert_eq!(o.language_kind("Visual Basic .NET"), LanguageKind::Programming);
        assert_eq!(o.language_kind("Markdown"), LanguageKind::Prose);
        assert_eq!(o.language_kind("HTML"), LanguageKind::Markup);
        assert_eq!(o.language_kind("JSON"), LanguageKind::Data);
        assert_eq!(o.language_kind("Gradle"), LanguageKind::Data);
        assert_eq!(o.language_kind("Brainfuck"), LanguageKind::Unknown);
    }
}
