//! 引擎目录与候选选择
//!
//! 目录是静态配置：语言 → 有序候选（免费引擎在前，付费/完整引擎在后）。
//! 每个候选在构造时就确定了引擎族（`EngineFamily`），下游不再做字符串前缀判断。

use std::fmt;

/// 引擎镜像的发布版本
pub const RELEASE_VERSION: &str = "2023.2";
const REGISTRY: &str = "jetbrains";

/// 引擎代码（闭合集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCode {
    JvmCommunity,
    Jvm,
    Android,
    Php,
    Python,
    PythonCommunity,
    Js,
    Go,
    DotNet,
    DotNetCommunity,
}

pub const FREE_CODES: &[EngineCode] = &[EngineCode::JvmCommunity, EngineCode::PythonCommunity, EngineCode::Android];
pub const PAID_CODES: &[EngineCode] = &[
    EngineCode::Jvm,
    EngineCode::Php,
    EngineCode::Python,
    EngineCode::Js,
    EngineCode::Go,
    EngineCode::DotNet,
];

const ALL_CODES: &[EngineCode] = &[
    EngineCode::JvmCommunity,
    EngineCode::Jvm,
    EngineCode::Android,
    EngineCode::Php,
    EngineCode::Python,
    EngineCode::PythonCommunity,
    EngineCode::Js,
    EngineCode::Go,
    EngineCode::DotNet,
    EngineCode::DotNetCommunity,
];

impl EngineCode {
    pub fn code(&self) -> &'static str {
        match self {
            EngineCode::JvmCommunity => "QDJVMC",
            EngineCode::Jvm => "QDJVM",
            EngineCode::Android => "QDANDC",
            EngineCode::Php => "QDPHP",
            EngineCode::Python => "QDPY",
            EngineCode::PythonCommunity => "QDPYC",
            EngineCode::Js => "QDJS",
            EngineCode::Go => "QDGO",
            EngineCode::DotNet => "QDNET",
            EngineCode::DotNetCommunity => "QDNETC",
        }
    }

    pub fn image_name(&self) -> &'static str {
        match self {
            EngineCode::JvmCommunity => "qodana-jvm-community",
            EngineCode::Jvm => "qodana-jvm",
            EngineCode::Android => "qodana-jvm-android",
            EngineCode::Php => "qodana-php",
            EngineCode::Python => "qodana-python",
            EngineCode::PythonCommunity => "qodana-python-community",
            EngineCode::Js => "qodana-js",
            EngineCode::Go => "qodana-go",
            EngineCode::DotNet => "qodana-dotnet",
            EngineCode::DotNetCommunity => "qodana-cdnet",
        }
    }

    /// 代码 → 镜像名的固定变换
    pub fn image(&self) -> String {
        format!("{}/{}:{}", REGISTRY, self.image_name(), RELEASE_VERSION)
    }
}

/// 引擎族（选择时一次确定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    Jvm,
    Python,
    Js,
    Go,
    Php,
    DotNetStandalone,
    DotNetContainerFull,
    DotNetContainerCommunity,
}

impl EngineFamily {
    pub fn is_dotnet(&self) -> bool {
        matches!(
            self,
            EngineFamily::DotNetStandalone | EngineFamily::DotNetContainerFull | EngineFamily::DotNetContainerCommunity
        )
    }

    /// 基于 IDE 的 .NET 产品（社区版 .NET 引擎不是 IDE，不注入 .NET 属性）
    pub fn is_rider(&self) -> bool {
        matches!(self, EngineFamily::DotNetStandalone | EngineFamily::DotNetContainerFull)
    }

    /// 引擎进程读取参数文件路径的环境变量名
    pub fn vm_options_env(&self) -> &'static str {
        match self {
            EngineFamily::Jvm => "IDEA_VM_OPTIONS",
            EngineFamily::Python => "PYCHARM_VM_OPTIONS",
            EngineFamily::Js => "WEBIDE_VM_OPTIONS",
            EngineFamily::Go => "GOLAND_VM_OPTIONS",
            EngineFamily::Php => "PHPSTORM_VM_OPTIONS",
            EngineFamily::DotNetStandalone
            | EngineFamily::DotNetContainerFull
            | EngineFamily::DotNetContainerCommunity => "RIDER_VM_OPTIONS",
        }
    }
}

/// 候选引擎：代码 + 是否容器化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineCandidate {
    pub code: EngineCode,
    pub containerized: bool,
}

impl EngineCandidate {
    pub const fn image(code: EngineCode) -> Self {
        Self { code, containerized: true }
    }

    pub const fn native(code: EngineCode) -> Self {
        Self { code, containerized: false }
    }

    /// 非容器化候选为裸代码，容器化候选为镜像名
    pub fn identifier(&self) -> String {
        if self.containerized {
            self.code.image()
        } else {
            self.code.code().to_string()
        }
    }

    pub fn family(&self) -> EngineFamily {
        match self.code {
            EngineCode::JvmCommunity | EngineCode::Jvm | EngineCode::Android => EngineFamily::Jvm,
            EngineCode::Php => EngineFamily::Php,
            EngineCode::Python | EngineCode::PythonCommunity => EngineFamily::Python,
            EngineCode::Js => EngineFamily::Js,
            EngineCode::Go => EngineFamily::Go,
            EngineCode::DotNet if self.containerized => EngineFamily::DotNetContainerFull,
            EngineCode::DotNet => EngineFamily::DotNetStandalone,
            EngineCode::DotNetCommunity => EngineFamily::DotNetContainerCommunity,
        }
    }

    pub fn is_dotnet(&self) -> bool {
        self.family().is_dotnet()
    }

    pub fn is_native(&self) -> bool {
        !self.containerized
    }

    /// 由标识反查候选：裸代码（`QDNET`）或镜像名（可省略仓库前缀，忽略 tag）
    pub fn parse(identifier: &str) -> Option<Self> {
        let id = identifier.trim();
        if let Some(code) = ALL_CODES.iter().find(|c| c.code() == id) {
            return Some(Self::native(*code));
        }
        let without_tag = match id.rsplit_once(':') {
            Some((name, _tag)) if !name.is_empty() => name,
            _ => id,
        };
        let name = without_tag.rsplit('/').next().unwrap_or(without_tag);
        ALL_CODES.iter().find(|c| c.image_name() == name).map(|c| Self::image(*c))
    }
}

impl fmt::Display for EngineCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

const JVM_CANDIDATES: &[EngineCandidate] = &[
    EngineCandidate::image(EngineCode::JvmCommunity),
    EngineCandidate::image(EngineCode::Jvm),
    EngineCandidate::image(EngineCode::Android),
];
const PHP_CANDIDATES: &[EngineCandidate] = &[EngineCandidate::image(EngineCode::Php)];
const PYTHON_CANDIDATES: &[EngineCandidate] = &[
    EngineCandidate::image(EngineCode::PythonCommunity),
    EngineCandidate::image(EngineCode::Python),
];
const JS_CANDIDATES: &[EngineCandidate] = &[EngineCandidate::image(EngineCode::Js)];
const GO_CANDIDATES: &[EngineCandidate] = &[EngineCandidate::image(EngineCode::Go)];
const DOTNET_CANDIDATES: &[EngineCandidate] = &[
    EngineCandidate::native(EngineCode::DotNet),
    EngineCandidate::image(EngineCode::DotNet),
    EngineCandidate::image(EngineCode::DotNetCommunity),
];

/// 语言 → 候选列表；不支持的语言返回空
pub fn candidates_for(language: &str) -> &'static [EngineCandidate] {
    match language {
        "Java" | "Kotlin" => JVM_CANDIDATES,
        "PHP" => PHP_CANDIDATES,
        "Python" => PYTHON_CANDIDATES,
        "JavaScript" | "TypeScript" => JS_CANDIDATES,
        "Go" => GO_CANDIDATES,
        "C#" | "F#" | "Visual Basic .NET" => DOTNET_CANDIDATES,
        _ => &[],
    }
}

/// 按语言排名顺序拼接候选，全局去重（首次出现的位置胜出）
pub fn select_candidates(languages: &[String]) -> Vec<EngineCandidate> {
    let mut out: Vec<EngineCandidate> = Vec::new();
    for lang in languages {
        for candidate in candidates_for(lang) {
            if !out.contains(candidate) {
                out.push(*candidate);
            }
        }
    }
    out
}

/// 所有受支持的镜像：免费镜像在前，付费镜像在后
pub fn all_images() -> Vec<String> {
    FREE_CODES.iter().chain(PAID_CODES.iter()).map(|c| c.image()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ids(candidates: &[EngineCandidate]) -> Vec<String> {
        candidates.iter().map(|c| c.identifier()).collect()
    }

    #[test]
    fn kotlin_adds_nothing_after_java() {
        let selected = select_candidates(&langs(&["Java", "Kotlin", "Go"]));
        assert_eq!(
            ids(&selected),
            vec![
                "jetbrains/qodana-jvm-community:2023.2",
                "jetbrains/qodana-jvm:2023.2",
                "jetbrains/qodana-jvm-android:2023.2",
                "jetbrains/qodana-go:2023.2",
            ]
        );
    }

    #[test]
    fn unknown_languages_yield_nothing() {
        assert!(select_candidates(&langs(&["Rust", "Haskell"])).is_empty());
        assert_eq!(select_candidates(&langs(&["Rust", "PHP"])).len(), 1);
    }

    #[test]
    fn dotnet_family_tagging() {
        let selected = select_candidates(&langs(&["C#", "F#", "Visual Basic .NET"]));
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].identifier(), "QDNET");
        assert!(selected[0].is_native());
        assert_eq!(selected[0].family(), EngineFamily::DotNetStandalone);
        assert_eq!(selected[1].family(), EngineFamily::DotNetContainerFull);
        assert_eq!(selected[2].family(), EngineFamily::DotNetContainerCommunity);
        assert!(selected.iter().all(|c| c.is_dotnet()));
        assert!(selected[1].family().is_rider());
        assert!(!selected[2].family().is_rider());
    }

    #[test]
    fn catalog_lists_free_images_first() {
        let images = all_images();
        assert_eq!(images.len(), FREE_CODES.len() + PAID_CODES.len());
        assert_eq!(images[0], "jetbrains/qodana-jvm-community:2023.2");
        assert_eq!(images[3], "jetbrains/qodana-jvm:2023.2");
        assert!(FREE_CODES.iter().all(|c| !PAID_CODES.contains(c)));
    }

    #[test]
    fn parse_round_trips_catalog_identifiers() {
        for code in ALL_CODES {
            let image = EngineCandidate::image(*code);
            assert_eq!(EngineCandidate::parse(&image.identifier()), Some(image));
            let native = EngineCandidate::native(*code);
            assert_eq!(EngineCandidate::parse(&native.identifier()), Some(native));
        }
        assert_eq!(
            EngineCandidate::parse("qodana-dotnet:2024.1-eap").map(|c| c.family()),
            Some(EngineFamily::DotNetContainerFull)
        );
        assert_eq!(EngineCandidate::parse("eslint"), None);
    }

    #[test]
    fn vm_options_env_per_family() {
        assert_eq!(EngineFamily::Jvm.vm_options_env(), "IDEA_VM_OPTIONS");
        assert_eq!(EngineFamily::DotNetStandalone.vm_options_env(), "RIDER_VM_OPTIONS");
    }
}
