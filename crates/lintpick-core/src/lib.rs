//! 代码分析编排器的客户端决策层
//!
//! 设计要点：
//! - 语言扫描：单线程深度优先遍历，按文件启发式过滤后统计语言出现次数，排名确定（次数降序，同次数按名称字典序）。
//! - 引擎选择：静态表将语言映射到候选引擎，跨语言去重且保留首次出现的位置。
//! - 参数解析：默认值 < 项目配置 < 显式参数，逐键后写者胜；输出按字典序排序，逐字节可复现。
//! - 统计事件：单消费者通道 + 计数等待，保证落盘前所有事件均已入缓冲。

mod error;
mod options;
mod types;
mod oracle;
mod sample;
mod markers;
mod rank;
mod idea;
mod scan;
mod linters;
mod device;
mod config;
mod env;
mod properties;
mod statistics;
mod exit;

pub use error::{Error, Result};
pub use options::{DetectOptions, DetectStats, RunLayout, DEFAULT_CONTENT_LIMIT};
pub use types::{DotNetOptions, FileVerdict, IgnoreReason, LanguageKind, PathTraits};
pub use oracle::{HeuristicOracle, LanguageOracle};
pub use scan::{classify_file, detect, detect_with, has_files, Detection};
pub use idea::read_idea_dir;
pub use rank::rank_languages;
pub use linters::{
    all_images, candidates_for, select_candidates, EngineCandidate, EngineCode, EngineFamily,
    FREE_CODES, PAID_CODES, RELEASE_VERSION,
};
pub use device::DeviceIdentity;
pub use config::{load_project_config, ProjectConfig, PluginRef, CONFIG_FILE_NAMES};
pub use env::{device_identity, is_container, remote_url, RuntimeEnv};
pub use properties::{
    default_properties, quote_if_space, resolve, write_properties, ExplicitOptions,
    PublishedOptions, ResolveContext, DOTNET_FRAMEWORK_DENYLIST,
};
pub use statistics::{
    common_event_data, flush_events, os_info, project_closed, project_opened, EventQueue,
    EventSender, FuserEvent, StatisticsPolicy, WaitGroup,
};
pub use exit::ExitStatus;
