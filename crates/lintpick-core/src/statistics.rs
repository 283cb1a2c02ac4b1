//! 统计事件队列（多生产者 → 单消费者）
//!
//! - 每次运行一个队列；消费者线程为每个事件打上会话 ID 并追加到缓冲；
//! - 计数等待（`WaitGroup`）归队列所有：发送前 +1，追加后 -1；
//! - `finish` 先等待计数归零，再关闭通道并取回缓冲，保证落盘前所有已发送事件都已入缓冲。
//! 上传不在本库范围内，这里只负责写出事件文件。

use crossbeam_channel as channel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;

const LIFECYCLE_GROUP: &str = "qd.cl.lifecycle";
const OS_GROUP: &str = "qd.cl.system.os";
const PROJECT_ID_KEY: &str = "system_qdcld_project_id";
const EVENTS_FILE: &str = "fuser.json";

/// 单条统计事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuserEvent {
    pub group_id: String,
    pub event_name: String,
    pub event_data: BTreeMap<String, String>,
    /// 毫秒时间戳
    pub time: i64,
    /// true 表示状态类事件，false 表示动作类事件
    pub state: bool,
    #[serde(default)]
    pub session_id: String,
}

impl FuserEvent {
    pub fn new(group_id: &str, event_name: &str, event_data: BTreeMap<String, String>, state: bool) -> Self {
        Self {
            group_id: group_id.to_string(),
            event_name: event_name.to_string(),
            event_data,
            time: chrono::Utc::now().timestamp_millis(),
            state,
            session_id: String::new(),
        }
    }
}

/// 完成计数器：`add` 登记未完成的工作，`done` 完成一项，`wait` 阻塞到计数归零
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<(Mutex<GroupState>, Condvar)>,
}

#[derive(Debug, Default)]
struct GroupState {
    count: usize,
    closed: bool,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, GroupState> {
        self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add(&self, n: usize) {
        self.state().count += n;
    }

    /// 已关闭时不登记，返回 false
    pub(crate) fn try_add(&self) -> bool {
        let mut state = self.state();
        if state.closed {
            return false;
        }
        state.count += 1;
        true
    }

    pub fn done(&self) {
        let mut state = self.state();
        state.count = state.count.saturating_sub(1);
        if state.count == 0 {
            self.inner.1.notify_all();
        }
    }

    pub fn pending(&self) -> usize {
        self.state().count
    }

    pub fn wait(&self) {
        let mut state = self.state();
        while state.count > 0 {
            state = self.inner.1.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// 等待计数归零并在同一把锁内关闭，此后 `try_add` 一律失败
    pub(crate) fn wait_and_close(&self) {
        let mut state = self.state();
        while state.count > 0 {
            state = self.inner.1.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.closed = true;
    }
}

enum Msg {
    Event(FuserEvent),
    Close,
}

/// 生产者句柄（可克隆，可跨线程）
#[derive(Clone)]
pub struct EventSender {
    tx: channel::Sender<Msg>,
    pending: WaitGroup,
}

impl EventSender {
    /// 发送事件；`finish` 之后返回 false（事件丢弃，尽力而为）
    /// 返回 true 的事件一定出现在 `finish` 的结果中
    pub fn send(&self, event: FuserEvent) -> bool {
        if !self.pending.try_add() {
            return false;
        }
        if self.tx.send(Msg::Event(event)).is_err() {
            self.pending.done();
            return false;
        }
        true
    }
}

/// 每次运行一个的事件队列
pub struct EventQueue {
    tx: channel::Sender<Msg>,
    pending: WaitGroup,
    session_id: String,
    consumer: JoinHandle<Vec<FuserEvent>>,
}

impl EventQueue {
    /// 创建队列并启动消费者线程
    pub fn start() -> Self {
        let (tx, rx) = channel::unbounded::<Msg>();
        let pending = WaitGroup::new();
        let session_id = uuid::Uuid::new_v4().to_string();

        let consumer_pending = pending.clone();
        let consumer_session = session_id.clone();
        let consumer = std::thread::spawn(move || {
            let mut events: Vec<FuserEvent> = Vec::new();
            while let Ok(msg) = rx.recv() {
                match msg {
                    Msg::Event(mut event) => {
                        event.session_id = consumer_session.clone();
                        events.push(event);
                        consumer_pending.done();
                    }
                    Msg::Close => break,
                }
            }
            events
        });

        Self { tx, pending, session_id, consumer }
    }

    pub fn sender(&self) -> EventSender {
        EventSender { tx: self.tx.clone(), pending: self.pending.clone() }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// 等待所有已发送事件入缓冲后关闭队列，返回缓冲
    pub fn finish(self) -> Vec<FuserEvent> {
        self.pending.wait_and_close();
        let _ = self.tx.send(Msg::Close);
        match self.consumer.join() {
            Ok(events) => {
                debug!(events = events.len(), session = %self.session_id, "event queue closed");
                events
            }
            Err(_) => {
                warn!("event consumer panicked, dropping statistics");
                Vec::new()
            }
        }
    }
}

/// 统计开关：显式关闭或未获许可时都不写出
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsPolicy {
    pub no_statistics: bool,
    pub allowed: bool,
}

/// 将事件写入 `<dir>/fuser.json`；返回写出的文件路径（被策略跳过时为 None）
pub fn flush_events(events: &[FuserEvent], dir: &Path, policy: StatisticsPolicy) -> Result<Option<PathBuf>> {
    if policy.no_statistics {
        info!("statistics disabled, skipping");
        return Ok(None);
    }
    if !policy.allowed {
        info!("statistics not permitted, skipping");
        return Ok(None);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(EVENTS_FILE);
    let bytes = serde_json::to_vec(events).map_err(std::io::Error::from)?;
    std::fs::write(&path, bytes)?;
    debug!(path = %path.display(), events = events.len(), "statistics written");
    Ok(Some(path))
}

/// 所有事件共有的属性
pub fn common_event_data(version: &str, project_id_hash: Option<&str>) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert("version".to_string(), version.to_string());
    if let Some(id) = project_id_hash.filter(|s| !s.is_empty()) {
        data.insert(PROJECT_ID_KEY.to_string(), id.to_string());
    }
    data
}

pub fn project_opened(data: BTreeMap<String, String>) -> FuserEvent {
    FuserEvent::new(LIFECYCLE_GROUP, "project.opened", data, false)
}

pub fn project_closed(data: BTreeMap<String, String>) -> FuserEvent {
    FuserEvent::new(LIFECYCLE_GROUP, "project.closed", data, false)
}

pub fn os_info(mut data: BTreeMap<String, String>) -> FuserEvent {
    data.insert("name".to_string(), std::env::consts::OS.to_string());
    data.insert("arch".to_string(), std::env::consts::ARCH.to_string());
    FuserEvent::new(OS_GROUP, "os.name", data, true)
}
