use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{Result, ShellError};

/// 播放失败的原因分类。
///
/// 由播放引擎在发出 [`PlaybackSignal::Failed`] 时附带，
/// 决定向用户展示哪一类错误通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// 要播放的文件不存在（已被删除、移动或设备已断开）。
    FileNotFound,
    /// 其它所有播放错误（解码失败、设备错误等）。
    Other,
}

/// 播放引擎发出的生命周期信号。
///
/// 每个信号仅被消费一次，除其负载外不携带任何标识。
/// 同步器保证按发出顺序逐条应用这些信号。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackSignal {
    /// 播放失败，附带失败原因。
    Failed(FailureReason),
    /// 播放已暂停。
    Paused,
    /// 播放已从暂停中恢复。
    Resumed,
    /// 播放已停止。
    Stopped,
    /// 新曲目已成功开始播放，附带正在播放的文件路径。
    Succeeded(String),
    /// 播放进度已变化，负载为 `0.0..=1.0` 的进度值。
    ProgressChanged(f64),
}

/// 从元数据存储中解析出的、可供展示的曲目元数据。
///
/// 由宿主实现的 [`MetadataResolver`](crate::MetadataResolver) 按文件路径解析。
/// 解析不到（文件已被删除或尚未入库）是一种合法的非错误结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// 曲目的文件路径。
    pub file_path: String,
    /// 艺术家名称，可能缺失。
    pub artist_name: Option<String>,
    /// 曲目标题，可能缺失。
    pub track_title: Option<String>,
    /// 文件名，作为描述文本的回退。
    pub file_name: String,
}

impl TrackMetadata {
    /// 计算任务栏描述文本。
    ///
    /// 当艺术家与标题均非空白时返回 `"{artist} - {title}"`，
    /// 否则回退到文件名。
    pub fn display_description(&self) -> String {
        let artist = self.artist_name.as_deref().unwrap_or("").trim();
        let title = self.track_title.as_deref().unwrap_or("").trim();

        if !artist.is_empty() && !title.is_empty() {
            format!("{artist} - {title}")
        } else {
            self.file_name.clone()
        }
    }
}

/// 播放/暂停指示标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayPauseLabel {
    #[default]
    /// 显示"播放"（当前未在播放）。
    Play,
    /// 显示"暂停"（当前正在播放）。
    Pause,
}

/// "播放"状态对应的窗口图标资源键。
pub const PLAY_ICON_KEY: &str = "TaskbarItemInfo_Play";
/// "暂停"状态对应的窗口图标资源键。
pub const PAUSE_ICON_KEY: &str = "TaskbarItemInfo_Pause";

/// 播放/暂停指示的当前状态。
///
/// 它是最近一次播放状态迁移的纯投影，不持久化，
/// 在每个相关信号到来时被整体覆盖。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// 当前应展示的标签。
    pub label: PlayPauseLabel,
    /// 当前应展示的图标的资源键。
    pub icon_key: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            label: PlayPauseLabel::Play,
            icon_key: PLAY_ICON_KEY.to_string(),
        }
    }
}

/// 任务栏指示的当前状态。
///
/// 这是一个只写投影：同步器在应用副作用之后保留一份副本，
/// 仅用于生成快照，不具有独立身份。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskbarState {
    /// 任务栏描述文本（应用名或 `"{artist} - {title}"`）。
    pub description: String,
    /// 任务栏进度条是否可见。
    ///
    /// 恒等于"配置项开启 **且** 正在播放"，在每个信号到来时
    /// 重新读取配置计算，从不缓存。
    pub progress_visible: bool,
    /// 任务栏进度值，范围 `0.0..=1.0`。
    pub progress_value: f64,
}

impl Default for TaskbarState {
    fn default() -> Self {
        Self {
            description: String::new(),
            progress_visible: false,
            progress_value: 0.0,
        }
    }
}

/// 宿主可见的外壳状态只读快照。
///
/// 同步器在每次应用一个状态变更后都会通过更新通道发出一份新的快照。
/// 快照之外不暴露任何可变状态。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChromeSnapshot {
    /// 播放/暂停指示状态。
    pub display: DisplayState,
    /// 任务栏指示状态。
    pub taskbar: TaskbarState,
    /// 模态遮罩层是否可见，仅由对话子系统的可见性通知驱动。
    pub overlay_visible: bool,
}

/// 面向用户的可本地化文案。
///
/// 原样传递给通知对话框，本库不做任何语言处理。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellStrings {
    /// 错误通知的标题。
    pub error_title: String,
    /// 文件不存在时的通知正文。
    pub file_not_found_message: String,
    /// 一般播放错误的通知正文。
    pub generic_failure_message: String,
    /// 通知确认按钮的文本。
    pub ok_label: String,
    /// "打开日志文件"链接的文本。
    pub log_file_label: String,
}

impl Default for ShellStrings {
    fn default() -> Self {
        Self {
            error_title: "Error".to_string(),
            file_not_found_message: "Cannot play this song. The file was not found.".to_string(),
            generic_failure_message: "Cannot play this song.".to_string(),
            ok_label: "Ok".to_string(),
            log_file_label: "Log file".to_string(),
        }
    }
}

/// 外壳同步服务的静态配置。
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// 应用的默认显示名，用作任务栏描述的初始值与重置值。
    pub app_display_name: String,
    /// 进程的启动参数，在启动序列中交由参数处理协作方处理。
    pub launch_args: Vec<String>,
    /// 面向用户的文案。
    pub strings: ShellStrings,
}

impl ShellConfig {
    /// 以给定的应用显示名构造配置。
    ///
    /// 启动参数取自 `std::env::args()`，文案使用默认英文文案。
    pub fn new(app_display_name: impl Into<String>) -> Self {
        Self {
            app_display_name: app_display_name.into(),
            launch_args: std::env::args().collect(),
            strings: ShellStrings::default(),
        }
    }
}

/// 发送给外壳同步服务后台线程的命令。
///
/// 这是与本库交互的主要方式，由 [`ShellController`] 发送。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShellCommand {
    /// 用系统默认的文件管理器打开一个路径。
    OpenPath(String),
    /// 用系统默认的浏览器打开一个链接。
    OpenLink(String),
    /// 用系统默认的邮件客户端向一个地址发起新邮件。
    OpenMail(String),
    /// 请求播放引擎切换到上一曲。
    PlayPrevious,
    /// 请求播放引擎切换到下一曲。
    PlayNext,
    /// 构造并显示均衡器对话框。
    ShowEqualizer,
    /// 请求后台服务立即重新发送一次当前的外壳状态快照。
    RequestSnapshot,
    /// 请求关闭整个外壳同步后台线程。
    Shutdown,
}

/// 从外壳同步服务接收的事件和状态更新。
///
/// 使用者通过 `ShellManager::start()` 返回的更新通道接收这些更新。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ShellUpdate {
    /// 外壳状态已变化，负载为最新的完整快照。
    ChromeChanged(ChromeSnapshot),
    /// 报告一个非致命的运行时诊断信息。
    ///
    /// 协作方的失败（图标加载、外部动作、元数据缺失）都会以
    /// 诊断的形式出现在这里，便于测试与宿主观察错误路径。
    Diagnostic(DiagnosticInfo),
}

/// 与后台服务交互的控制器。
pub struct ShellController {
    /// 用于向后台服务发送 [`ShellCommand`] 的通道发送端。
    pub command_tx: mpsc::Sender<ShellCommand>,
}

impl ShellController {
    /// 终止后台线程。
    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(ShellCommand::Shutdown)
            .await
            .map_err(ShellError::from)
    }
}

/// 交给外部事件源持有的信号入口。
///
/// 播放引擎与对话子系统各持有一个同步发送端，可以在任意线程上
/// 发出事件；跨线程投递由内部的通道桥接完成。
#[derive(Debug, Clone)]
pub struct ShellIngress {
    /// 播放引擎生命周期信号的发送端。
    pub playback_tx: crossbeam_channel::Sender<PlaybackSignal>,
    /// 对话子系统可见性通知的发送端。
    pub dialog_tx: crossbeam_channel::Sender<bool>,
}

/// 诊断信息的严重级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    /// 警告级别。
    Warning,
    /// 错误级别。
    Error,
}

/// 封装一条诊断信息。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// 严重级别。
    pub level: DiagnosticLevel,
    /// 诊断消息内容。
    pub message: String,
    /// 诊断产生的时间点。
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(artist: Option<&str>, title: Option<&str>) -> TrackMetadata {
        TrackMetadata {
            file_path: "C:/Music/a.mp3".to_string(),
            artist_name: artist.map(str::to_string),
            track_title: title.map(str::to_string),
            file_name: "a.mp3".to_string(),
        }
    }

    #[test]
    fn test_display_description_uses_artist_and_title() {
        let meta = metadata(Some("Stellardrone"), Some("Solaris"));
        assert_eq!(meta.display_description(), "Stellardrone - Solaris");
    }

    #[test]
    fn test_display_description_falls_back_to_file_name() {
        assert_eq!(
            metadata(None, Some("Solaris")).display_description(),
            "a.mp3",
            "Missing artist should fall back to the file name"
        );
        assert_eq!(
            metadata(Some("Stellardrone"), None).display_description(),
            "a.mp3",
            "Missing title should fall back to the file name"
        );
        assert_eq!(
            metadata(Some("   "), Some("Solaris")).display_description(),
            "a.mp3",
            "Blank artist should fall back to the file name"
        );
    }

    #[test]
    fn test_default_display_state_is_play() {
        let state = DisplayState::default();
        assert_eq!(state.label, PlayPauseLabel::Play);
        assert_eq!(state.icon_key, PLAY_ICON_KEY);
    }
}
