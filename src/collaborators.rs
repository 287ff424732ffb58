//! 外部协作方的窄契约。
//!
//! 本库不拥有任何平台集成：任务栏、对话框渲染、元数据存储、
//! 系统默认处理程序、跳转列表、启动参数处理与配置存储都由宿主
//! 通过这里的 trait 注入。所有 trait 对象都以 `Arc<dyn …>` 的形式
//! 打包在 [`ShellCollaborators`] 中传入 `ShellManager::start()`。

use std::{future::Future, io, pin::Pin, sync::Arc};

use crate::api::TrackMetadata;

/// 本库用于跨线程异步回调的统一 Future 别名。
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// 配置存储中"在任务栏显示进度"开关所在的小节。
pub const SETTINGS_SECTION_PLAYBACK: &str = "Playback";
/// 配置存储中"在任务栏显示进度"开关的键名。
pub const SETTINGS_KEY_SHOW_PROGRESS: &str = "ShowProgressInTaskbar";

/// 一次错误通知的完整参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// 通知图标的字形码点。
    pub icon_glyph: u32,
    /// 通知图标的尺寸。
    pub icon_size: u32,
    /// 通知标题。
    pub title: String,
    /// 通知正文。
    pub message: String,
    /// 确认按钮文本。
    pub ok_label: String,
    /// 是否展示"打开日志文件"的链接。
    pub show_log_link: bool,
    /// "打开日志文件"链接的文本。
    pub log_link_label: String,
}

/// 一个已完全构造好的自定义对话框请求。
///
/// 由 [`DialogFactory`] 构造，交给 [`DialogService::show_custom_dialog`]
/// 展示；本库不参与对话框内容的渲染。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDialogRequest {
    /// 对话框标题。
    pub title: String,
    /// 对话框宽度（像素）。
    pub width: u32,
    /// 对话框高度（像素），`0` 表示自适应。
    pub height: u32,
    /// 对话框是否可调整大小。
    pub can_resize: bool,
    /// 关闭按钮文本。
    pub close_label: String,
}

/// 操作系统任务栏集成。
///
/// 所有方法都是即发即弃的副作用，不允许阻塞同步器的事件处理。
pub trait TaskbarHandle: Send + Sync {
    /// 设置任务栏描述文本。
    fn set_description(&self, text: &str);
    /// 设置任务栏进度条的可见性。
    ///
    /// 进度条仅在 `show_progress && is_playing` 时可见，
    /// 两个参数都由同步器在信号到来的时刻计算。
    fn set_progress_state(&self, show_progress: bool, is_playing: bool);
    /// 设置任务栏进度值（`0.0..=1.0`）。
    fn set_progress_value(&self, value: f64);
}

/// 通知与对话框渲染子系统。
pub trait DialogService: Send + Sync {
    /// 显示一条模态错误通知。
    fn show_notification(&self, request: &NotificationRequest);
    /// 显示一个自定义模态对话框。
    fn show_custom_dialog(&self, request: &CustomDialogRequest);
}

/// 曲目元数据存储的异步查询契约。
pub trait MetadataResolver: Send + Sync {
    /// 按文件路径解析曲目元数据。
    ///
    /// 返回 `None` 表示曲目不在库中（已删除或未入库），
    /// 这是合法结果而非错误。实现必须是非阻塞的：
    /// 解析在独立任务中运行，不得拖慢后续信号的处理。
    fn resolve(&self, file_path: &str) -> BoxFuture<Option<TrackMetadata>>;
}

/// 窗口图标资源的解析与应用。
pub trait IconSource: Send + Sync {
    /// 按资源键加载图标并应用到宿主窗口。
    ///
    /// 资源缺失时返回错误；调用方会记录日志并保留上一个图标，
    /// 失败绝不会中断其它状态更新。
    fn apply_window_icon(&self, icon_key: &str) -> io::Result<()>;
}

/// 操作系统"用默认处理程序打开"原语。
pub trait SystemOpener: Send + Sync {
    /// 在文件管理器中打开一个路径。
    fn open_path(&self, path: &str) -> io::Result<()>;
    /// 在浏览器中打开一个链接。
    fn open_link(&self, link: &str) -> io::Result<()>;
    /// 向一个邮件地址发起新邮件。
    fn open_mail(&self, address: &str) -> io::Result<()>;
}

/// 操作系统跳转列表集成。
pub trait JumpListWriter: Send + Sync {
    /// 异步填充跳转列表。
    ///
    /// 即发即弃：失败只会被记录，不会阻塞启动序列。
    fn populate(&self) -> BoxFuture<io::Result<()>>;
}

/// 启动参数处理协作方（通常是文件服务）。
pub trait ArgumentProcessor: Send + Sync {
    /// 处理进程的启动参数（例如"打开随参数传入的文件"）。
    fn process(&self, args: &[String]) -> io::Result<()>;
}

/// 持久化配置存储的读取契约。
pub trait SettingsReader: Send + Sync {
    /// 读取一个布尔配置项。
    ///
    /// 同步器在每次投影时都会重新调用本方法，实现不应在本层缓存。
    fn get_bool(&self, section: &str, key: &str) -> bool;
}

/// 面向播放引擎的控制契约（上一曲/下一曲）。
pub trait PlaybackDirector: Send + Sync {
    /// 切换到上一曲。
    fn play_previous(&self) -> BoxFuture<()>;
    /// 切换到下一曲。
    fn play_next(&self) -> BoxFuture<()>;
}

/// 次级模态视图（均衡器）的显式构造工厂。
///
/// 宿主在实现中持有所需的依赖，返回一个已完全构造好的对话框请求。
pub trait DialogFactory: Send + Sync {
    /// 构造均衡器对话框请求。
    fn equalizer_dialog(&self) -> CustomDialogRequest;
}

/// 打包传入 `ShellManager::start()` 的全部协作方。
#[derive(Clone)]
pub struct ShellCollaborators {
    /// 任务栏集成。
    pub taskbar: Arc<dyn TaskbarHandle>,
    /// 通知与对话框渲染。
    pub dialogs: Arc<dyn DialogService>,
    /// 曲目元数据存储。
    pub metadata: Arc<dyn MetadataResolver>,
    /// 窗口图标资源。
    pub icons: Arc<dyn IconSource>,
    /// 系统默认处理程序。
    pub opener: Arc<dyn SystemOpener>,
    /// 跳转列表集成。
    pub jump_list: Arc<dyn JumpListWriter>,
    /// 启动参数处理。
    pub arguments: Arc<dyn ArgumentProcessor>,
    /// 持久化配置存储。
    pub settings: Arc<dyn SettingsReader>,
    /// 播放引擎控制。
    pub playback: Arc<dyn PlaybackDirector>,
    /// 均衡器对话框工厂。
    pub dialog_factory: Arc<dyn DialogFactory>,
}
