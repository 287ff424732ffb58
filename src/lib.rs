#![warn(missing_docs)]

//! 一个用于将播放引擎生命周期事件同步到宿主窗口状态的 Rust 库。
//!
//! `shell-suite` 是桌面媒体播放器外壳的协调层：它把异步到达的
//! 播放生命周期信号确定性地投影到三块宿主可见状态上——
//! 播放/暂停指示、任务栏描述与进度指示、模态遮罩层可见性——
//! 并路由一小组"打开外部资源"命令。
//!
//! ## 核心功能
//!
//! * **事件驱动的状态同步**: 按发出顺序应用播放信号（失败、暂停、
//!   恢复、停止、成功、进度变化），把它们投影为只读的外壳状态快照。
//! * **过期结果防护**: `Succeeded` 信号触发的异步元数据解析带有
//!   单调序号标记，解析完成时若已有更新的状态信号被处理，
//!   其结果会被丢弃，不会让陈旧状态覆盖新状态。
//! * **失败隔离**: 元数据缺失、图标资源加载失败、外部动作失败都
//!   在调用点被隔离并记录为诊断，绝不会让宿主进程崩溃，也不会
//!   串联到无关的状态更新。
//! * **命令路由**: 打开路径/链接/邮件、上一曲/下一曲、显示均衡器
//!   对话框等命令各自独立执行，即发即弃。
//!
//! ## 使用方法
//!
//! 与本库交互的唯一入口是 [`ShellManager::start()`] 函数。
//!
//! 1.  实现 [`ShellCollaborators`] 中列出的协作方契约（任务栏、
//!     对话框、元数据存储、系统打开原语、跳转列表、参数处理、
//!     配置存储、播放控制、对话框工厂），并打包传入
//!     `ShellManager::start()`。
//! 2.  `start()` 返回一个三元组：[`ShellController`]（命令发送端）、
//!     [`ShellIngress`]（交给播放引擎与对话子系统持有的同步信号
//!     入口）以及一个接收 [`ShellUpdate`] 的更新通道。
//! 3.  播放引擎在任意线程上通过 `ShellIngress::playback_tx` 发出
//!     [`PlaybackSignal`]；对话子系统通过 `dialog_tx` 发出可见性
//!     通知。信号按发出顺序被应用。
//! 4.  宿主在更新通道上接收外壳状态快照与诊断信息，用于渲染。
//! 5.  应用退出前调用 [`ShellController::shutdown()`] 或发送
//!     [`ShellCommand::Shutdown`] 以优雅关闭后台线程。

mod api;
mod collaborators;
mod error;
mod projector;
mod router;
mod startup;
mod synchronizer;
#[cfg(test)]
pub(crate) mod test_support;
mod worker;

pub use api::{
    ChromeSnapshot, DiagnosticInfo, DiagnosticLevel, DisplayState, FailureReason,
    PAUSE_ICON_KEY, PLAY_ICON_KEY, PlayPauseLabel, PlaybackSignal, ShellCommand, ShellConfig,
    ShellController, ShellIngress, ShellStrings, ShellUpdate, TaskbarState, TrackMetadata,
};
pub use collaborators::{
    ArgumentProcessor, BoxFuture, CustomDialogRequest, DialogFactory, DialogService, IconSource,
    JumpListWriter, MetadataResolver, NotificationRequest, PlaybackDirector,
    SETTINGS_KEY_SHOW_PROGRESS, SETTINGS_SECTION_PLAYBACK, SettingsReader, ShellCollaborators,
    SystemOpener, TaskbarHandle,
};
pub use error::{Result, ShellError};

use std::sync::{LazyLock, Mutex};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

static WORKER_HANDLE: LazyLock<Mutex<Option<JoinHandle<()>>>> = LazyLock::new(|| Mutex::new(None));

/// `ShellManager` 是本库的静态入口点。
pub struct ShellManager;

impl ShellManager {
    /// 启动外壳同步后台服务。
    ///
    /// 这是与本库交互的唯一正确方式。它会初始化并运行一个专用的
    /// 后台工作线程，该线程负责事件同步与命令路由的全部工作。
    ///
    /// # 返回
    /// - `Ok((controller, ingress, update_rx))`: 成功启动后返回：
    ///   - `controller`: 一个 [`ShellController`]，用于向后台服务发送命令。
    ///   - `ingress`: 一个 [`ShellIngress`]，交给播放引擎与对话子系统
    ///     持有，用于在任意线程上同步发出事件。
    ///   - `update_rx`: 接收所有状态快照与诊断信息的通道。
    /// - `Err(ShellError)`: 如果在启动过程中发生严重错误，或服务已在运行。
    pub fn start(
        collaborators: ShellCollaborators,
        config: ShellConfig,
    ) -> Result<(
        ShellController,
        ShellIngress,
        mpsc::UnboundedReceiver<ShellUpdate>,
    )> {
        {
            let handle_guard = WORKER_HANDLE.lock()?;
            if let Some(handle) = handle_guard.as_ref()
                && !handle.is_finished()
            {
                return Err(ShellError::AlreadyRunning);
            }
        }

        let (command_tx, command_rx) = mpsc::channel::<ShellCommand>(32);
        let (playback_tx, playback_rx) = crossbeam_channel::unbounded::<PlaybackSignal>();
        let (dialog_tx, dialog_rx) = crossbeam_channel::unbounded::<bool>();
        let (update_tx, update_rx) = mpsc::unbounded_channel::<ShellUpdate>();

        let new_handle = worker::start_shell_worker_thread(
            collaborators,
            config,
            command_rx,
            playback_rx,
            dialog_rx,
            update_tx,
        )?;

        {
            let mut handle_guard = WORKER_HANDLE.lock()?;
            *handle_guard = Some(new_handle);
        }

        Ok((
            ShellController { command_tx },
            ShellIngress {
                playback_tx,
                dialog_tx,
            },
            update_rx,
        ))
    }
}
