//! 事件同步器：外壳状态的唯一拥有者。
//!
//! [`ShellSynchronizer`] 按发出顺序逐条应用播放信号与对话可见性
//! 通知，把它们投影到任务栏、播放指示与遮罩层状态上，并在每次
//! 变更后向宿主发出一份只读快照。所有协作方失败都被就地隔离：
//! 单个操作的失败只终止该操作本身，绝不串联到无关的状态更新。

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    api::{
        ChromeSnapshot, DiagnosticInfo, DiagnosticLevel, FailureReason, PlaybackSignal,
        ShellConfig, ShellUpdate, TrackMetadata,
    },
    collaborators::{
        NotificationRequest, SETTINGS_KEY_SHOW_PROGRESS, SETTINGS_SECTION_PLAYBACK,
        ShellCollaborators,
    },
    projector::{project_display, project_progress_visibility},
};

/// 错误通知图标的字形码点。
const ERROR_ICON_GLYPH: u32 = 0xE711;
/// 错误通知图标的尺寸。
const NOTIFICATION_ICON_SIZE: u32 = 16;

/// 一次待完成的异步元数据解析。
///
/// 由 [`ShellSynchronizer::apply_signal`] 在处理 `Succeeded` 信号时
/// 返回，调用方（工作线程）负责派生实际的解析任务。`seq` 记录了
/// 该信号的序号，用于在解析完成时判定结果是否已经过期。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingResolution {
    /// 触发本次解析的信号的序号。
    pub(crate) seq: u64,
    /// 正在播放的文件路径。
    pub(crate) file_path: String,
}

/// 事件同步器。
///
/// 单一逻辑拥有者：播放指示、任务栏与遮罩层状态只在这里被修改，
/// 对外只暴露 [`ChromeSnapshot`] 只读快照。
pub(crate) struct ShellSynchronizer {
    collaborators: ShellCollaborators,
    config: ShellConfig,
    chrome: ChromeSnapshot,
    /// 已处理信号的单调序号。
    signal_seq: u64,
    /// 最近一个改写了描述/指示状态的信号的序号。
    ///
    /// `ProgressChanged` 只触碰进度值，不会使在途的元数据解析
    /// 失效，因此不计入。
    state_seq: u64,
    update_tx: UnboundedSender<ShellUpdate>,
}

impl ShellSynchronizer {
    pub(crate) fn new(
        collaborators: ShellCollaborators,
        config: ShellConfig,
        update_tx: UnboundedSender<ShellUpdate>,
    ) -> Self {
        Self {
            collaborators,
            config,
            chrome: ChromeSnapshot::default(),
            signal_seq: 0,
            state_seq: 0,
            update_tx,
        }
    }

    /// 应用启动时的默认状态：尚未播放，描述为应用显示名。
    pub(crate) fn initialize_defaults(&mut self) {
        self.apply_display(false);
        self.set_description(&self.config.app_display_name.clone());
        self.emit_snapshot();
    }

    /// 按发出顺序应用一个播放信号。
    ///
    /// 对 `Succeeded` 以外的信号，投影是同步完成的；`Succeeded`
    /// 返回一个 [`PendingResolution`]，由调用方异步解析元数据后
    /// 再通过 [`apply_resolved_metadata`](Self::apply_resolved_metadata)
    /// 回灌结果。
    pub(crate) fn apply_signal(&mut self, signal: PlaybackSignal) -> Option<PendingResolution> {
        self.signal_seq += 1;
        log::trace!("[同步器] 应用播放信号 #{}: {signal:?}", self.signal_seq);

        match signal {
            PlaybackSignal::Failed(reason) => {
                self.state_seq = self.signal_seq;
                self.set_description(&self.config.app_display_name.clone());
                self.recompute_progress_state(false);
                self.apply_display(false);
                self.notify_failure(reason);
                self.emit_snapshot();
                None
            }
            PlaybackSignal::Paused => {
                self.state_seq = self.signal_seq;
                self.recompute_progress_state(false);
                self.apply_display(false);
                self.emit_snapshot();
                None
            }
            PlaybackSignal::Resumed => {
                self.state_seq = self.signal_seq;
                self.recompute_progress_state(true);
                self.apply_display(true);
                self.emit_snapshot();
                None
            }
            PlaybackSignal::Stopped => {
                self.state_seq = self.signal_seq;
                self.set_description(&self.config.app_display_name.clone());
                self.force_progress_hidden();
                self.apply_display(false);
                self.emit_snapshot();
                None
            }
            PlaybackSignal::Succeeded(file_path) => {
                // 投影推迟到元数据解析完成之后，这里不改动任何状态。
                self.state_seq = self.signal_seq;
                Some(PendingResolution {
                    seq: self.state_seq,
                    file_path,
                })
            }
            PlaybackSignal::ProgressChanged(value) => {
                self.chrome.taskbar.progress_value = value;
                self.collaborators.taskbar.set_progress_value(value);
                self.emit_snapshot();
                None
            }
        }
    }

    /// 回灌一次异步元数据解析的结果。
    ///
    /// 若自触发信号以来已经处理过更新的状态信号，结果被视为过期
    /// 并丢弃；解析不到曲目时记录诊断且不改动任何展示状态
    /// （保留既有状态是验收过的行为）。
    pub(crate) fn apply_resolved_metadata(
        &mut self,
        seq: u64,
        file_path: &str,
        metadata: Option<TrackMetadata>,
    ) {
        if seq != self.state_seq {
            self.emit_diagnostic(
                DiagnosticLevel::Warning,
                format!("丢弃过期的元数据解析结果: {file_path}"),
            );
            return;
        }

        match metadata {
            None => {
                self.emit_diagnostic(
                    DiagnosticLevel::Error,
                    format!("未能在媒体库中找到曲目: {file_path}"),
                );
            }
            Some(metadata) => {
                self.set_description(&metadata.display_description());
                self.recompute_progress_state(true);
                self.apply_display(true);
                self.emit_snapshot();
            }
        }
    }

    /// 应用对话子系统的可见性通知。不去抖，后写覆盖先写。
    pub(crate) fn apply_dialog_visibility(&mut self, visible: bool) {
        self.chrome.overlay_visible = visible;
        self.emit_snapshot();
    }

    /// 返回当前外壳状态的只读快照。
    pub(crate) fn snapshot(&self) -> ChromeSnapshot {
        self.chrome.clone()
    }

    /// 向宿主重新发出一份当前快照。
    pub(crate) fn emit_snapshot(&self) {
        if self
            .update_tx
            .send(ShellUpdate::ChromeChanged(self.snapshot()))
            .is_err()
        {
            log::warn!("[同步器] 更新通道已关闭，快照未能送达宿主。");
        }
    }

    fn set_description(&mut self, text: &str) {
        self.chrome.taskbar.description = text.to_string();
        self.collaborators.taskbar.set_description(text);
    }

    /// 以当下重新读取的配置开关计算并应用进度条可见性。
    fn recompute_progress_state(&mut self, is_playing: bool) {
        let show_progress = self
            .collaborators
            .settings
            .get_bool(SETTINGS_SECTION_PLAYBACK, SETTINGS_KEY_SHOW_PROGRESS);

        self.chrome.taskbar.progress_visible =
            project_progress_visibility(show_progress, is_playing);
        self.collaborators
            .taskbar
            .set_progress_state(show_progress, is_playing);
    }

    /// 强制隐藏进度条，不读取配置（用于 `Stopped`）。
    fn force_progress_hidden(&mut self) {
        self.chrome.taskbar.progress_visible = false;
        self.collaborators.taskbar.set_progress_state(false, false);
    }

    /// 投影并应用播放/暂停指示。
    ///
    /// 图标加载是该步骤唯一的可失败副作用：失败时记录所尝试的
    /// 资源键并保留上一个图标，标签照常更新。
    fn apply_display(&mut self, is_playing: bool) {
        let next = project_display(is_playing);

        match self.collaborators.icons.apply_window_icon(&next.icon_key) {
            Ok(()) => {
                self.chrome.display = next;
            }
            Err(e) => {
                let label = next.label;
                self.emit_diagnostic(
                    DiagnosticLevel::Error,
                    format!("无法加载播放/暂停图标 '{}': {e}", next.icon_key),
                );
                self.chrome.display.label = label;
            }
        }
    }

    /// 按失败原因向用户展示错误通知。
    fn notify_failure(&self, reason: FailureReason) {
        let strings = &self.config.strings;
        let request = match reason {
            FailureReason::FileNotFound => NotificationRequest {
                icon_glyph: ERROR_ICON_GLYPH,
                icon_size: NOTIFICATION_ICON_SIZE,
                title: strings.error_title.clone(),
                message: strings.file_not_found_message.clone(),
                ok_label: strings.ok_label.clone(),
                show_log_link: false,
                log_link_label: String::new(),
            },
            FailureReason::Other => NotificationRequest {
                icon_glyph: ERROR_ICON_GLYPH,
                icon_size: NOTIFICATION_ICON_SIZE,
                title: strings.error_title.clone(),
                message: strings.generic_failure_message.clone(),
                ok_label: strings.ok_label.clone(),
                show_log_link: true,
                log_link_label: strings.log_file_label.clone(),
            },
        };
        self.collaborators.dialogs.show_notification(&request);
    }

    fn emit_diagnostic(&self, level: DiagnosticLevel, message: String) {
        match level {
            DiagnosticLevel::Warning => log::warn!("[同步器] {message}"),
            DiagnosticLevel::Error => log::error!("[同步器] {message}"),
        }

        let diagnostic = DiagnosticInfo {
            level,
            message,
            timestamp: chrono::Utc::now(),
        };
        if self
            .update_tx
            .send(ShellUpdate::Diagnostic(diagnostic))
            .is_err()
        {
            log::warn!("[同步器] 更新通道已关闭，诊断信息未能送达宿主。");
        }
    }
}
