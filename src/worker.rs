//! 后台工作线程：事件循环与同步→异步桥接。
//!
//! `ShellWorker` 在一个专用线程中运行，负责：
//! 1. **生命周期管理**: 创建 Tokio 运行时，启动通道桥接任务，执行启动序列。
//! 2. **事件驱动循环**: 在 `tokio::select!` 循环中统一处理外部命令、
//!    播放信号、对话可见性通知与在途元数据解析的完成事件。
//! 3. **顺序保证**: 每个来源流内的事件按发出顺序被应用；`Succeeded`
//!    触发的异步解析不会阻塞后续信号的处理。

use std::thread;

use crossbeam_channel::Receiver as CrossbeamReceiver;
use tokio::{
    runtime::Runtime,
    sync::mpsc::{Receiver as TokioReceiver, Sender as TokioSender, UnboundedSender},
};

use crate::{
    api::{PlaybackSignal, ShellCommand, ShellConfig, ShellUpdate, TrackMetadata},
    collaborators::ShellCollaborators,
    error::{Result, ShellError},
    router::{CommandRouter, ExternalAction},
    startup::StartupSequencer,
    synchronizer::{PendingResolution, ShellSynchronizer},
};

/// 在 `ShellWorker` 内部使用的更新事件，由派生任务发回。
#[derive(Debug)]
pub(crate) enum InternalUpdate {
    /// 一次异步元数据解析已完成。
    MetadataResolved {
        /// 触发解析的信号序号，用于过期判定。
        seq: u64,
        /// 被解析的文件路径。
        file_path: String,
        /// 解析结果，`None` 表示曲目不在库中。
        metadata: Option<TrackMetadata>,
    },
}

/// 外壳同步服务的核心协调器。
pub(crate) struct ShellWorker {
    command_rx: TokioReceiver<ShellCommand>,
    playback_rx: TokioReceiver<PlaybackSignal>,
    dialog_rx: TokioReceiver<bool>,
    internal_rx: TokioReceiver<InternalUpdate>,
    internal_tx: TokioSender<InternalUpdate>,
    synchronizer: ShellSynchronizer,
    router: CommandRouter,
    collaborators: ShellCollaborators,
    launch_args: Vec<String>,
    startup: StartupSequencer,
}

impl ShellWorker {
    /// 启动并运行 `ShellWorker` 的主逻辑。这是工作线程的入口点。
    pub(crate) fn run(
        collaborators: ShellCollaborators,
        config: ShellConfig,
        command_rx: TokioReceiver<ShellCommand>,
        playback_rx_sync: CrossbeamReceiver<PlaybackSignal>,
        dialog_rx_sync: CrossbeamReceiver<bool>,
        update_tx: UnboundedSender<ShellUpdate>,
    ) -> Result<()> {
        log::info!("[ShellWorker] Worker 正在启动...");

        let runtime = Runtime::new()?;

        // 桥接：同步入口通道 -> 异步事件循环。
        // 桥接任务在阻塞线程池中等待 crossbeam 通道上的消息，
        // 保证播放引擎可以在任意线程上同步发出信号。
        let (playback_tx_async, playback_rx_async) =
            tokio::sync::mpsc::channel::<PlaybackSignal>(64);
        runtime.spawn_blocking(move || {
            while let Ok(signal) = playback_rx_sync.recv() {
                if playback_tx_async.blocking_send(signal).is_err() {
                    log::error!("[桥接任务-播放信号] 无法将信号发送至异步通道，接收端可能已关闭。");
                    break;
                }
            }
            log::debug!("[桥接任务-播放信号] 通道已关闭，任务结束。");
        });

        let (dialog_tx_async, dialog_rx_async) = tokio::sync::mpsc::channel::<bool>(32);
        runtime.spawn_blocking(move || {
            while let Ok(visible) = dialog_rx_sync.recv() {
                if dialog_tx_async.blocking_send(visible).is_err() {
                    log::error!("[桥接任务-对话可见性] 无法将通知发送至异步通道。");
                    break;
                }
            }
            log::debug!("[桥接任务-对话可见性] 通道已关闭，任务结束。");
        });

        let (internal_tx, internal_rx) = tokio::sync::mpsc::channel::<InternalUpdate>(32);

        let launch_args = config.launch_args.clone();
        let mut worker = Self {
            command_rx,
            playback_rx: playback_rx_async,
            dialog_rx: dialog_rx_async,
            internal_rx,
            internal_tx,
            router: CommandRouter::new(collaborators.opener.clone(), update_tx.clone()),
            synchronizer: ShellSynchronizer::new(collaborators.clone(), config, update_tx),
            collaborators,
            launch_args,
            startup: StartupSequencer::new(),
        };

        log::debug!("[ShellWorker] 初始化完成，即将执行启动序列并进入事件循环。");

        runtime.block_on(async move {
            worker.startup.run(
                &mut worker.synchronizer,
                &worker.collaborators,
                &worker.launch_args,
            );
            worker.main_event_loop().await;
        });

        log::trace!("[ShellWorker] 核心事件循环已退出，工作线程即将终止。");
        Ok(())
    }

    /// 核心异步事件循环。
    ///
    /// `biased` 确保按自上而下的顺序检查分支，让外部命令
    /// （特别是 Shutdown）得到优先处理。
    async fn main_event_loop(&mut self) {
        loop {
            tokio::select! {
                biased;

                // --- 分支 1: 来自外部 API 的命令 ---
                maybe_command = self.command_rx.recv() => {
                    match maybe_command {
                        Some(ShellCommand::Shutdown) => {
                            log::debug!("[ShellWorker] 收到外部关闭命令，准备退出...");
                            break;
                        }
                        Some(command) => {
                            log::trace!("[ShellWorker] 收到外部命令: {command:?}");
                            self.handle_command(command);
                        }
                        None => {
                            log::debug!("[ShellWorker] 控制器已被丢弃，准备退出...");
                            break;
                        }
                    }
                },

                // --- 分支 2: 来自播放引擎的生命周期信号 ---
                Some(signal) = self.playback_rx.recv() => {
                    if let Some(pending) = self.synchronizer.apply_signal(signal) {
                        self.spawn_metadata_resolution(pending);
                    }
                },

                // --- 分支 3: 来自对话子系统的可见性通知 ---
                Some(visible) = self.dialog_rx.recv() => {
                    self.synchronizer.apply_dialog_visibility(visible);
                },

                // --- 分支 4: 在途元数据解析的完成事件 ---
                Some(update) = self.internal_rx.recv() => {
                    let InternalUpdate::MetadataResolved { seq, file_path, metadata } = update;
                    self.synchronizer.apply_resolved_metadata(seq, &file_path, metadata);
                },
            }
        }
    }

    /// 处理从外部接收到的单个命令。
    fn handle_command(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::OpenPath(path) => {
                self.router.dispatch(ExternalAction::OpenPath(path));
            }
            ShellCommand::OpenLink(link) => {
                self.router.dispatch(ExternalAction::OpenLink(link));
            }
            ShellCommand::OpenMail(address) => {
                self.router.dispatch(ExternalAction::OpenMail(address));
            }
            ShellCommand::PlayPrevious => {
                tokio::spawn(self.collaborators.playback.play_previous());
            }
            ShellCommand::PlayNext => {
                tokio::spawn(self.collaborators.playback.play_next());
            }
            ShellCommand::ShowEqualizer => {
                let request = self.collaborators.dialog_factory.equalizer_dialog();
                self.collaborators.dialogs.show_custom_dialog(&request);
            }
            ShellCommand::RequestSnapshot => {
                self.synchronizer.emit_snapshot();
            }
            ShellCommand::Shutdown => {
                // 已在事件循环中优先处理。
            }
        }
    }

    /// 派生一次异步元数据解析，完成后经内部通道回灌结果。
    ///
    /// 解析任务不阻塞事件循环；其结果是否仍然有效由同步器
    /// 依据信号序号判定。
    fn spawn_metadata_resolution(&self, pending: PendingResolution) {
        let resolution = self.collaborators.metadata.resolve(&pending.file_path);
        let internal_tx = self.internal_tx.clone();

        tokio::spawn(async move {
            let metadata = resolution.await;
            let update = InternalUpdate::MetadataResolved {
                seq: pending.seq,
                file_path: pending.file_path,
                metadata,
            };
            if internal_tx.send(update).await.is_err() {
                log::warn!("[ShellWorker] 事件循环已关闭，元数据解析结果被丢弃。");
            }
        });
    }
}

/// 启动 `ShellWorker` 后台线程的公共函数。
///
/// 这是从外部（`lib.rs`）创建和运行 `ShellWorker` 的标准方式。
pub(crate) fn start_shell_worker_thread(
    collaborators: ShellCollaborators,
    config: ShellConfig,
    command_rx: TokioReceiver<ShellCommand>,
    playback_rx: CrossbeamReceiver<PlaybackSignal>,
    dialog_rx: CrossbeamReceiver<bool>,
    update_tx: UnboundedSender<ShellUpdate>,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("shell_worker_thread".to_string())
        .spawn(move || {
            if let Err(e) = ShellWorker::run(
                collaborators,
                config,
                command_rx,
                playback_rx,
                dialog_rx,
                update_tx,
            ) {
                log::error!("[ShellWorker Thread] Worker 运行失败: {e}");
            }
        })
        .map_err(|e| ShellError::WorkerThread(e.to_string()))
}
