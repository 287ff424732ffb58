//! 一次性启动序列。
//!
//! 在工作线程进入事件循环之前恰好运行一次：设置默认的播放指示
//! 与任务栏描述，异步填充跳转列表，并把进程启动参数交给文件
//! 处理协作方。除"未运行/已运行"外没有别的状态机。

use crate::{collaborators::ShellCollaborators, synchronizer::ShellSynchronizer};

pub(crate) struct StartupSequencer {
    has_run: bool,
}

impl StartupSequencer {
    pub(crate) const fn new() -> Self {
        Self { has_run: false }
    }

    /// 执行启动序列。重复调用会被忽略并记录警告。
    ///
    /// 跳转列表的填充是即发即弃的异步任务，失败只记日志，
    /// 不阻塞启动；参数处理的失败同样只记日志。
    pub(crate) fn run(
        &mut self,
        synchronizer: &mut ShellSynchronizer,
        collaborators: &ShellCollaborators,
        launch_args: &[String],
    ) {
        if self.has_run {
            log::warn!("[启动序列] 启动序列已执行过，忽略重复调用。");
            return;
        }
        self.has_run = true;
        log::debug!("[启动序列] 正在执行一次性初始化...");

        // 1 + 2: 尚未播放的默认指示与默认描述。
        synchronizer.initialize_defaults();

        // 3: 异步填充跳转列表。
        let populate = collaborators.jump_list.populate();
        tokio::spawn(async move {
            if let Err(e) = populate.await {
                log::error!("[启动序列] 填充跳转列表失败: {e}");
            }
        });

        // 4: 处理启动参数。
        if let Err(e) = collaborators.arguments.process(launch_args) {
            log::error!("[启动序列] 处理启动参数失败: {e}");
        }
    }
}
