use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

use crate::api::ShellCommand;

/// 定义库的统一错误枚举。
#[derive(Debug, Error)]
pub enum ShellError {
    /// 无法启动后台工作线程。
    ///
    /// 这通常发生在 `std::thread::Builder::spawn` 失败时。
    #[error("无法启动后台工作线程: {0}")]
    WorkerThread(String),

    /// 向工作线程的命令通道发送外部命令时失败。
    ///
    /// 这通常意味着后台工作线程已经崩溃或关闭。
    #[error("向工作线程发送外部命令失败")]
    CommandSendError(#[from] SendError<ShellCommand>),

    /// 创建 Tokio 异步运行时失败。
    ///
    /// 这是一个严重的初始化错误，会导致后台线程无法启动。
    #[error("Tokio 运行时创建失败: {0}")]
    TokioRuntime(#[from] std::io::Error),

    /// 尝试启动一个已经启动的外壳同步服务。
    ///
    /// `ShellManager::start()` 在一个进程中只应被调用一次。
    #[error("外壳同步服务已在运行，无法重复启动。")]
    AlreadyRunning,

    /// 锁已被毒化。
    #[error("锁已被毒化: {0}")]
    MutexPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for ShellError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        ShellError::MutexPoisoned(err.to_string())
    }
}

/// 本库统一的 `Result` 类型别名。
pub type Result<T> = std::result::Result<T, ShellError>;
