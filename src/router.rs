//! 外部动作的命令路由。
//!
//! 三个具名动作（打开路径/打开链接/发起邮件）各自被单独包裹：
//! 任何一次失败都在路由器边界内终止，连同动作名与出错参数一起
//! 记录为诊断，绝不向调用方或 UI 线程传播。

use std::{io, sync::Arc};

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    api::{DiagnosticInfo, DiagnosticLevel, ShellUpdate},
    collaborators::SystemOpener,
};

/// 一个待路由的外部动作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExternalAction {
    /// 在文件管理器中打开一个路径。
    OpenPath(String),
    /// 在浏览器中打开一个链接。
    OpenLink(String),
    /// 向一个邮件地址发起新邮件。
    OpenMail(String),
}

impl ExternalAction {
    /// 动作名，用于日志与诊断。
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::OpenPath(_) => "open_path",
            Self::OpenLink(_) => "open_link",
            Self::OpenMail(_) => "open_mail",
        }
    }

    /// 动作携带的参数。
    pub(crate) fn argument(&self) -> &str {
        match self {
            Self::OpenPath(arg) | Self::OpenLink(arg) | Self::OpenMail(arg) => arg,
        }
    }
}

/// 命令路由器。独立于事件同步器运行，由 UI 发出的命令驱动。
pub(crate) struct CommandRouter {
    opener: Arc<dyn SystemOpener>,
    update_tx: UnboundedSender<ShellUpdate>,
}

impl CommandRouter {
    pub(crate) fn new(
        opener: Arc<dyn SystemOpener>,
        update_tx: UnboundedSender<ShellUpdate>,
    ) -> Self {
        Self { opener, update_tx }
    }

    /// 路由一个外部动作。即发即弃，没有返回值，也不重试。
    ///
    /// 失败被记录为一条错误级诊断（含动作名与参数），不再传播。
    pub(crate) fn dispatch(&self, action: ExternalAction) {
        if let Err(e) = self.try_dispatch(&action) {
            let message = format!(
                "无法执行外部动作 {} (参数: '{}'): {e}",
                action.name(),
                action.argument()
            );
            log::error!("[命令路由] {message}");

            let diagnostic = DiagnosticInfo {
                level: DiagnosticLevel::Error,
                message,
                timestamp: chrono::Utc::now(),
            };
            if self
                .update_tx
                .send(ShellUpdate::Diagnostic(diagnostic))
                .is_err()
            {
                log::warn!("[命令路由] 更新通道已关闭，诊断信息未能送达宿主。");
            }
        }
    }

    fn try_dispatch(&self, action: &ExternalAction) -> io::Result<()> {
        match action {
            ExternalAction::OpenPath(path) => self.opener.open_path(path),
            ExternalAction::OpenLink(link) => self.opener.open_link(link),
            ExternalAction::OpenMail(address) => self.opener.open_mail(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_collaborators;
    use tokio::sync::mpsc;

    #[test]
    fn test_dispatch_reaches_the_opener() {
        let (collaborators, handles) = mock_collaborators();
        let (update_tx, _update_rx) = mpsc::unbounded_channel();
        let router = CommandRouter::new(collaborators.opener, update_tx);

        router.dispatch(ExternalAction::OpenPath("C:/Music".to_string()));
        router.dispatch(ExternalAction::OpenLink("https://example.org".to_string()));
        router.dispatch(ExternalAction::OpenMail("someone@example.org".to_string()));

        let opened = handles.opener.opened.lock().unwrap();
        assert_eq!(
            opened.as_slice(),
            [
                ("path".to_string(), "C:/Music".to_string()),
                ("link".to_string(), "https://example.org".to_string()),
                ("mail".to_string(), "someone@example.org".to_string()),
            ]
        );
    }

    #[test]
    fn test_failure_is_contained_and_reported() {
        let (collaborators, handles) = mock_collaborators();
        let (update_tx, mut update_rx) = mpsc::unbounded_channel();
        let router = CommandRouter::new(collaborators.opener, update_tx);

        handles.opener.fail_all(true);
        // 失败不得越过路由器边界。
        router.dispatch(ExternalAction::OpenLink("https://example.org".to_string()));

        let update = update_rx.try_recv().expect("A diagnostic must be emitted");
        match update {
            ShellUpdate::Diagnostic(info) => {
                assert_eq!(info.level, DiagnosticLevel::Error);
                assert!(info.message.contains("open_link"));
                assert!(info.message.contains("https://example.org"));
            }
            other => panic!("Expected a diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn test_one_failure_does_not_affect_later_actions() {
        let (collaborators, handles) = mock_collaborators();
        let (update_tx, _update_rx) = mpsc::unbounded_channel();
        let router = CommandRouter::new(collaborators.opener, update_tx);

        handles.opener.fail_all(true);
        router.dispatch(ExternalAction::OpenPath("C:/Music".to_string()));
        handles.opener.fail_all(false);
        router.dispatch(ExternalAction::OpenPath("C:/Music".to_string()));

        assert_eq!(handles.opener.opened.lock().unwrap().len(), 1);
    }
}
