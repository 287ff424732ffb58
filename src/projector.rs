//! 将播放信号投影为外壳状态的纯函数。
//!
//! 这里的函数在其枚举域上是全函数：没有 I/O，没有失败路径。
//! 图标的实际加载发生在同步器里，由 `IconSource` 协作方承担，
//! 其失败在调用点被隔离。

use crate::api::{DisplayState, PAUSE_ICON_KEY, PLAY_ICON_KEY, PlayPauseLabel};

/// 由"当前是否正在播放"投影出播放/暂停指示状态。
///
/// 正在播放时指示"暂停"（点击将暂停），否则指示"播放"。
pub(crate) fn project_display(is_playing: bool) -> DisplayState {
    if is_playing {
        DisplayState {
            label: PlayPauseLabel::Pause,
            icon_key: PAUSE_ICON_KEY.to_string(),
        }
    } else {
        DisplayState {
            label: PlayPauseLabel::Play,
            icon_key: PLAY_ICON_KEY.to_string(),
        }
    }
}

/// 计算任务栏进度条的可见性。
///
/// 可见性恒等于"配置开关开启 **且** 正在播放"。
/// 配置开关必须在每个信号到来的时刻重新读取，本函数不做缓存。
pub(crate) const fn project_progress_visibility(show_progress: bool, is_playing: bool) -> bool {
    show_progress && is_playing
}
