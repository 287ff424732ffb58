//! 单元测试共用的协作方替身。

use std::{
    collections::HashMap,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use crate::{
    api::TrackMetadata,
    collaborators::{
        ArgumentProcessor, BoxFuture, CustomDialogRequest, DialogFactory, DialogService,
        IconSource, JumpListWriter, MetadataResolver, NotificationRequest, PlaybackDirector,
        SETTINGS_KEY_SHOW_PROGRESS, SETTINGS_SECTION_PLAYBACK, SettingsReader,
        ShellCollaborators, SystemOpener, TaskbarHandle,
    },
};

#[derive(Default)]
pub(crate) struct MockTaskbar {
    pub(crate) descriptions: Mutex<Vec<String>>,
    pub(crate) progress_states: Mutex<Vec<(bool, bool)>>,
    pub(crate) progress_values: Mutex<Vec<f64>>,
}

impl TaskbarHandle for MockTaskbar {
    fn set_description(&self, text: &str) {
        self.descriptions.lock().unwrap().push(text.to_string());
    }
    fn set_progress_state(&self, show_progress: bool, is_playing: bool) {
        self.progress_states
            .lock()
            .unwrap()
            .push((show_progress, is_playing));
    }
    fn set_progress_value(&self, value: f64) {
        self.progress_values.lock().unwrap().push(value);
    }
}

#[derive(Default)]
pub(crate) struct MockDialogs {
    pub(crate) notifications: Mutex<Vec<NotificationRequest>>,
    pub(crate) custom_dialogs: Mutex<Vec<CustomDialogRequest>>,
}

impl DialogService for MockDialogs {
    fn show_notification(&self, request: &NotificationRequest) {
        self.notifications.lock().unwrap().push(request.clone());
    }
    fn show_custom_dialog(&self, request: &CustomDialogRequest) {
        self.custom_dialogs.lock().unwrap().push(request.clone());
    }
}

#[derive(Default)]
pub(crate) struct MockResolver {
    tracks: Mutex<HashMap<String, TrackMetadata>>,
}

impl MockResolver {
    pub(crate) fn insert(&self, metadata: TrackMetadata) {
        self.tracks
            .lock()
            .unwrap()
            .insert(metadata.file_path.clone(), metadata);
    }
}

impl MetadataResolver for MockResolver {
    fn resolve(&self, file_path: &str) -> BoxFuture<Option<TrackMetadata>> {
        let found = self.tracks.lock().unwrap().get(file_path).cloned();
        Box::pin(async move { found })
    }
}

#[derive(Default)]
pub(crate) struct MockIcons {
    fail: AtomicBool,
    pub(crate) applied: Mutex<Vec<String>>,
}

impl MockIcons {
    pub(crate) fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl IconSource for MockIcons {
    fn apply_window_icon(&self, icon_key: &str) -> io::Result<()> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("missing icon resource: {icon_key}"),
            ));
        }
        self.applied.lock().unwrap().push(icon_key.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockOpener {
    fail: AtomicBool,
    pub(crate) opened: Mutex<Vec<(String, String)>>,
}

impl MockOpener {
    pub(crate) fn fail_all(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn open(&self, kind: &str, argument: &str) -> io::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("no default handler registered"));
        }
        self.opened
            .lock()
            .unwrap()
            .push((kind.to_string(), argument.to_string()));
        Ok(())
    }
}

impl SystemOpener for MockOpener {
    fn open_path(&self, path: &str) -> io::Result<()> {
        self.open("path", path)
    }
    fn open_link(&self, link: &str) -> io::Result<()> {
        self.open("link", link)
    }
    fn open_mail(&self, address: &str) -> io::Result<()> {
        self.open("mail", address)
    }
}

#[derive(Default)]
pub(crate) struct MockJumpList {
    pub(crate) populated: AtomicUsize,
}

impl JumpListWriter for MockJumpList {
    fn populate(&self) -> BoxFuture<io::Result<()>> {
        self.populated.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

#[derive(Default)]
pub(crate) struct MockArguments {
    pub(crate) seen: Mutex<Vec<Vec<String>>>,
}

impl ArgumentProcessor for MockArguments {
    fn process(&self, args: &[String]) -> io::Result<()> {
        self.seen.lock().unwrap().push(args.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockSettings {
    show_progress: AtomicBool,
}

impl MockSettings {
    pub(crate) fn set_show_progress(&self, value: bool) {
        self.show_progress.store(value, Ordering::SeqCst);
    }
}

impl SettingsReader for MockSettings {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        section == SETTINGS_SECTION_PLAYBACK
            && key == SETTINGS_KEY_SHOW_PROGRESS
            && self.show_progress.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct MockPlayback {
    pub(crate) previous_calls: AtomicUsize,
    pub(crate) next_calls: AtomicUsize,
}

impl PlaybackDirector for MockPlayback {
    fn play_previous(&self) -> BoxFuture<()> {
        self.previous_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {})
    }
    fn play_next(&self) -> BoxFuture<()> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {})
    }
}

pub(crate) struct MockFactory;

impl DialogFactory for MockFactory {
    fn equalizer_dialog(&self) -> CustomDialogRequest {
        CustomDialogRequest {
            title: "Equalizer".to_string(),
            width: 570,
            height: 0,
            can_resize: false,
            close_label: "Close".to_string(),
        }
    }
}

/// 测试侧保留的具体替身句柄，用于检视协作方收到的调用。
pub(crate) struct MockHandles {
    pub(crate) taskbar: Arc<MockTaskbar>,
    pub(crate) dialogs: Arc<MockDialogs>,
    pub(crate) metadata: Arc<MockResolver>,
    pub(crate) icons: Arc<MockIcons>,
    pub(crate) opener: Arc<MockOpener>,
    pub(crate) jump_list: Arc<MockJumpList>,
    pub(crate) arguments: Arc<MockArguments>,
    pub(crate) settings: Arc<MockSettings>,
    pub(crate) playback: Arc<MockPlayback>,
}

/// 构造一整套替身协作方。
pub(crate) fn mock_collaborators() -> (ShellCollaborators, MockHandles) {
    let handles = MockHandles {
        taskbar: Arc::new(MockTaskbar::default()),
        dialogs: Arc::new(MockDialogs::default()),
        metadata: Arc::new(MockResolver::default()),
        icons: Arc::new(MockIcons::default()),
        opener: Arc::new(MockOpener::default()),
        jump_list: Arc::new(MockJumpList::default()),
        arguments: Arc::new(MockArguments::default()),
        settings: Arc::new(MockSettings::default()),
        playback: Arc::new(MockPlayback::default()),
    };

    let collaborators = ShellCollaborators {
        taskbar: handles.taskbar.clone(),
        dialogs: handles.dialogs.clone(),
        metadata: handles.metadata.clone(),
        icons: handles.icons.clone(),
        opener: handles.opener.clone(),
        jump_list: handles.jump_list.clone(),
        arguments: handles.arguments.clone(),
        settings: handles.settings.clone(),
        playback: handles.playback.clone(),
        dialog_factory: Arc::new(MockFactory),
    };

    (collaborators, handles)
}
