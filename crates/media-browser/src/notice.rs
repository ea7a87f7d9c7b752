//! Notice board: the single info/error message a list shows above its items.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Info and error occupy mutually exclusive slots: setting one clears the
/// other.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    info: Option<String>,
    error: Option<String>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.error = None;
        self.info = Some(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.info = None;
        self.error = Some(message.into());
    }

    pub fn show(&mut self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Info => self.info(notice.message.clone()),
            NoticeKind::Error => self.error(notice.message.clone()),
        }
    }

    pub fn clear(&mut self) {
        self.info = None;
        self.error = None;
    }

    pub fn current(&self) -> Option<Notice> {
        if let Some(msg) = &self.error {
            return Some(Notice::error(msg.clone()));
        }
        self.info.as_ref().map(|msg| Notice::info(msg.clone()))
    }
}
