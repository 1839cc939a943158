use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message meant for the person driving the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub fn info(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title,
            message: message.into(),
        }
    }

    pub fn error(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.title, self.message)
    }
}
