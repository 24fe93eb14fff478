use chrono::{DateTime, Utc};

/// One commit listed in a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub message: String,
    pub url: String,
}

/// Shared shape of pull request and issue notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSummary {
    pub repo_name: String,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub url: String,
    pub state: TicketState,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Opened,
    Reopened,
    Closed,
    Merged,
}

impl TicketState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Reopened => "reopened",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

/// A normalized repository event. Only ever built fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    Push {
        author: String,
        commits: Vec<CommitSummary>,
        repo_name: String,
        branch: String,
        compare_url: String,
    },
    Star {
        user: String,
        repo_name: String,
        repo_url: String,
        total_stars: i64,
    },
    Fork {
        user: String,
        original_repo: String,
        fork_url: String,
        fork_name: String,
        total_forks: i64,
    },
    Release {
        repo_name: String,
        tag_name: String,
        author_name: String,
        release_url: String,
        description: Option<String>,
        is_pre_release: bool,
    },
    PullRequest(TicketSummary),
    Issue(TicketSummary),
}

/// RGB accent used to categorize a message visually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AccentColor {
    pub const GREEN: Self = Self::rgb(46, 160, 67);
    pub const GOLD: Self = Self::rgb(241, 196, 15);
    pub const BLUE: Self = Self::rgb(52, 152, 219);
    pub const ORANGE: Self = Self::rgb(230, 126, 34);
    pub const PURPLE: Self = Self::rgb(130, 80, 223);
    pub const RED: Self = Self::rgb(206, 60, 60);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed `0xRRGGBB` form.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayField {
    pub label: String,
    pub value: String,
    pub inline: bool,
}

impl DisplayField {
    pub fn new(label: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// Channel-agnostic structured message, ready for a delivery sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub title: String,
    pub link_target: String,
    pub accent_color: AccentColor,
    pub fields: Vec<DisplayField>,
    pub footer: String,
    pub timestamp: DateTime<Utc>,
}
