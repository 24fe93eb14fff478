//! Renders an [`EventRecord`] into a [`DisplayMessage`].

use chrono::{DateTime, Utc};

use crate::models::{
    AccentColor, CommitSummary, DisplayField, DisplayMessage, EventRecord, TicketState,
    TicketSummary,
};

pub const NO_DESCRIPTION: &str = "No description";

const MAX_LISTED_COMMITS: usize = 5;
const SHORT_SHA_LEN: usize = 7;
const FIRST_LINE_LIMIT: usize = 100;
const LONG_TEXT_LIMIT: usize = 1024;
const ELLIPSIS: &str = "...";

/// Render with the current instant as timestamp.
pub fn render_now(record: &EventRecord) -> DisplayMessage {
    render(record, Utc::now())
}

/// Render a record. Output depends only on `record` and `now`.
pub fn render(record: &EventRecord, now: DateTime<Utc>) -> DisplayMessage {
    match record {
        EventRecord::Push {
            author,
            commits,
            repo_name,
            branch,
            compare_url,
        } => DisplayMessage {
            title: format!("Push to {repo_name}"),
            link_target: compare_url.clone(),
            accent_color: AccentColor::GREEN,
            fields: vec![
                DisplayField::new("Author", author.as_str(), true),
                DisplayField::new("Branch", branch.as_str(), true),
                DisplayField::new("Count", format!("{} commit(s)", commits.len()), true),
                DisplayField::new("Commits", commit_list(commits), false),
            ],
            footer: footer("Push"),
            timestamp: now,
        },
        EventRecord::Star {
            user,
            repo_name,
            repo_url,
            total_stars,
        } => DisplayMessage {
            title: format!("New star on {repo_name}"),
            link_target: repo_url.clone(),
            accent_color: AccentColor::GOLD,
            fields: vec![
                DisplayField::new("User", user.as_str(), true),
                DisplayField::new("Total stars", total_stars.to_string(), true),
            ],
            footer: footer("Star"),
            timestamp: now,
        },
        EventRecord::Fork {
            user,
            original_repo,
            fork_url,
            fork_name,
            total_forks,
        } => DisplayMessage {
            title: format!("New fork of {original_repo}"),
            link_target: fork_url.clone(),
            accent_color: AccentColor::BLUE,
            fields: vec![
                DisplayField::new("User", user.as_str(), true),
                DisplayField::new("Fork", fork_name.as_str(), true),
                DisplayField::new("Total forks", total_forks.to_string(), true),
            ],
            footer: footer("Fork"),
            timestamp: now,
        },
        EventRecord::Release {
            repo_name,
            tag_name,
            author_name,
            release_url,
            description,
            is_pre_release,
        } => {
            let (label, accent_color) = if *is_pre_release {
                ("Pre-Release", AccentColor::ORANGE)
            } else {
                ("Release", AccentColor::BLUE)
            };

            DisplayMessage {
                title: format!("New {label} on {repo_name}"),
                link_target: release_url.clone(),
                accent_color,
                fields: vec![
                    DisplayField::new("Version", tag_name.as_str(), true),
                    DisplayField::new("Author", author_name.as_str(), true),
                    DisplayField::new(
                        "Description",
                        first_line_truncated(description.as_deref()),
                        false,
                    ),
                ],
                footer: footer("Release"),
                timestamp: now,
            }
        }
        EventRecord::PullRequest(pull) => {
            let accent_color = match pull.state {
                TicketState::Opened | TicketState::Reopened => AccentColor::PURPLE,
                TicketState::Closed => AccentColor::RED,
                TicketState::Merged => AccentColor::GREEN,
            };
            ticket_message(pull, "Pull Request", accent_color, now)
        }
        EventRecord::Issue(issue) => {
            let accent_color = match issue.state {
                TicketState::Closed | TicketState::Merged => AccentColor::GREEN,
                TicketState::Opened | TicketState::Reopened => AccentColor::RED,
            };
            ticket_message(issue, "Issue", accent_color, now)
        }
    }
}

fn footer(event: &str) -> String {
    format!("GitHub • {event} Event")
}

fn ticket_message(
    ticket: &TicketSummary,
    noun: &str,
    accent_color: AccentColor,
    now: DateTime<Utc>,
) -> DisplayMessage {
    DisplayMessage {
        title: format!("{noun} #{}: {}", ticket.number, ticket.title),
        link_target: ticket.url.clone(),
        accent_color,
        fields: vec![
            DisplayField::new("Author", ticket.author.as_str(), true),
            DisplayField::new("State", ticket.state.as_str(), true),
            DisplayField::new("Repository", ticket.repo_name.as_str(), true),
            DisplayField::new(
                "Description",
                truncate_long_text(ticket.description.as_deref()),
                false,
            ),
        ],
        footer: footer(noun),
        timestamp: now,
    }
}

/// At most five commits, one per line, then a remainder line if any were left out.
fn commit_list(commits: &[CommitSummary]) -> String {
    let mut lines: Vec<String> = commits
        .iter()
        .take(MAX_LISTED_COMMITS)
        .map(|commit| {
            let short_id: String = commit.id.chars().take(SHORT_SHA_LEN).collect();
            format!(
                "• [`{short_id}`]({}) {}",
                commit.url,
                first_line_truncated(Some(commit.message.as_str()))
            )
        })
        .collect();

    if commits.len() > MAX_LISTED_COMMITS {
        lines.push(format!(
            "... and {} more commit(s)",
            commits.len() - MAX_LISTED_COMMITS
        ));
    }

    lines.join("\n")
}

/// First line of `text`, trimmed, capped at 100 characters.
pub fn first_line_truncated(text: Option<&str>) -> String {
    let Some(text) = text else {
        return NO_DESCRIPTION.to_string();
    };
    let first_line = text.split('\n').next().unwrap_or_default().trim();

    truncate_chars(first_line, FIRST_LINE_LIMIT)
}

/// Whole text, trimmed, capped at 1024 characters.
pub fn truncate_long_text(text: Option<&str>) -> String {
    match text {
        Some(text) => truncate_chars(text.trim(), LONG_TEXT_LIMIT),
        None => NO_DESCRIPTION.to_string(),
    }
}

/// Cut to `limit` characters, replacing the tail with an ellipsis when too long.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let kept: String = text.chars().take(limit - ELLIPSIS.len()).collect();
    kept + ELLIPSIS
}
