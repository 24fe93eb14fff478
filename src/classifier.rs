//! Maps a webhook envelope (event kind + JSON body) to an [`EventRecord`].

use serde_json::Value;

use crate::error::MalformedPayload;
use crate::models::{CommitSummary, EventRecord, TicketState, TicketSummary};
use crate::payload::Payload;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Event kinds this relay recognizes, keyed by the `X-GitHub-Event` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ping,
    Push,
    Star,
    Fork,
    Release,
    PullRequest,
    Issues,
}

impl EventKind {
    pub fn from_header(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(Self::Ping),
            "push" => Some(Self::Push),
            "star" => Some(Self::Star),
            "fork" => Some(Self::Fork),
            "release" => Some(Self::Release),
            "pull_request" => Some(Self::PullRequest),
            "issues" => Some(Self::Issues),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Push => "push",
            Self::Star => "star",
            Self::Fork => "fork",
            Self::Release => "release",
            Self::PullRequest => "pull_request",
            Self::Issues => "issues",
        }
    }
}

/// Classify one webhook delivery.
///
/// Returns `Ok(None)` for kinds the relay does not know and for actions it deliberately
/// ignores (star removal, draft releases, label changes, ...). A required field that is
/// absent or mistyped yields [`MalformedPayload`]; no partial record is ever returned.
pub fn classify(kind: &str, body: &Value) -> Result<Option<EventRecord>, MalformedPayload> {
    let Some(kind) = EventKind::from_header(kind) else {
        return Ok(None);
    };
    let payload = Payload::new(kind.as_str(), body);

    match kind {
        EventKind::Ping => Ok(None),
        EventKind::Push => classify_push(&payload).map(Some),
        EventKind::Star => classify_star(&payload),
        EventKind::Fork => classify_fork(&payload).map(Some),
        EventKind::Release => classify_release(&payload),
        EventKind::PullRequest => {
            Ok(classify_pull_request(&payload)?.map(EventRecord::PullRequest))
        }
        EventKind::Issues => Ok(classify_issue(&payload)?.map(EventRecord::Issue)),
    }
}

fn classify_push(payload: &Payload<'_>) -> Result<EventRecord, MalformedPayload> {
    let repo_name = payload.str_at("repository.full_name")?;
    let author = payload.str_at("pusher.name")?;
    let reference = payload.str_at("ref")?;
    let compare_url = payload.str_at("compare")?;

    let commits = payload
        .array_at("commits")?
        .iter()
        .enumerate()
        .map(|(index, value)| -> Result<CommitSummary, MalformedPayload> {
            let commit = payload.element("commits", index, value);
            Ok(CommitSummary {
                id: commit.str_at("id")?.to_string(),
                message: commit.str_at("message")?.to_string(),
                url: commit.str_at("url")?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EventRecord::Push {
        author: author.to_string(),
        commits,
        repo_name: repo_name.to_string(),
        branch: reference
            .strip_prefix(BRANCH_REF_PREFIX)
            .unwrap_or(reference)
            .to_string(),
        compare_url: compare_url.to_string(),
    })
}

fn classify_star(payload: &Payload<'_>) -> Result<Option<EventRecord>, MalformedPayload> {
    if payload.str_at("action")? != "created" {
        return Ok(None);
    }

    Ok(Some(EventRecord::Star {
        user: payload.str_at("sender.login")?.to_string(),
        repo_name: payload.str_at("repository.full_name")?.to_string(),
        repo_url: payload.str_at("repository.html_url")?.to_string(),
        total_stars: payload.i64_at("repository.stargazers_count")?,
    }))
}

fn classify_fork(payload: &Payload<'_>) -> Result<EventRecord, MalformedPayload> {
    Ok(EventRecord::Fork {
        user: payload.str_at("sender.login")?.to_string(),
        original_repo: payload.str_at("repository.full_name")?.to_string(),
        fork_url: payload.str_at("forkee.html_url")?.to_string(),
        fork_name: payload.str_at("forkee.full_name")?.to_string(),
        total_forks: payload.i64_at("repository.forks_count")?,
    })
}

fn classify_release(payload: &Payload<'_>) -> Result<Option<EventRecord>, MalformedPayload> {
    if payload.str_at("action")? != "published" {
        return Ok(None);
    }

    Ok(Some(EventRecord::Release {
        repo_name: payload.str_at("repository.full_name")?.to_string(),
        tag_name: payload.str_at("release.tag_name")?.to_string(),
        author_name: payload.str_at("release.author.login")?.to_string(),
        release_url: payload.str_at("release.html_url")?.to_string(),
        description: payload.opt_str_at("release.body")?.map(str::to_string),
        is_pre_release: payload.bool_at("release.prerelease")?,
    }))
}

fn ticket_state(action: &str) -> Option<TicketState> {
    match action {
        "opened" => Some(TicketState::Opened),
        "reopened" => Some(TicketState::Reopened),
        "closed" => Some(TicketState::Closed),
        _ => None,
    }
}

fn classify_pull_request(payload: &Payload<'_>) -> Result<Option<TicketSummary>, MalformedPayload> {
    let Some(mut state) = ticket_state(payload.str_at("action")?) else {
        return Ok(None);
    };
    if state == TicketState::Closed && payload.opt_bool_at("pull_request.merged")? {
        state = TicketState::Merged;
    }

    ticket(payload, "pull_request", state).map(Some)
}

fn classify_issue(payload: &Payload<'_>) -> Result<Option<TicketSummary>, MalformedPayload> {
    let Some(state) = ticket_state(payload.str_at("action")?) else {
        return Ok(None);
    };

    ticket(payload, "issue", state).map(Some)
}

fn ticket(
    payload: &Payload<'_>,
    object: &str,
    state: TicketState,
) -> Result<TicketSummary, MalformedPayload> {
    Ok(TicketSummary {
        repo_name: payload.str_at("repository.full_name")?.to_string(),
        number: payload.u64_at(&format!("{object}.number"))?,
        title: payload.str_at(&format!("{object}.title"))?.to_string(),
        author: payload.str_at(&format!("{object}.user.login"))?.to_string(),
        url: payload.str_at(&format!("{object}.html_url"))?.to_string(),
        state,
        description: payload
            .opt_str_at(&format!("{object}.body"))?
            .map(str::to_string),
    })
}
