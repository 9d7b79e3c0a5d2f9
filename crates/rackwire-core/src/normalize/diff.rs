//! Tag presence diffing.
//!
//! Snapshot devices only report what is present now. Comparing against the
//! previous snapshot recovers attach, detach and alarm transitions.

use serde::Serialize;

use super::state::{TagSnapshot, TagState};
use crate::protocols::message::{TagAction, TagEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Attach,
    AlarmChange,
    Detach,
}

impl ChangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeAction::Attach => "attach",
            ChangeAction::AlarmChange => "alarm_change",
            ChangeAction::Detach => "detach",
        }
    }
}

impl From<TagAction> for ChangeAction {
    fn from(action: TagAction) -> Self {
        match action {
            TagAction::Attach => ChangeAction::Attach,
            TagAction::Detach => ChangeAction::Detach,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChange {
    pub action: ChangeAction,
    pub position: u8,
    pub tag_id: String,
    pub alarm: u8,
    /// Alarm before the change, set for `AlarmChange` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_alarm: Option<u8>,
}

/// Changes from `previous` to `current`.
///
/// Attach and alarm changes come first in ascending position, then detaches
/// in ascending position. A position whose tag id changed between snapshots
/// is reported as a detach of the old tag and an attach of the new one.
pub fn diff_snapshots(previous: &TagSnapshot, current: &TagSnapshot) -> Vec<TagChange> {
    let mut changes = Vec::new();

    for (&position, tag) in current {
        match previous.get(&position) {
            None => changes.push(attach(position, tag)),
            // Tag ids are compared on purpose: a swapped tag is a presence change.
            Some(old) if old.tag_id != tag.tag_id => changes.push(attach(position, tag)),
            Some(old) if old.alarm != tag.alarm => changes.push(TagChange {
                action: ChangeAction::AlarmChange,
                position,
                tag_id: tag.tag_id.clone(),
                alarm: tag.alarm,
                previous_alarm: Some(old.alarm),
            }),
            Some(_) => {}
        }
    }

    for (&position, old) in previous {
        let replaced = current
            .get(&position)
            .is_some_and(|tag| tag.tag_id != old.tag_id);
        if replaced || !current.contains_key(&position) {
            changes.push(TagChange {
                action: ChangeAction::Detach,
                position,
                tag_id: old.tag_id.clone(),
                alarm: old.alarm,
                previous_alarm: None,
            });
        }
    }

    changes
}

/// Apply reported events in order, returning one change per event.
pub fn apply_events(snapshot: &mut TagSnapshot, events: &[TagEvent]) -> Vec<TagChange> {
    events
        .iter()
        .map(|event| {
            match event.action {
                TagAction::Attach => {
                    snapshot.insert(
                        event.position,
                        TagState {
                            tag_id: event.tag_id.clone(),
                            alarm: event.alarm,
                        },
                    );
                }
                TagAction::Detach => {
                    snapshot.remove(&event.position);
                }
            }
            TagChange {
                action: event.action.into(),
                position: event.position,
                tag_id: event.tag_id.clone(),
                alarm: event.alarm,
                previous_alarm: None,
            }
        })
        .collect()
}

fn attach(position: u8, tag: &TagState) -> TagChange {
    TagChange {
        action: ChangeAction::Attach,
        position,
        tag_id: tag.tag_id.clone(),
        alarm: tag.alarm,
        previous_alarm: None,
    }
}
