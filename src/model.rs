//! Core data model.
//!
//! A reacted item is something a user put an emoji on: a message, a file
//! comment, or a file. Each carries its reactions and a stamp that
//! identifies it across pages of the listing.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A workspace member, as supplied by the member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reaction
// ---------------------------------------------------------------------------

/// One emoji on one item, with everyone who used it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Emoji key without colons (e.g. `+1`, `eyes`).
    pub name: String,
    /// Reactors in the order they reacted. Position 0 is the first reactor.
    #[serde(rename = "users", default)]
    pub user_ids: Vec<String>,
}

impl Reaction {
    pub fn new<I, S>(name: impl Into<String>, user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            user_ids: user_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn first_reactor(&self) -> Option<&str> {
        self.user_ids.first().map(String::as_str)
    }

    pub fn includes(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|u| u == user_id)
    }
}

// ---------------------------------------------------------------------------
// Reacted items
// ---------------------------------------------------------------------------

/// Identity of an item within one user's sweep.
///
/// Kinds are kept apart so a message `ts` can never collide with a file's
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemIdentity {
    Message(String),
    FileComment(String),
    File(String),
    /// Shape we could not read. Never treated as a duplicate of anything.
    Unrecognized,
}

/// An entry of the reactions listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactedItem {
    Message {
        ts: String,
        reactions: Vec<Reaction>,
    },
    FileComment {
        timestamp: String,
        reactions: Vec<Reaction>,
    },
    File {
        created: String,
        reactions: Vec<Reaction>,
    },
    Unrecognized,
}

impl ReactedItem {
    /// Split an item into its reactions and its dedup identity.
    pub fn classify(&self) -> (&[Reaction], ItemIdentity) {
        match self {
            ReactedItem::Message { ts, reactions } => {
                (reactions.as_slice(), ItemIdentity::Message(ts.clone()))
            }
            ReactedItem::FileComment {
                timestamp,
                reactions,
            } => (
                reactions.as_slice(),
                ItemIdentity::FileComment(timestamp.clone()),
            ),
            ReactedItem::File { created, reactions } => {
                (reactions.as_slice(), ItemIdentity::File(created.clone()))
            }
            ReactedItem::Unrecognized => (&[], ItemIdentity::Unrecognized),
        }
    }

    /// Read one raw listing entry. Keys are checked in priority order
    /// `message`, `comment`, `file`: a file comment also carries its parent
    /// file, and the comment wins. A present but unreadable body yields
    /// `Unrecognized` rather than an error.
    pub fn from_value(value: &serde_json::Value) -> Self {
        if let Some(body) = value.get("message") {
            return serde_json::from_value::<MessageBody>(body.clone())
                .map(|b| ReactedItem::Message {
                    ts: b.ts,
                    reactions: b.reactions,
                })
                .unwrap_or(ReactedItem::Unrecognized);
        }
        if let Some(body) = value.get("comment") {
            return serde_json::from_value::<CommentBody>(body.clone())
                .map(|b| ReactedItem::FileComment {
                    timestamp: b.timestamp,
                    reactions: b.reactions,
                })
                .unwrap_or(ReactedItem::Unrecognized);
        }
        if let Some(body) = value.get("file") {
            return serde_json::from_value::<FileBody>(body.clone())
                .map(|b| ReactedItem::File {
                    created: b.created,
                    reactions: b.reactions,
                })
                .unwrap_or(ReactedItem::Unrecognized);
        }
        ReactedItem::Unrecognized
    }
}

impl<'de> Deserialize<'de> for ReactedItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(ReactedItem::from_value(&value))
    }
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(deserialize_with = "stamp")]
    ts: String,
    #[serde(default)]
    reactions: Vec<Reaction>,
}

#[derive(Deserialize)]
struct CommentBody {
    #[serde(deserialize_with = "stamp")]
    timestamp: String,
    #[serde(default)]
    reactions: Vec<Reaction>,
}

#[derive(Deserialize)]
struct FileBody {
    #[serde(deserialize_with = "stamp")]
    created: String,
    #[serde(default)]
    reactions: Vec<Reaction>,
}

/// Slack sends `ts` as a string but `timestamp`/`created` as integers.
fn stamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stamp {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Stamp::deserialize(deserializer)? {
        Stamp::Text(s) => s,
        Stamp::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of the reactions listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<ReactedItem>,
    /// `None` once the listing is exhausted.
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn new(items: Vec<ReactedItem>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.filter(|c| !c.is_empty()),
        }
    }

    /// A page with nothing on it and nothing after it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}
