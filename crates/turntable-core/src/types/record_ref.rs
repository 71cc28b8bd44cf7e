//! Ways of pointing at a catalog record.

use serde::Serialize;
use std::fmt;

use crate::Result;

use super::{DiscogsId, RecordId};

/// A reference to a record in an add request.
///
/// The backend accepts either the external catalog id (importing the
/// record on first use) or its own internal id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RecordRef {
    #[serde(rename = "discogs_id")]
    Discogs(DiscogsId),
    #[serde(rename = "record_id")]
    Id(RecordId),
}

impl RecordRef {
    /// Parse a user-supplied identifier. UUID-shaped strings are internal
    /// ids, anything else is taken as a catalog id.
    pub fn parse(s: &str) -> Result<Self> {
        match RecordId::new(s) {
            Ok(id) => Ok(RecordRef::Id(id)),
            Err(_) => DiscogsId::new(s).map(RecordRef::Discogs),
        }
    }

    /// Returns true if `identity` refers to the same record.
    pub fn matches(&self, identity: &RecordIdentity) -> bool {
        match self {
            RecordRef::Discogs(d) => identity.discogs_id.as_ref() == Some(d),
            RecordRef::Id(id) => identity.id.as_ref() == Some(id),
        }
    }
}

impl From<DiscogsId> for RecordRef {
    fn from(id: DiscogsId) -> Self {
        RecordRef::Discogs(id)
    }
}

impl From<RecordId> for RecordRef {
    fn from(id: RecordId) -> Self {
        RecordRef::Id(id)
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordRef::Discogs(d) => write!(f, "discogs:{}", d),
            RecordRef::Id(id) => write!(f, "record:{}", id),
        }
    }
}

/// Both ways a record may be known to the client. Either may be absent,
/// e.g. search results carry only the catalog id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordIdentity {
    pub discogs_id: Option<DiscogsId>,
    pub id: Option<RecordId>,
}

impl RecordIdentity {
    pub fn new(discogs_id: Option<DiscogsId>, id: Option<RecordId>) -> Self {
        Self { discogs_id, id }
    }

    pub fn discogs(id: DiscogsId) -> Self {
        Self::new(Some(id), None)
    }

    pub fn internal(id: RecordId) -> Self {
        Self::new(None, Some(id))
    }

    /// True if at least one identifier equals the other side's.
    pub fn matches(&self, other: &RecordIdentity) -> bool {
        let by_discogs = matches!(
            (&self.discogs_id, &other.discogs_id),
            (Some(a), Some(b)) if a == b
        );
        let by_id = matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b);
        by_discogs || by_id
    }

    pub fn is_empty(&self) -> bool {
        self.discogs_id.is_none() && self.id.is_none()
    }
}

impl From<&RecordRef> for RecordIdentity {
    fn from(r: &RecordRef) -> Self {
        match r {
            RecordRef::Discogs(d) => RecordIdentity::discogs(d.clone()),
            RecordRef::Id(id) => RecordIdentity::internal(*id),
        }
    }
}
