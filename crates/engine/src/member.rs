//! Trip members, their grouping edge and settlement-currency preference.
//!
//! A [`Member`] may be *settled by* another member (a household paying as
//! one): its balance is folded into the payer before debts are simplified. It
//! may also prefer a currency in which it receives final payments.
//!
//! Updates use [`Patch`] so that "field absent" (leave unchanged) and "field
//! explicitly null" (clear the value) stay distinguishable.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Currency, EngineError, ResultEngine};

/// Opaque member identifier, as assigned by the persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    pub fn new(value: impl Into<String>) -> ResultEngine<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EngineError::InvalidId(
                "member id must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for MemberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MemberId {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MemberId::new(value)
    }
}

impl TryFrom<&str> for MemberId {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MemberId::new(value)
    }
}

impl From<MemberId> for String {
    fn from(value: MemberId) -> Self {
        value.0
    }
}

/// Tri-state update field: absent, explicitly null, or a value.
///
/// Use with `#[serde(default)]` so a missing JSON key becomes
/// [`Patch::Absent`] while `null` becomes [`Patch::Null`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Applies the patch to `slot`: absent keeps it, null clears it.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(value) => *slot = Some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(value) => serializer.serialize_some(value),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, alias = "settled_by_id")]
    pub settled_by: Option<MemberId>,
    #[serde(default)]
    pub settlement_currency: Option<Currency>,
}

/// Partial update of a [`Member`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "settled_by_id", skip_serializing_if = "Patch::is_absent")]
    pub settled_by: Patch<MemberId>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub settlement_currency: Patch<Currency>,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            settled_by: None,
            settlement_currency: None,
        }
    }

    /// Applies a partial update. A `None` name leaves the name unchanged.
    pub fn apply(&mut self, update: MemberUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        update.settled_by.apply_to(&mut self.settled_by);
        update
            .settlement_currency
            .apply_to(&mut self.settlement_currency);
    }
}

/// Builds the member → payer grouping edges, in member order.
pub fn settled_by_map(members: &[Member]) -> IndexMap<MemberId, MemberId> {
    members
        .iter()
        .filter_map(|m| m.settled_by.clone().map(|payer| (m.id.clone(), payer)))
        .collect()
}

/// Builds the member → preferred settlement currency lookup.
pub fn settlement_preferences(members: &[Member]) -> HashMap<MemberId, Currency> {
    members
        .iter()
        .filter_map(|m| {
            m.settlement_currency
                .clone()
                .map(|currency| (m.id.clone(), currency))
        })
        .collect()
}
