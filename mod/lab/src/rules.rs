//! Eligibility rules: which access types each software allows, and what a
//! whole selection implies for the request.
//!
//! Rules come from `reference/software-rules.yaml` (key
//! `config:software-rules`): a mapping from software name to its allowed
//! access types. An allowed type is either one of the special license
//! tokens below or the name of a physical room.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use labkom_core::ServiceError;
use labkom_kv::KVStore;

use crate::model::{ACCESS_CLOUD_LICENSE, ACCESS_SERVER_LICENSE};

/// License usable anywhere through a vendor cloud account.
pub const TYPE_CLOUD: &str = "Cloud License";
/// License key borrowed from the lab for offline use.
pub const TYPE_BORROW: &str = "Borrow License";
/// License served from the department license server.
pub const TYPE_SERVER: &str = "Lisensi Server";

fn is_room(allowed_type: &str) -> bool {
    !matches!(allowed_type, TYPE_CLOUD | TYPE_BORROW | TYPE_SERVER)
}

/// Rule-engine summary over a whole software selection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareRestrictions {
    /// Some selected software can only be used on a lab machine.
    pub requires_lab: bool,
    /// The only off-lab option left is the license server.
    pub requires_network_only: bool,
    /// At least one selected software hands out a borrowed key.
    pub needs_borrow_key: bool,
    /// Rooms compatible with every room-restricted selection.
    pub allowed_rooms: Vec<String>,
}

/// Software name → allowed access types.
///
/// Keys live in a BTreeMap so fuzzy lookups resolve identically on every
/// run regardless of file order.
pub struct SoftwareRules {
    rules: BTreeMap<String, Vec<String>>,
    rooms: Vec<String>,
}

impl SoftwareRules {
    /// Load rules and the room list from the KV file layer.
    ///
    /// Missing or malformed files degrade to an empty rule set: every
    /// software is then unrestricted, which keeps intake working while the
    /// reference data is being fixed.
    pub fn load(kv: &dyn KVStore) -> Self {
        let rules = match kv.get("config:software-rules") {
            Ok(Some(raw)) => match serde_yaml::from_slice(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("config:software-rules is not valid YAML: {e}");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("config:software-rules unavailable: {e}");
                BTreeMap::new()
            }
        };
        let rooms = match kv.get("config:rooms") {
            Ok(Some(raw)) => match serde_yaml::from_slice(&raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!("config:rooms is not valid YAML: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("config:rooms unavailable: {e}");
                Vec::new()
            }
        };
        Self { rules, rooms }
    }

    /// Build from in-memory parts.
    pub fn from_parts(rules: BTreeMap<String, Vec<String>>, rooms: Vec<String>) -> Self {
        Self { rules, rooms }
    }

    /// All physical rooms known to the lab, in configured order.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// The raw rule map, for the intake form.
    pub fn rule_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.rules
    }

    /// Resolve a selected software name to its rule entry.
    ///
    /// An exact key match wins outright. Otherwise key and name are
    /// compared case-insensitively as substrings in either direction;
    /// among several fuzzy hits the longest key wins, and equal lengths
    /// fall to the lexicographically smallest key.
    pub fn lookup(&self, name: &str) -> Option<(&str, &[String])> {
        if let Some((key, types)) = self.rules.get_key_value(name) {
            return Some((key.as_str(), types.as_slice()));
        }
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        // Ascending key order plus strictly-longer replacement keeps the
        // lexicographically smallest key among equal lengths.
        let mut best: Option<(&String, &Vec<String>)> = None;
        for (key, types) in &self.rules {
            let hay = key.to_lowercase();
            if hay.contains(&needle) || needle.contains(&hay) {
                let longer = match best {
                    None => true,
                    Some((b, _)) => key.len() > b.len(),
                };
                if longer {
                    best = Some((key, types));
                }
            }
        }
        best.map(|(key, types)| (key.as_str(), types.as_slice()))
    }

    /// Summarize what a software selection permits.
    ///
    /// Software without a rule entry is unrestricted and contributes
    /// nothing. An empty room intersection is a hard error: the selected
    /// software cannot be used together in any single room, and defaulting
    /// would silently grant a room one of them is not licensed for.
    pub fn restrictions(&self, selected: &[String]) -> Result<SoftwareRestrictions, ServiceError> {
        let mut requires_lab = false;
        let mut any_server = false;
        let mut any_cloud_or_borrow = false;
        let mut needs_borrow_key = false;
        let mut room_sets: Vec<BTreeSet<&str>> = Vec::new();

        for name in selected {
            let Some((_, types)) = self.lookup(name) else {
                continue;
            };
            if types.is_empty() {
                continue;
            }

            let rooms: BTreeSet<&str> = types
                .iter()
                .map(String::as_str)
                .filter(|t| is_room(t))
                .collect();
            let has_cloud = types.iter().any(|t| t == TYPE_CLOUD);
            let has_borrow = types.iter().any(|t| t == TYPE_BORROW);
            let has_server = types.iter().any(|t| t == TYPE_SERVER);

            if !has_cloud && !has_borrow && !has_server {
                requires_lab = true;
            }
            any_server |= has_server;
            any_cloud_or_borrow |= has_cloud || has_borrow;
            needs_borrow_key |= has_borrow;

            if !rooms.is_empty() {
                room_sets.push(rooms);
            }
        }

        let allowed_rooms = match room_sets.split_first() {
            None => self.rooms.clone(),
            Some((first, rest)) => {
                let common: BTreeSet<&str> = first
                    .iter()
                    .copied()
                    .filter(|room| rest.iter().all(|set| set.contains(room)))
                    .collect();
                if common.is_empty() {
                    return Err(ServiceError::Validation(
                        "software: selection shares no allowed room".to_string(),
                    ));
                }
                // Configured room order first, unknown rooms after.
                let mut ordered: Vec<String> = self
                    .rooms
                    .iter()
                    .filter(|r| common.contains(r.as_str()))
                    .cloned()
                    .collect();
                for room in &common {
                    if !ordered.iter().any(|r| r == room) {
                        ordered.push((*room).to_string());
                    }
                }
                ordered
            }
        };

        Ok(SoftwareRestrictions {
            requires_lab,
            requires_network_only: any_server && !any_cloud_or_borrow,
            needs_borrow_key,
            allowed_rooms,
        })
    }
}

/// Derive the access type recorded on a request.
///
/// A requester who picked a room and wants a computer gets that room;
/// otherwise a network-only selection gets the license server, and
/// everything else falls through to cloud/borrow.
pub fn derive_access_type(
    restrictions: &SoftwareRestrictions,
    needs_computer: bool,
    room_preference: Option<&str>,
) -> String {
    if needs_computer {
        if let Some(room) = room_preference {
            let room = room.trim();
            if !room.is_empty() {
                return room.to_string();
            }
        }
    }
    if restrictions.requires_network_only {
        return ACCESS_SERVER_LICENSE.to_string();
    }
    ACCESS_CLOUD_LICENSE.to_string()
}
