//! Following/followers reconciliation.
//!
//! The following export wraps its entries in `relationships_following`;
//! the followers export is a bare array. Both carry the username in
//! `string_list_data[0].value`.

use std::collections::HashSet;
use std::path::Path;

use archive_core::error::{ArchiveError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct FollowingExport {
    relationships_following: Vec<RelationshipEntry>,
}

#[derive(Deserialize)]
struct RelationshipEntry {
    string_list_data: Vec<StringListItem>,
}

#[derive(Deserialize)]
struct StringListItem {
    value: String,
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Usernames from a following export, in file order.
pub fn load_following(path: &Path) -> Result<Vec<String>> {
    let export: FollowingExport = read_json(path)?;
    usernames(export.relationships_following, "relationships_following")
}

/// Usernames from a followers export, in file order.
pub fn load_followers(path: &Path) -> Result<Vec<String>> {
    let entries: Vec<RelationshipEntry> = read_json(path)?;
    usernames(entries, "followers")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ArchiveError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn usernames(entries: Vec<RelationshipEntry>, list: &str) -> Result<Vec<String>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .string_list_data
                .into_iter()
                .next()
                .map(|item| item.value)
                .ok_or_else(|| {
                    ArchiveError::InvalidShape(format!("{} entry {} has no string_list_data", list, i))
                })
        })
        .collect()
}

// ── FollowSetReconciler ───────────────────────────────────────────────────────

/// Finds accounts that are followed but do not follow back.
pub struct FollowSetReconciler;

impl FollowSetReconciler {
    /// Usernames in the following list that are absent from the followers
    /// list.
    ///
    /// Each name appears once, in the order it first appears in the
    /// following file. Any read or shape error in either file fails the
    /// whole reconciliation.
    pub fn reconcile(following_path: &Path, followers_path: &Path) -> Result<Vec<String>> {
        let following = load_following(following_path)?;
        let followers: HashSet<String> = load_followers(followers_path)?.into_iter().collect();

        debug!(
            "Reconciling {} following against {} followers",
            following.len(),
            followers.len()
        );

        let mut seen: HashSet<String> = HashSet::new();
        Ok(following
            .into_iter()
            .filter(|name| !followers.contains(name))
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }

    /// Legacy form of [`FollowSetReconciler::reconcile`]: any failure is
    /// logged and yields an empty list, indistinguishable from "everyone
    /// follows back".
    pub fn find_non_reciprocal(following_path: &Path, followers_path: &Path) -> Vec<String> {
        match Self::reconcile(following_path, followers_path) {
            Ok(names) => names,
            Err(e) => {
                warn!("Error analyzing follow lists: {}", e);
                Vec::new()
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
