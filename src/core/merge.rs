//! Merging operator credentials with relation-issued credentials.

use crate::constants;
use crate::core::credentials::{self, CredentialEntry, CredentialHasher};
use crate::core::relation_store::{RelationError, RelationStore};
use crate::models::relation::RelationId;

/// Build the passwd file content from the operator block and every active
/// relation.
///
/// Relations without a stored password get one generated and written back
/// once; afterwards the stored value is reused. Returns `None` when there is
/// nothing to write. Never fails: a relation that cannot be read or written
/// is skipped with a warning.
pub fn merge_password_file(
    operator_block: Option<&str>,
    relations: &mut dyn RelationStore,
    hasher: &dyn CredentialHasher,
) -> Option<String> {
    let lines: Vec<String> = relation_entries(relations, hasher)
        .iter()
        .map(CredentialEntry::to_string)
        .collect();

    let operator_block = operator_block.filter(|block| !block.trim().is_empty());
    match (operator_block, lines.is_empty()) {
        (None, true) => None,
        (Some(block), true) => Some(block.to_string()),
        (None, false) => Some(format!("{}\n", lines.join("\n"))),
        (Some(block), false) => {
            let mut content = block.to_string();
            if !content.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(&lines.join("\n"));
            content.push('\n');
            Some(content)
        }
    }
}

/// Whether any active relation can contribute an entry: its data is
/// readable and it either holds a password or can be issued one. Read-only.
pub fn has_relation_credentials(relations: &dyn RelationStore) -> bool {
    let active = match relations.relations() {
        Ok(active) => active,
        Err(e) => {
            tracing::warn!(error = %e, "cannot list {} relations", constants::RELATION_NAME);
            return false;
        }
    };
    active.iter().any(
        |relation| match relations.get(relation, constants::RELATION_PASSWORD_KEY) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(relation = %relation, error = %e, "relation credentials unavailable");
                false
            }
        },
    )
}

fn relation_entries(
    relations: &mut dyn RelationStore,
    hasher: &dyn CredentialHasher,
) -> Vec<CredentialEntry> {
    let active = match relations.relations() {
        Ok(active) => active,
        Err(e) => {
            tracing::warn!(error = %e, "cannot list {} relations", constants::RELATION_NAME);
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(active.len());
    for relation in &active {
        match relation_entry(relations, hasher, relation) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(relation = %relation, error = %e, "skipping relation credentials");
            }
        }
    }
    entries
}

#[derive(Debug, thiserror::Error)]
enum EntryError {
    #[error(transparent)]
    Relation(#[from] RelationError),
    #[error(transparent)]
    Hash(#[from] credentials::CredentialError),
}

fn relation_entry(
    relations: &mut dyn RelationStore,
    hasher: &dyn CredentialHasher,
    relation: &RelationId,
) -> Result<CredentialEntry, EntryError> {
    let username = relation.username();
    relations.set_if_absent(relation, constants::RELATION_USERNAME_KEY, &username)?;

    let password = match relations.get(relation, constants::RELATION_PASSWORD_KEY)? {
        Some(existing) => zeroize::Zeroizing::new(existing),
        None => {
            let candidate = credentials::generate_password(constants::DEFAULT_PASSWORD_LENGTH);
            let (stored, wrote) =
                relations.set_if_absent(relation, constants::RELATION_PASSWORD_KEY, &candidate)?;
            if wrote {
                tracing::info!(relation = %relation, username = %username, "issued relation password");
            }
            zeroize::Zeroizing::new(stored)
        }
    };

    Ok(CredentialEntry {
        username,
        hashed_password: hasher.hash(&password)?,
    })
}
