//! Visibility policy for vault items.

use kinvault_common::{Identity, VaultItem, Visibility};

/// Whether `identity` may see `item`.
///
/// Items from another family are never visible. Within the family, owners
/// and admins see everything; members see `Family` items and `Member` items
/// assigned to them.
pub fn is_visible(identity: &Identity, item: &VaultItem) -> bool {
    if item.family_id != identity.family_id {
        return false;
    }
    if identity.can_manage_vault() {
        return true;
    }
    match item.visibility {
        Visibility::Family => true,
        Visibility::Member => item.is_assigned_to(&identity.user_id),
        Visibility::Parents => false,
    }
}

/// Filter a family snapshot down to what `identity` may see, newest first.
///
/// Items with equal `created_at` keep their input order.
pub fn filter_visible(
    identity: &Identity,
    items: impl IntoIterator<Item = VaultItem>,
) -> Vec<VaultItem> {
    let mut visible: Vec<VaultItem> = items
        .into_iter()
        .filter(|item| is_visible(identity, item))
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    visible
}
