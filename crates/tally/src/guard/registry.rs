use super::AccessControl;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tally_core::{GroupId, Permission, Principal};

/// An in-memory access subsystem: groups, memberships, model access rules
/// and button restrictions.
///
/// Model access follows the usual rule-table semantics. A model with no
/// rules is open to everyone. Once a model has rules, a permission is held
/// when any rule that applies to the principal (a rule without a group, or
/// one for a group the principal belongs to) grants it.
#[derive(Debug, Default)]
pub struct AccessRegistry {
    groups: IndexMap<GroupId, String>,

    /// Principal name to group memberships
    members: HashMap<String, HashSet<GroupId>>,

    rules: IndexMap<AccessId, ModelAccess>,

    /// `(model, button)` to the groups allowed to call it
    buttons: HashMap<(String, String), HashSet<GroupId>>,

    next_rule: usize,
}

/// One model access rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAccess {
    pub model: String,

    /// Group the rule applies to; `None` applies to everyone
    pub group: Option<GroupId>,

    pub perm_read: bool,
    pub perm_write: bool,
}

/// Identifies a rule within an [`AccessRegistry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AccessId(usize);

impl AccessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.insert(id, name.into());
        id
    }

    pub fn group_by_name(&self, name: &str) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, group)| group.as_str() == name)
            .map(|(id, _)| *id)
    }

    pub fn add_member(&mut self, principal: &Principal, group: GroupId) {
        self.members
            .entry(principal.name().to_string())
            .or_default()
            .insert(group);
    }

    pub fn remove_member(&mut self, principal: &Principal, group: GroupId) {
        if let Some(groups) = self.members.get_mut(principal.name()) {
            groups.remove(&group);
        }
    }

    pub fn add_model_access(&mut self, rule: ModelAccess) -> AccessId {
        let id = AccessId(self.next_rule);
        self.next_rule += 1;
        self.rules.insert(id, rule);
        id
    }

    pub fn model_access_mut(&mut self, id: AccessId) -> Option<&mut ModelAccess> {
        self.rules.get_mut(&id)
    }

    pub fn remove_model_access(&mut self, id: AccessId) -> Option<ModelAccess> {
        self.rules.shift_remove(&id)
    }

    /// Restricts `button` on `model` to `groups`, replacing any previous
    /// restriction. An empty set lifts the restriction.
    pub fn set_button_groups(
        &mut self,
        model: &str,
        button: &str,
        groups: impl IntoIterator<Item = GroupId>,
    ) {
        let groups = groups.into_iter().collect::<HashSet<_>>();
        let key = (model.to_string(), button.to_string());

        if groups.is_empty() {
            self.buttons.remove(&key);
        } else {
            self.buttons.insert(key, groups);
        }
    }
}

impl AccessControl for AccessRegistry {
    fn has_model_permission(
        &self,
        model: &str,
        principal: &Principal,
        permission: Permission,
    ) -> bool {
        let mut rules = self.rules.values().filter(|rule| rule.model == model).peekable();

        if rules.peek().is_none() {
            return true;
        }

        let groups = self.principal_groups(principal);
        rules
            .filter(|rule| rule.group.map_or(true, |group| groups.contains(&group)))
            .any(|rule| match permission {
                Permission::Read => rule.perm_read,
                Permission::Write => rule.perm_write,
            })
    }

    fn button_groups(&self, model: &str, button: &str) -> HashSet<GroupId> {
        self.buttons
            .get(&(model.to_string(), button.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn principal_groups(&self, principal: &Principal) -> HashSet<GroupId> {
        self.members
            .get(principal.name())
            .cloned()
            .unwrap_or_default()
    }
}
