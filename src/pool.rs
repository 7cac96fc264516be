use std::collections::HashMap;

/// Metadata captured from a chatter's first message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatterMeta {
    pub is_moderator: bool,
    pub is_subscriber: bool,
    pub display_color: String,
}

/// Role-based restriction on which chatters are eligible targets.
///
/// `All` admits everyone and overrides role selection. `Roles` admits the
/// union of the enabled roles; with both flags off it admits nobody, which
/// surfaces as a refused round start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolFilter {
    All,
    Roles { moderators: bool, subscribers: bool },
}

impl PoolFilter {
    pub fn admits(self, meta: &ChatterMeta) -> bool {
        match self {
            Self::All => true,
            Self::Roles {
                moderators,
                subscribers,
            } => (moderators && meta.is_moderator) || (subscribers && meta.is_subscriber),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::All => "everyone",
            Self::Roles {
                moderators: true,
                subscribers: true,
            } => "moderators and subscribers",
            Self::Roles {
                moderators: true, ..
            } => "moderators only",
            Self::Roles {
                subscribers: true, ..
            } => "subscribers only",
            Self::Roles { .. } => "nobody",
        }
    }
}

/// Chatters seen so far on the channel, keyed by login as received.
///
/// Insert-only: the first message a chatter sends fixes their metadata,
/// later arrivals for the same login are ignored.
#[derive(Debug, Default)]
pub struct CandidatePool {
    chatters: HashMap<String, ChatterMeta>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the login was new.
    pub fn insert(&mut self, login: &str, meta: ChatterMeta) -> bool {
        if self.chatters.contains_key(login) {
            return false;
        }
        self.chatters.insert(login.to_string(), meta);
        true
    }

    pub fn get(&self, login: &str) -> Option<&ChatterMeta> {
        self.chatters.get(login)
    }

    pub fn len(&self) -> usize {
        self.chatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chatters.is_empty()
    }

    /// Logins admitted by the filter, sorted so that sampling with a seeded
    /// generator is reproducible.
    pub fn filtered(&self, filter: PoolFilter) -> Vec<&str> {
        let mut eligible: Vec<&str> = self
            .chatters
            .iter()
            .filter(|(_, meta)| filter.admits(meta))
            .map(|(login, _)| login.as_str())
            .collect();
        eligible.sort_unstable();
        eligible
    }
}
