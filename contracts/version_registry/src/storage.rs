use soroban_sdk::{contracttype, Address, Env, String, Vec};
use upgradeability::{ttl, UpgradeError, Version};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    /// Label of the most recently added version.
    Latest,
    /// Labels in insertion order.
    Labels,
    Version(String),
    Override(Address),
    /// Number of proxies created.
    ProxyCount,
    /// Creation position of a proxy.
    Proxy(Address),
    /// Proxy created at a position.
    ProxyAt(u32),
}

pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

/// Append-only catalog of versions.
pub mod versions {
    use super::*;

    pub fn contains(env: &Env, label: &String) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Version(label.clone()))
    }

    pub fn get(env: &Env, label: &String) -> Option<Version> {
        let key = DataKey::Version(label.clone());
        let version = env.storage().persistent().get(&key)?;
        ttl::extend_persistent(env, &key);
        Some(version)
    }

    pub fn latest(env: &Env) -> Option<Version> {
        let label: String = env.storage().instance().get(&DataKey::Latest)?;
        get(env, &label)
    }

    pub fn labels(env: &Env) -> Vec<String> {
        match env.storage().persistent().get(&DataKey::Labels) {
            Some(labels) => {
                ttl::extend_persistent(env, &DataKey::Labels);
                labels
            }
            None => Vec::new(env),
        }
    }

    pub fn count(env: &Env) -> u32 {
        labels(env).len()
    }

    /// Records a new binding and makes it the default. The caller checks
    /// the label is not taken yet.
    pub fn append(env: &Env, label: String, implementation: Address) -> Version {
        let mut labels = labels(env);
        let version = Version {
            label: label.clone(),
            implementation,
            index: labels.len(),
            added_at: env.ledger().timestamp(),
        };

        let key = DataKey::Version(label.clone());
        env.storage().persistent().set(&key, &version);
        ttl::extend_persistent(env, &key);

        labels.push_back(label.clone());
        env.storage().persistent().set(&DataKey::Labels, &labels);
        ttl::extend_persistent(env, &DataKey::Labels);

        env.storage().instance().set(&DataKey::Latest, &label);
        version
    }

    /// Fails if a listed label lost its entry.
    pub fn all(env: &Env) -> Result<Vec<Version>, UpgradeError> {
        let mut out = Vec::new(env);
        for label in labels(env).iter() {
            out.push_back(get(env, &label).ok_or(UpgradeError::CorruptState)?);
        }
        Ok(out)
    }
}

/// Per-caller pins. Every stored label exists in [`versions`].
pub mod overrides {
    use super::*;

    pub fn get(env: &Env, caller: &Address) -> Option<String> {
        let key = DataKey::Override(caller.clone());
        let label = env.storage().persistent().get(&key)?;
        ttl::extend_persistent(env, &key);
        Some(label)
    }

    pub fn set(env: &Env, caller: &Address, label: &String) {
        let key = DataKey::Override(caller.clone());
        env.storage().persistent().set(&key, label);
        ttl::extend_persistent(env, &key);
    }

    /// Returns whether an override was present.
    pub fn remove(env: &Env, caller: &Address) -> bool {
        let key = DataKey::Override(caller.clone());
        if !env.storage().persistent().has(&key) {
            return false;
        }
        env.storage().persistent().remove(&key);
        true
    }
}

/// Proxies bound by this registry, one entry each.
pub mod proxies {
    use super::*;

    pub fn count(env: &Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::ProxyCount)
            .unwrap_or(0)
    }

    pub fn contains(env: &Env, proxy: &Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Proxy(proxy.clone()))
    }

    pub fn at(env: &Env, index: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::ProxyAt(index))
    }

    /// Records `proxy` at the next position. The caller checks it is not
    /// recorded yet.
    pub fn push(env: &Env, proxy: &Address) -> u32 {
        let index = count(env);

        let key = DataKey::Proxy(proxy.clone());
        env.storage().persistent().set(&key, &index);
        ttl::extend_persistent(env, &key);

        let key = DataKey::ProxyAt(index);
        env.storage().persistent().set(&key, proxy);
        ttl::extend_persistent(env, &key);

        env.storage().instance().set(&DataKey::ProxyCount, &(index + 1));
        index
    }
}
