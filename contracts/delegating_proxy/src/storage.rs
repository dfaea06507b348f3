use soroban_sdk::{contracttype, Address, Env, Map, Symbol, Val, Vec};
use upgradeability::{ttl, Baseline, UpgradeError};

/// Proxy bookkeeping lives under `Binding` and `Layout`; implementation data
/// only ever lives under `Slot`, so the two can never collide.
#[contracttype]
#[derive(Clone)]
pub enum ProxyKey {
    Binding,
    Layout,
    Slot(Symbol),
}

#[contracttype]
#[derive(Clone)]
pub struct ProxyStorage {
    pub registry: Address,
    pub baseline: Baseline,
}

pub fn binding(env: &Env) -> Option<ProxyStorage> {
    env.storage().instance().get(&ProxyKey::Binding)
}

pub fn set_binding(env: &Env, binding: &ProxyStorage) {
    env.storage().instance().set(&ProxyKey::Binding, binding);
    ttl::extend_instance(env);
}

/// Names of every slot ever written, in first-write order.
pub fn layout(env: &Env) -> Vec<Symbol> {
    env.storage()
        .persistent()
        .get(&ProxyKey::Layout)
        .unwrap_or(Vec::new(env))
}

pub fn slot(env: &Env, name: &Symbol) -> Option<Val> {
    env.storage()
        .persistent()
        .get(&ProxyKey::Slot(name.clone()))
}

/// Every slot named in the layout, extending each entry's lifetime. A name
/// without a stored value means the arena is damaged.
pub fn load_slots(env: &Env) -> Result<Map<Symbol, Val>, UpgradeError> {
    let mut slots = Map::new(env);
    let layout = layout(env);
    if layout.is_empty() {
        return Ok(slots);
    }
    ttl::extend_persistent(env, &ProxyKey::Layout);

    for name in layout.iter() {
        let key = ProxyKey::Slot(name.clone());
        let value: Val = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(UpgradeError::CorruptState)?;
        ttl::extend_persistent(env, &key);
        slots.set(name, value);
    }
    Ok(slots)
}

/// Persists the slots written by a forwarded call. Slots are only added or
/// overwritten, never removed.
pub fn apply_writes(env: &Env, writes: &Map<Symbol, Val>) {
    if writes.is_empty() {
        return;
    }

    let mut layout = layout(env);
    let mut grown = false;

    for (name, value) in writes.iter() {
        if !layout.contains(&name) {
            layout.push_back(name.clone());
            grown = true;
        }
        let key = ProxyKey::Slot(name);
        env.storage().persistent().set(&key, &value);
        ttl::extend_persistent(env, &key);
    }

    if grown {
        env.storage().persistent().set(&ProxyKey::Layout, &layout);
        ttl::extend_persistent(env, &ProxyKey::Layout);
    }
}
