use soroban_sdk::{symbol_short, Address, Env, String, Symbol};
use upgradeability::Version;

pub const VERSION_ADDED: Symbol = symbol_short!("ver_add");
pub const PROXY_CREATED: Symbol = symbol_short!("prx_new");
pub const OVERRIDE_SET: Symbol = symbol_short!("ovr_set");
pub const OVERRIDE_REMOVED: Symbol = symbol_short!("ovr_del");
pub const ADMIN_CHANGED: Symbol = symbol_short!("adm_set");

pub fn version_added(env: &Env, version: &Version) {
    env.events().publish(
        (VERSION_ADDED, version.label.clone()),
        version.implementation.clone(),
    );
}

pub fn proxy_created(env: &Env, proxy: &Address, label: &String) {
    env.events()
        .publish((PROXY_CREATED,), (proxy.clone(), label.clone()));
}

pub fn override_set(env: &Env, caller: &Address, label: &String) {
    env.events()
        .publish((OVERRIDE_SET, caller.clone()), label.clone());
}

pub fn override_removed(env: &Env, caller: &Address) {
    env.events().publish((OVERRIDE_REMOVED, caller.clone()), ());
}

pub fn admin_changed(env: &Env, previous: &Address, admin: &Address) {
    env.events()
        .publish((ADMIN_CHANGED,), (previous.clone(), admin.clone()));
}
