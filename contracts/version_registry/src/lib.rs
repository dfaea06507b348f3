#![no_std]

//! # Version Registry
//!
//! Catalog of named implementation versions shared by any number of
//! delegating proxies.
//!
//! ## Resolution
//!
//! ```text
//! caller has override?  ──yes──▶ overridden label's implementation
//!        │no
//!        ▼
//! proxy baseline Pinned(label) ──▶ that label's implementation
//! proxy baseline Latest        ──▶ most recently added version
//! ```
//!
//! Labels are opaque: "most recent" means insertion order, never a
//! comparison of label text. A label, once added, keeps its
//! implementation forever; shipping new code means adding a new label.
//!
//! ## Security
//!
//! Every mutation goes through [`VersionRegistry::authorize`], which is
//! also what proxies call before switching their own baseline.

use soroban_sdk::{contract, contractimpl, log, Address, Env, String, Vec};
use upgradeability::{ttl, validate_label, Baseline, ProxyClient, UpgradeError, Version};

mod events;
pub mod storage;


#[contract]
pub struct VersionRegistry;

#[contractimpl]
impl VersionRegistry {
    // ── Initialization ──────────────────────────────────────────────

    pub fn initialize(env: Env, admin: Address) -> Result<(), UpgradeError> {
        if storage::get_admin(&env).is_some() {
            return Err(UpgradeError::AlreadyInitialized);
        }
        admin.require_auth();

        storage::set_admin(&env, &admin);
        ttl::extend_instance(&env);
        Ok(())
    }

    // ── Access control ──────────────────────────────────────────────

    /// Fails unless `operator` signed the invocation and is the admin.
    pub fn authorize(env: Env, operator: Address) -> Result<(), UpgradeError> {
        Self::require_admin(&env, &operator)
    }

    /// Hands administration to another account, e.g. a governance contract.
    pub fn set_admin(env: Env, operator: Address, new_admin: Address) -> Result<(), UpgradeError> {
        Self::require_admin(&env, &operator)?;

        storage::set_admin(&env, &new_admin);
        events::admin_changed(&env, &operator, &new_admin);
        Ok(())
    }

    // ── Versions ────────────────────────────────────────────────────

    /// Appends a version. It becomes the default for every resolution that
    /// is neither overridden nor pinned.
    pub fn add_version(
        env: Env,
        operator: Address,
        label: String,
        implementation: Address,
    ) -> Result<(), UpgradeError> {
        Self::require_admin(&env, &operator)?;
        validate_label(&label)?;

        if storage::versions::contains(&env, &label) {
            return Err(UpgradeError::DuplicateVersion);
        }

        let version = storage::versions::append(&env, label, implementation);
        log!(&env, "version added", version.label, version.index);
        events::version_added(&env, &version);
        Ok(())
    }

    // ── Proxies ─────────────────────────────────────────────────────

    /// Binds a freshly deployed proxy to this registry, starting at `label`.
    ///
    /// Deploying the proxy instance is left to tooling; the `prx_new` event
    /// is how that tooling learns the binding took place.
    pub fn create_proxy(
        env: Env,
        operator: Address,
        label: String,
        proxy: Address,
    ) -> Result<Address, UpgradeError> {
        Self::require_admin(&env, &operator)?;

        if !storage::versions::contains(&env, &label) {
            return Err(UpgradeError::UnknownVersion);
        }
        if storage::proxies::contains(&env, &proxy) {
            return Err(UpgradeError::ProxyAlreadyBound);
        }

        ProxyClient::new(&env, &proxy).bind(&env.current_contract_address(), &label);

        let index = storage::proxies::push(&env, &proxy);
        log!(&env, "proxy created", proxy, index);
        events::proxy_created(&env, &proxy, &label);
        Ok(proxy)
    }

    // ── Overrides ───────────────────────────────────────────────────

    pub fn override_user_to_version(
        env: Env,
        operator: Address,
        caller: Address,
        label: String,
    ) -> Result<(), UpgradeError> {
        Self::require_admin(&env, &operator)?;

        if !storage::versions::contains(&env, &label) {
            return Err(UpgradeError::UnknownVersion);
        }

        storage::overrides::set(&env, &caller, &label);
        events::override_set(&env, &caller, &label);
        Ok(())
    }

    /// Removing an override that does not exist is a no-op.
    pub fn remove_override_user_to_version(
        env: Env,
        operator: Address,
        caller: Address,
    ) -> Result<(), UpgradeError> {
        Self::require_admin(&env, &operator)?;

        if storage::overrides::remove(&env, &caller) {
            events::override_removed(&env, &caller);
        }
        Ok(())
    }

    // ── Resolution ──────────────────────────────────────────────────

    /// Implementation `caller` reaches when nothing pins it: its override,
    /// or the default version.
    pub fn resolve(env: Env, caller: Address) -> Result<Address, UpgradeError> {
        Self::target(&env, &caller, &Baseline::Latest)
    }

    /// Implementation `caller` reaches through a proxy whose own baseline is
    /// `baseline`. Overrides take precedence over the baseline.
    pub fn resolve_from(
        env: Env,
        caller: Address,
        baseline: Baseline,
    ) -> Result<Address, UpgradeError> {
        Self::target(&env, &caller, &baseline)
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn admin(env: Env) -> Result<Address, UpgradeError> {
        storage::get_admin(&env).ok_or(UpgradeError::NotInitialized)
    }

    pub fn version(env: Env, label: String) -> Result<Version, UpgradeError> {
        storage::versions::get(&env, &label).ok_or(UpgradeError::UnknownVersion)
    }

    pub fn default_version(env: Env) -> Result<Version, UpgradeError> {
        storage::versions::latest(&env).ok_or(UpgradeError::NoImplementation)
    }

    /// All versions in insertion order.
    pub fn versions(env: Env) -> Result<Vec<Version>, UpgradeError> {
        storage::versions::all(&env)
    }

    pub fn version_count(env: Env) -> u32 {
        storage::versions::count(&env)
    }

    pub fn override_of(env: Env, caller: Address) -> Option<String> {
        storage::overrides::get(&env, &caller)
    }

    pub fn proxy_count(env: Env) -> u32 {
        storage::proxies::count(&env)
    }

    /// Proxy created at position `index`, oldest first.
    pub fn proxy_at(env: Env, index: u32) -> Option<Address> {
        storage::proxies::at(&env, index)
    }

    pub fn is_proxy(env: Env, proxy: Address) -> bool {
        storage::proxies::contains(&env, &proxy)
    }

    // ── Internal Helpers ────────────────────────────────────────────

    fn require_admin(env: &Env, operator: &Address) -> Result<(), UpgradeError> {
        let admin = storage::get_admin(env).ok_or(UpgradeError::NotInitialized)?;
        operator.require_auth();

        if *operator != admin {
            return Err(UpgradeError::Unauthorized);
        }

        ttl::extend_instance(env);
        Ok(())
    }

    fn target(env: &Env, caller: &Address, baseline: &Baseline) -> Result<Address, UpgradeError> {
        ttl::extend_instance(env);

        let version = match storage::overrides::get(env, caller) {
            Some(label) => storage::versions::get(env, &label),
            None => match baseline {
                Baseline::Pinned(label) => storage::versions::get(env, label),
                Baseline::Latest => {
                    return storage::versions::latest(env)
                        .map(|version| version.implementation)
                        .ok_or(UpgradeError::NoImplementation)
                }
            },
        };

        version
            .map(|version| version.implementation)
            .ok_or(UpgradeError::UnknownVersion)
    }
}
