#![no_std]

//! # Delegating Proxy
//!
//! Stable address in front of versioned logic. Every call is routed to the
//! implementation the bound registry resolves for the caller at that moment,
//! and runs against this contract's slot arena:
//!
//! ```text
//! invoke(caller, fn, args)
//!   └─▶ registry.resolve_from(caller, baseline) ─▶ target
//!   └─▶ target.execute(context, fn, args, slots) ─▶ (result, writes)
//!   └─▶ persist writes, return result
//! ```
//!
//! The resolved target is never cached. A failing implementation aborts the
//! whole invocation with its own error code and none of its writes are kept.
//! A target with no contract behind it, or without an `execute` entry point,
//! fails with [`UpgradeError::NoImplementation`].

use soroban_sdk::{
    contract, contractimpl, log, panic_with_error, symbol_short,
    xdr::{ScErrorCode, ScErrorType},
    Address, Env, Error, String, Symbol, Val, Vec,
};
use upgradeability::{
    ttl, Baseline, CallContext, ImplementationClient, RegistryClient, UpgradeError,
};

use crate::storage::ProxyStorage;

pub mod storage;


#[contract]
pub struct DelegatingProxy;

#[contractimpl]
impl DelegatingProxy {
    /// Attach this proxy to `registry`, starting at `label`. Only the
    /// registry itself may do this, once.
    pub fn bind(env: Env, registry: Address, label: String) -> Result<(), UpgradeError> {
        if storage::binding(&env).is_some() {
            return Err(UpgradeError::ProxyAlreadyBound);
        }
        registry.require_auth();

        storage::set_binding(
            &env,
            &ProxyStorage {
                registry,
                baseline: Baseline::Pinned(label),
            },
        );
        Ok(())
    }

    /// Forward a call on behalf of `caller`.
    pub fn invoke(
        env: Env,
        caller: Address,
        function: Symbol,
        args: Vec<Val>,
    ) -> Result<Val, UpgradeError> {
        caller.require_auth();

        let binding = Self::load(&env, UpgradeError::NoImplementation)?;
        ttl::extend_instance(&env);
        let target =
            RegistryClient::new(&env, &binding.registry).resolve_from(&caller, &binding.baseline);
        log!(&env, "forwarding", function, target);

        let context = CallContext {
            proxy: env.current_contract_address(),
            caller,
            registry: binding.registry,
        };
        let slots = storage::load_slots(&env)?;
        let (result, writes) = match ImplementationClient::new(&env, &target).try_execute(
            &context,
            &function,
            &args,
            &slots,
        ) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => return Err(UpgradeError::NoImplementation),
            Err(Ok(error)) => return Err(Self::forward_failure(&env, error)),
            Err(Err(_)) => return Err(UpgradeError::NoImplementation),
        };

        storage::apply_writes(&env, &writes);
        Ok(result)
    }

    /// Implementation a call from `caller` would reach right now.
    pub fn implementation(env: Env, caller: Address) -> Result<Address, UpgradeError> {
        let binding = Self::load(&env, UpgradeError::NoImplementation)?;
        ttl::extend_instance(&env);
        Ok(RegistryClient::new(&env, &binding.registry).resolve_from(&caller, &binding.baseline))
    }

    // ── Administration ──────────────────────────────────────────────

    /// Pin this proxy to `label`. Other proxies of the same registry and the
    /// registry's default are unaffected; caller overrides still win.
    pub fn upgrade_to(env: Env, operator: Address, label: String) -> Result<(), UpgradeError> {
        let mut binding = Self::load(&env, UpgradeError::NotInitialized)?;
        operator.require_auth();
        let registry = RegistryClient::new(&env, &binding.registry);
        registry.authorize(&operator);

        let version = registry.version(&label);
        binding.baseline = Baseline::Pinned(version.label.clone());
        storage::set_binding(&env, &binding);

        env.events().publish(
            (symbol_short!("upgraded"),),
            (version.label, version.implementation),
        );
        Ok(())
    }

    /// Drop the pin: resolve to whatever the registry added last.
    pub fn follow_default(env: Env, operator: Address) -> Result<(), UpgradeError> {
        let mut binding = Self::load(&env, UpgradeError::NotInitialized)?;
        operator.require_auth();
        RegistryClient::new(&env, &binding.registry).authorize(&operator);

        binding.baseline = Baseline::Latest;
        storage::set_binding(&env, &binding);

        env.events().publish((symbol_short!("follow"),), ());
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn registry(env: Env) -> Result<Address, UpgradeError> {
        Ok(Self::load(&env, UpgradeError::NotInitialized)?.registry)
    }

    pub fn baseline(env: Env) -> Result<Baseline, UpgradeError> {
        Ok(Self::load(&env, UpgradeError::NotInitialized)?.baseline)
    }

    pub fn slot(env: Env, name: Symbol) -> Option<Val> {
        storage::slot(&env, &name)
    }

    pub fn layout(env: Env) -> Vec<Symbol> {
        storage::layout(&env)
    }

    fn load(env: &Env, unbound: UpgradeError) -> Result<ProxyStorage, UpgradeError> {
        storage::binding(env).ok_or(unbound)
    }

    /// Contract errors are re-raised with the implementation's own code.
    /// A missing contract or entry point means there is nothing to run.
    /// Any other host failure aborts the invocation.
    fn forward_failure(env: &Env, error: Error) -> UpgradeError {
        if error.is_type(ScErrorType::Contract) {
            panic_with_error!(env, error);
        }
        if error.is_code(ScErrorCode::MissingValue) {
            return UpgradeError::NoImplementation;
        }
        log!(env, "implementation aborted", error.get_code());
        panic!("implementation aborted");
    }
}
