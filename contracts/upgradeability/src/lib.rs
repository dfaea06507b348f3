#![no_std]

//! Shared vocabulary of the version registry and the delegating proxy.
//!
//! Both contracts speak to each other (and to implementation contracts)
//! through the client traits declared here, and report failures with the
//! same [`UpgradeError`] codes so an error raised by the registry keeps its
//! meaning when it surfaces through a proxy.

use soroban_sdk::{
    contractclient, contracterror, contracttype, Address, Env, Map, String, Symbol, Val, Vec,
};

pub mod ttl;

/// Longest accepted version label, in bytes.
pub const MAX_LABEL_LEN: u32 = 32;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum UpgradeError {
    Unauthorized = 100,
    DuplicateVersion = 101,
    UnknownVersion = 102,
    NoImplementation = 103,
    AlreadyInitialized = 104,
    NotInitialized = 105,
    ProxyAlreadyBound = 106,
    InvalidLabel = 107,
    /// A listed entry has no backing storage.
    CorruptState = 108,
}

/// An immutable label to implementation binding held by a registry.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Version {
    pub label: String,
    pub implementation: Address,
    /// Insertion position; the highest index is the default version.
    pub index: u32,
    pub added_at: u64,
}

/// What a proxy resolves to when the caller has no override.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum Baseline {
    /// Whatever version the registry added last.
    Latest,
    /// A specific label, regardless of later additions.
    Pinned(String),
}

/// Handed to an implementation for the duration of one forwarded call.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CallContext {
    pub proxy: Address,
    pub caller: Address,
    pub registry: Address,
}

/// Builder for what an implementation hands back from `execute`: the value
/// returned to the caller and the slots the proxy must persist.
#[derive(Clone, Debug)]
pub struct Execution {
    pub result: Val,
    pub writes: Map<Symbol, Val>,
}

impl Execution {
    pub fn new(env: &Env, result: Val) -> Self {
        Self {
            result,
            writes: Map::new(env),
        }
    }

    /// Wire form returned by [`Implementation::execute`].
    pub fn into_parts(self) -> (Val, Map<Symbol, Val>) {
        (self.result, self.writes)
    }
}

pub fn validate_label(label: &String) -> Result<(), UpgradeError> {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return Err(UpgradeError::InvalidLabel);
    }
    Ok(())
}

/// Registry entry points used by proxies.
#[contractclient(name = "RegistryClient")]
pub trait RegistryInterface {
    fn authorize(env: Env, operator: Address) -> Result<(), UpgradeError>;
    fn resolve(env: Env, caller: Address) -> Result<Address, UpgradeError>;
    fn resolve_from(env: Env, caller: Address, baseline: Baseline) -> Result<Address, UpgradeError>;
    fn version(env: Env, label: String) -> Result<Version, UpgradeError>;
    fn override_user_to_version(
        env: Env,
        operator: Address,
        caller: Address,
        label: String,
    ) -> Result<(), UpgradeError>;
}

/// Proxy entry points used by the registry.
#[contractclient(name = "ProxyClient")]
pub trait ProxyInterface {
    fn bind(env: Env, registry: Address, label: String) -> Result<(), UpgradeError>;
}

/// Logic a proxy can forward to.
///
/// `slots` is the proxy's whole storage arena. The implementation must not
/// keep proxy state in its own storage; anything it wants persisted goes
/// into the returned writes (see [`Execution`]). Selectors the
/// implementation does not know must fail, so callers resolved to an older
/// version cannot reach functionality added later.
#[contractclient(name = "ImplementationClient")]
pub trait Implementation {
    fn execute(
        env: Env,
        context: CallContext,
        function: Symbol,
        args: Vec<Val>,
        slots: Map<Symbol, Val>,
    ) -> (Val, Map<Symbol, Val>);
}
