/// Registry + proxy deployment used by the scenario tests.
use delegating_proxy::{DelegatingProxy, DelegatingProxyClient};
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    Address, Env, IntoVal, String, Symbol, TryFromVal, Val, Vec,
};
use version_registry::{VersionRegistry, VersionRegistryClient};

use super::token::{TokenV1_0, TokenV1_1};

pub struct Deployment {
    pub env: Env,
    pub admin: Address,
    pub registry: VersionRegistryClient<'static>,
    pub v1_0: Address,
    pub v1_1: Address,
    pub proxy: DelegatingProxyClient<'static>,
}

impl Deployment {
    /// Registry with versions "1.0" and "1.1", and one proxy created at "1.0".
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let registry_id = env.register_contract(None, VersionRegistry);
        let registry = VersionRegistryClient::new(&env, &registry_id);
        registry.initialize(&admin);

        let v1_0 = env.register_contract(None, TokenV1_0);
        let v1_1 = env.register_contract(None, TokenV1_1);
        registry.add_version(&admin, &to_label(&env, "1.0"), &v1_0);
        registry.add_version(&admin, &to_label(&env, "1.1"), &v1_1);

        let proxy = deploy_proxy(&env, &registry, &admin, "1.0");

        Self {
            env,
            admin,
            registry,
            v1_0,
            v1_1,
            proxy,
        }
    }

    /// Another proxy on the same registry.
    pub fn create_proxy(&self, label: &str) -> DelegatingProxyClient<'static> {
        deploy_proxy(&self.env, &self.registry, &self.admin, label)
    }

    pub fn label(&self, text: &str) -> String {
        to_label(&self.env, text)
    }

    pub fn user(&self) -> Address {
        Address::generate(&self.env)
    }

    pub fn call(&self, caller: &Address, function: &str, args: Vec<Val>) -> Val {
        self.proxy
            .invoke(caller, &Symbol::new(&self.env, function), &args)
    }

    /// Whether the forwarded call went through.
    pub fn call_succeeds(&self, caller: &Address, function: &str, args: Vec<Val>) -> bool {
        self.proxy
            .try_invoke(caller, &Symbol::new(&self.env, function), &args)
            .is_ok()
    }

    pub fn mint(&self, caller: &Address, to: &Address, amount: i128) {
        self.call(caller, "mint", self.args2(to, amount));
    }

    pub fn transfer(&self, caller: &Address, to: &Address, amount: i128) {
        self.call(caller, "transfer", self.args2(to, amount));
    }

    pub fn balance(&self, who: &Address) -> i128 {
        let args = Vec::from_array(&self.env, [who.into_val(&self.env)]);
        let value = self.call(who, "balance", args);
        i128::try_from_val(&self.env, &value).expect("balance is not an i128")
    }

    pub fn args2(&self, address: &Address, amount: i128) -> Vec<Val> {
        Vec::from_array(
            &self.env,
            [address.into_val(&self.env), amount.into_val(&self.env)],
        )
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

/// Deploys a proxy, binds it at `label`, and locates it the way deployment
/// tooling does: through the registry's `prx_new` event.
pub fn deploy_proxy(
    env: &Env,
    registry: &VersionRegistryClient,
    operator: &Address,
    label: &str,
) -> DelegatingProxyClient<'static> {
    let instance = env.register_contract(None, DelegatingProxy);
    registry.create_proxy(operator, &to_label(env, label), &instance);

    let announced = proxy_from_events(env).expect("no prx_new event");
    assert_eq!(announced, instance);
    DelegatingProxyClient::new(env, &announced)
}

pub fn to_label(env: &Env, text: &str) -> String {
    String::from_str(env, text)
}

/// Address carried by the most recent `prx_new` event.
pub fn proxy_from_events(env: &Env) -> Option<Address> {
    let mut found = None;
    for (_, topics, data) in env.events().all().iter() {
        let topic = topics
            .get(0)
            .and_then(|value| Symbol::try_from_val(env, &value).ok());
        if topic == Some(symbol_short!("prx_new")) {
            let (proxy, _label) = <(Address, String)>::try_from_val(env, &data).ok()?;
            found = Some(proxy);
        }
    }
    found
}
