// tests/common/mod.rs
#![allow(dead_code)]

use ethereum_types::{Address, U256};
use rollup_settlement::{BridgeAddresses, GenesisAccount, SettlementConfig};

pub const FINALIZATION_PERIOD: u64 = 24 * 60 * 60;
pub const PENDING_PERIOD: u64 = 24 * 60 * 60;

pub fn setup() {
    // Try init since multiple tests calling `init` will cause an error.
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn eth(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn proposer() -> Address {
    Address::repeat_byte(0x9e)
}

pub fn bridge_addresses() -> BridgeAddresses {
    BridgeAddresses {
        owner: Address::repeat_byte(0x0a),
        l1_bridge: Address::repeat_byte(0x11),
        l2_bridge: Address::repeat_byte(0x22),
    }
}

/// Genesis with A holding 1 ETH and B holding 2 ETH
pub fn two_account_config() -> SettlementConfig {
    let mut config = SettlementConfig::default();
    config.finalization_period = FINALIZATION_PERIOD;
    config.pending_period = PENDING_PERIOD;
    config.genesis.accounts = vec![
        GenesisAccount {
            address: alice(),
            balance: eth(1),
        },
        GenesisAccount {
            address: bob(),
            balance: eth(2),
        },
    ];
    config
}
