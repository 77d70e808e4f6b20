// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use ethers::types::Address;
use penguin_node::config::WalletConfig;
use penguin_node::pipeline::Session;
use penguin_node::wallet;

/// Connects the session to the configured key and prints the status line.
pub fn connect_session(session: &mut Session, cfg: &WalletConfig) -> anyhow::Result<Address> {
    match wallet::connect(cfg) {
        Ok(address) => {
            session.connect(address);
            println!("{}", session.status);
            Ok(address)
        }
        Err(e) => {
            session.connect_failed(&e);
            println!("{}", session.status);
            Err(e.into())
        }
    }
}

pub fn run(cfg: &WalletConfig) -> anyhow::Result<Address> {
    let mut session = Session::default();
    connect_session(&mut session, cfg)
}
