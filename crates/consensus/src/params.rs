//! Per-network chain parameters relevant to checkpointing.

use crate::constants::CHECKPOINTS_FILE_NAME;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Self::Mainnet),
            "testnet" | "test" => Some(Self::Testnet),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChainParams {
    /// Hardcoded `(height, hex hash)` pins, ascending by height.
    pub checkpoints: &'static [(u64, &'static str)],
    /// Domains whose TXT records publish additional checkpoints.
    pub checkpoint_dns_domains: &'static [&'static str],
    pub checkpoints_file_name: &'static str,
}

pub fn chain_params(network: Network) -> ChainParams {
    match network {
        Network::Mainnet => mainnet_chain_params(),
        Network::Testnet => testnet_chain_params(),
    }
}

const MAINNET_CHECKPOINT_DNS_DOMAINS: [&str; 1] = ["checkpoints.shangcoin.com"];
const TESTNET_CHECKPOINT_DNS_DOMAINS: [&str; 1] = ["testpoints.shangcoin.com"];

const MAINNET_CHECKPOINTS: [(u64, &str); 24] = [
    (
        0,
        "876f6313ea61cec03c444f9196219e7b186102a7baf26f77c164f9ac011a0e79",
    ),
    (
        1,
        "9964c7492db7ff26de975318d1a3c9396b971ec3f6839e8bffb083ab80b7be41",
    ),
    (
        5,
        "a0432b0ec103e4f5921eaea967fc1638d5dd62fd98b6ce75fae5aff3e6fd134f",
    ),
    (
        10,
        "7a59762b36d1928a314bf82b7a6030ae2709790284d063361c23c2deff89736d",
    ),
    (
        15,
        "c88c2cb74a3113ba8a4d9b29332db5163a6498e48c1c60f5271d38fb70e58a3a",
    ),
    (
        20,
        "7374c3cbf9ed82f870938718d4bd64724901e15f54ec44346dc1cf466eafe058",
    ),
    (
        25,
        "50d3fc0ca36f2e26e7ec24d66eac83e26e299754b09d81721da04c72177de80d",
    ),
    (
        35,
        "bde0ba793195f39c43924f5c977a1eca155c1ff2b8e9b409a4451f07fd42ef0f",
    ),
    (
        50,
        "d5fa39fbf87370c9d1aab09111a68939e3b6bcd8d595ab010b6664b7658ab13e",
    ),
    (
        75,
        "17c3679a9663d068fb5e5051b01f338ee0026b52b40a4249b574712874c0b6b2",
    ),
    (
        100,
        "db8ec1f162b0dd946db14d4d7519559014912eeecfd2e3ff9cad288188184efb",
    ),
    (
        150,
        "bb74291cc5e487a471b724f2f1743483473e535d7f0dbc3693fae3d6ac5d16ea",
    ),
    (
        200,
        "d84a68160cd5ae4310cf40cf05d54770776c63835cf3d08c2ac8f3a6ca7713b6",
    ),
    (
        300,
        "03779989ba9fc6a6f6de84b18a8f589d61be5dc6ddb02dbd08cd8c3f8df88813",
    ),
    (
        400,
        "4ec41449b361950f6b0103bc4710ebc5aa0da4dd0962eedc98ebc94a732452b9",
    ),
    (
        500,
        "c19c2333b4c799462c0d3d2341ef22f4081dcf163a21bcaeb5e3f3d267a096fa",
    ),
    (
        1000,
        "262447d5c02fc23c00e3003ee09e3267ced726ed03897976638a145ec9456423",
    ),
    (
        1500,
        "3f772b9988e712f249c759b7cc4df5ce435cb733c43a9b26136184f2ee9f227c",
    ),
    (
        2000,
        "e26984dd174ffc4f92b4c7ab64a59bda9fc92221603f0c198efcc45b6511d1a0",
    ),
    (
        3000,
        "df25e210cc793d96397a6e7ffa96946c90aa5055979edbafb97c3b871269c84d",
    ),
    (
        4000,
        "a3056bf96d43c3cfa3837cfdb16ba06746c57a1b26f947cfb6eebcc79868344e",
    ),
    (
        5000,
        "abe082de7d9b8c7f7e978e8cbb92ad9ece28d768486d1c4d9cd6b4ecb8ddc6ba",
    ),
    (
        6000,
        "8780939d3bb1aac66319f35d3c7624a005ecf8cadbeb9b07b3778b90006a0714",
    ),
    (
        7000,
        "1f539428218f5ebc7e01ead7fbff54f8eb04f3231f5effb66d4bb7b6629b991e",
    ),
];

fn mainnet_chain_params() -> ChainParams {
    ChainParams {
        checkpoints: &MAINNET_CHECKPOINTS,
        checkpoint_dns_domains: &MAINNET_CHECKPOINT_DNS_DOMAINS,
        checkpoints_file_name: CHECKPOINTS_FILE_NAME,
    }
}

fn testnet_chain_params() -> ChainParams {
    // Testnet ships without pins; operators supply them via file or DNS.
    ChainParams {
        checkpoints: &[],
        checkpoint_dns_domains: &TESTNET_CHECKPOINT_DNS_DOMAINS,
        checkpoints_file_name: CHECKPOINTS_FILE_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{hash256_from_hex, hash256_to_hex};

    #[test]
    fn mainnet_checkpoints_are_well_formed() {
        let params = chain_params(Network::Mainnet);

        assert_eq!(params.checkpoints.len(), 24);
        assert_eq!(params.checkpoints[0].0, 0);
        let genesis = hash256_from_hex(params.checkpoints[0].1).expect("genesis hash");
        assert_eq!(
            hash256_to_hex(&genesis),
            "876f6313ea61cec03c444f9196219e7b186102a7baf26f77c164f9ac011a0e79"
        );

        let last = params.checkpoints.last().expect("checkpoint");
        assert_eq!(last.0, 7_000);

        for window in params.checkpoints.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
        for (height, hash) in params.checkpoints {
            assert!(hash256_from_hex(hash).is_ok(), "bad hash at {height}");
        }
    }

    #[test]
    fn dns_domains_differ_per_network() {
        let main = chain_params(Network::Mainnet);
        let test = chain_params(Network::Testnet);
        assert_eq!(main.checkpoint_dns_domains, ["checkpoints.shangcoin.com"]);
        assert_eq!(test.checkpoint_dns_domains, ["testpoints.shangcoin.com"]);
        assert!(test.checkpoints.is_empty());
    }

    #[test]
    fn parse_network() {
        assert_eq!(Network::parse("mainnet"), Some(Network::Mainnet));
        assert_eq!(Network::parse("TESTNET"), Some(Network::Testnet));
        assert_eq!(Network::parse("regtest"), None);
        assert_eq!(Network::parse(Network::Testnet.as_str()), Some(Network::Testnet));
    }
}
