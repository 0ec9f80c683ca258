/// Application constants

pub const API_VERSION: &str = "v1";

// Native token precision (18-decimal fixed point) and display precision
pub const NATIVE_TOKEN_DECIMALS: u32 = 18;
pub const DISPLAY_DECIMALS: u32 = 2;

// Ledger presentation
pub const BALANCE_PLACEHOLDER: &str = "Loading...";
pub const SHORT_ADDRESS_HEAD: usize = 6;
pub const SHORT_ADDRESS_TAIL: usize = 4;

// Ephemeral notices (added / duplicate) auto-dismiss after this many seconds
pub const DEFAULT_NOTICE_TTL_SECS: u64 = 3;

// Endpoints
pub const DEFAULT_ADDRESS_STORE_URL: &str = "https://x8ki-letl-twmt.n7.xano.io/api:wHmUZQ0X/tabela";
pub const DEFAULT_FALLBACK_RPC_URL: &str = "https://testnet.evm.nodes.onflow.org";

// Wallet provider JSON-RPC methods
pub const METHOD_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const METHOD_REQUEST_PERMISSIONS: &str = "wallet_requestPermissions";

// EIP-1193 "user rejected request"
pub const USER_REJECTED_CODE: i64 = 4001;
