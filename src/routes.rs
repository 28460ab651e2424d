//! Explicit route table for the service API.
//!
//! Each [`Endpoint`] maps to one HTTP method and one path template. Path parameters are
//! carried by the variant and substituted by [`Endpoint::path`]. The responses are opaque to
//! this crate.

use reqwest::Method;

use crate::Result;
use crate::error::Error;

/// HTTP method and path template of an endpoint.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub template: &'static str,
}

impl Route {
    const fn new(method: Method, template: &'static str) -> Self {
        Self { method, template }
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Time,
    ServiceDetail {
        service_id: String,
    },

    // user requests
    UserRequest {
        request_session_token: String,
    },
    CommitUserRequest {
        request_session_token: String,
    },

    // service tokens
    ServiceTokens,
    ServiceToken {
        contract_id: String,
    },
    UpdateServiceToken {
        contract_id: String,
    },
    ServiceTokenHolders {
        contract_id: String,
    },
    MintServiceToken {
        contract_id: String,
    },
    BurnServiceToken {
        contract_id: String,
    },

    // transactions and memos
    Transaction {
        tx_hash: String,
    },
    SaveMemo,
    Memo {
        tx_hash: String,
    },

    // service wallets
    Wallets,
    Wallet {
        wallet_address: String,
    },
    WalletTransactions {
        wallet_address: String,
    },
    WalletBaseCoinBalance {
        wallet_address: String,
    },
    TransferBaseCoin {
        wallet_address: String,
    },
    WalletServiceTokenBalances {
        wallet_address: String,
    },
    WalletServiceTokenBalance {
        wallet_address: String,
        contract_id: String,
    },
    TransferServiceToken {
        wallet_address: String,
        contract_id: String,
    },
    WalletFungibleBalances {
        wallet_address: String,
        contract_id: String,
    },
    WalletFungibleBalance {
        wallet_address: String,
        contract_id: String,
        token_type: String,
    },
    TransferWalletFungible {
        wallet_address: String,
        contract_id: String,
        token_type: String,
    },
    WalletNonFungibleBalances {
        wallet_address: String,
        contract_id: String,
    },
    WalletNonFungibleBalancesByType {
        wallet_address: String,
        contract_id: String,
        token_type: String,
    },
    WalletNonFungibleBalance {
        wallet_address: String,
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    TransferWalletNonFungible {
        wallet_address: String,
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    BatchTransferWalletNonFungible {
        wallet_address: String,
        contract_id: String,
    },

    // item tokens
    ItemToken {
        contract_id: String,
    },
    FungibleTokens {
        contract_id: String,
    },
    CreateFungible {
        contract_id: String,
    },
    FungibleToken {
        contract_id: String,
        token_type: String,
    },
    UpdateFungible {
        contract_id: String,
        token_type: String,
    },
    FungibleTokenHolders {
        contract_id: String,
        token_type: String,
    },
    MintFungible {
        contract_id: String,
        token_type: String,
    },
    BurnFungible {
        contract_id: String,
        token_type: String,
    },
    NonFungibleTokenTypes {
        contract_id: String,
    },
    CreateNonFungibleType {
        contract_id: String,
    },
    MultiMintNonFungible {
        contract_id: String,
    },
    NonFungibleTokenType {
        contract_id: String,
        token_type: String,
    },
    UpdateNonFungibleTokenType {
        contract_id: String,
        token_type: String,
    },
    MintNonFungible {
        contract_id: String,
        token_type: String,
    },
    NonFungibleTokenTypeHolders {
        contract_id: String,
        token_type: String,
    },
    NonFungibleToken {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    UpdateNonFungibleToken {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    NonFungibleTokenHolder {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    BurnNonFungible {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    NonFungibleTokenChildren {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    NonFungibleTokenParent {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    NonFungibleTokenRoot {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    AttachNonFungible {
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    DetachNonFungible {
        contract_id: String,
        token_type: String,
        token_index: String,
    },

    // user wallets
    UserDetail {
        user_id: String,
    },
    UserTransactions {
        user_id: String,
    },
    UserBaseCoinBalance {
        user_id: String,
    },
    UserServiceTokenBalances {
        user_id: String,
    },
    UserServiceTokenBalance {
        user_id: String,
        contract_id: String,
    },
    UserFungibleBalances {
        user_id: String,
        contract_id: String,
    },
    UserFungibleBalance {
        user_id: String,
        contract_id: String,
        token_type: String,
    },
    TransferUserFungible {
        user_id: String,
        contract_id: String,
        token_type: String,
    },
    UserNonFungibleBalances {
        user_id: String,
        contract_id: String,
    },
    UserNonFungibleBalancesByType {
        user_id: String,
        contract_id: String,
        token_type: String,
    },
    UserNonFungibleBalance {
        user_id: String,
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    TransferUserNonFungible {
        user_id: String,
        contract_id: String,
        token_type: String,
        token_index: String,
    },
    BatchTransferUserNonFungible {
        user_id: String,
        contract_id: String,
    },

    // session tokens and proxies
    IssueBaseCoinTransferSession {
        user_id: String,
    },
    IssueServiceTokenTransferSession {
        user_id: String,
        contract_id: String,
    },
    IssueItemTokenProxySession {
        user_id: String,
        contract_id: String,
    },
    ItemTokenProxy {
        user_id: String,
        contract_id: String,
    },
}

impl Endpoint {
    #[must_use]
    pub fn route(&self) -> Route {
        const NON_FUNGIBLE: &str = "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}";

        match self {
            Endpoint::Time => Route::new(Method::GET, "/v1/time"),
            Endpoint::ServiceDetail { .. } => Route::new(Method::GET, "/v1/services/{serviceId}"),

            Endpoint::UserRequest { .. } => {
                Route::new(Method::GET, "/v1/user-requests/{requestSessionToken}")
            }
            Endpoint::CommitUserRequest { .. } => {
                Route::new(Method::PUT, "/v1/user-requests/{requestSessionToken}/commit")
            }

            Endpoint::ServiceTokens => Route::new(Method::GET, "/v1/service-tokens"),
            Endpoint::ServiceToken { .. } => {
                Route::new(Method::GET, "/v1/service-tokens/{contractId}")
            }
            Endpoint::UpdateServiceToken { .. } => {
                Route::new(Method::PUT, "/v1/service-tokens/{contractId}")
            }
            Endpoint::ServiceTokenHolders { .. } => {
                Route::new(Method::GET, "/v1/service-tokens/{contractId}/holders")
            }
            Endpoint::MintServiceToken { .. } => {
                Route::new(Method::POST, "/v1/service-tokens/{contractId}/mint")
            }
            Endpoint::BurnServiceToken { .. } => {
                Route::new(Method::POST, "/v1/service-tokens/{contractId}/burn")
            }

            Endpoint::Transaction { .. } => Route::new(Method::GET, "/v1/transactions/{txHash}"),
            Endpoint::SaveMemo => Route::new(Method::POST, "/v1/memos"),
            Endpoint::Memo { .. } => Route::new(Method::GET, "/v1/memos/{txHash}"),

            Endpoint::Wallets => Route::new(Method::GET, "/v1/wallets"),
            Endpoint::Wallet { .. } => Route::new(Method::GET, "/v1/wallets/{walletAddress}"),
            Endpoint::WalletTransactions { .. } => {
                Route::new(Method::GET, "/v1/wallets/{walletAddress}/transactions")
            }
            Endpoint::WalletBaseCoinBalance { .. } => {
                Route::new(Method::GET, "/v1/wallets/{walletAddress}/base-coin")
            }
            Endpoint::TransferBaseCoin { .. } => {
                Route::new(Method::POST, "/v1/wallets/{walletAddress}/base-coin/transfer")
            }
            Endpoint::WalletServiceTokenBalances { .. } => {
                Route::new(Method::GET, "/v1/wallets/{walletAddress}/service-tokens")
            }
            Endpoint::WalletServiceTokenBalance { .. } => Route::new(
                Method::GET,
                "/v1/wallets/{walletAddress}/service-tokens/{contractId}",
            ),
            Endpoint::TransferServiceToken { .. } => Route::new(
                Method::POST,
                "/v1/wallets/{walletAddress}/service-tokens/{contractId}/transfer",
            ),
            Endpoint::WalletFungibleBalances { .. } => Route::new(
                Method::GET,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/fungibles",
            ),
            Endpoint::WalletFungibleBalance { .. } => Route::new(
                Method::GET,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/fungibles/{tokenType}",
            ),
            Endpoint::TransferWalletFungible { .. } => Route::new(
                Method::POST,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/fungibles/{tokenType}/transfer",
            ),
            Endpoint::WalletNonFungibleBalances { .. } => Route::new(
                Method::GET,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/non-fungibles",
            ),
            Endpoint::WalletNonFungibleBalancesByType { .. } => Route::new(
                Method::GET,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/non-fungibles/{tokenType}",
            ),
            Endpoint::WalletNonFungibleBalance { .. } => Route::new(
                Method::GET,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}",
            ),
            Endpoint::TransferWalletNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/transfer",
            ),
            Endpoint::BatchTransferWalletNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/wallets/{walletAddress}/item-tokens/{contractId}/non-fungibles/batch-transfer",
            ),

            Endpoint::ItemToken { .. } => Route::new(Method::GET, "/v1/item-tokens/{contractId}"),
            Endpoint::FungibleTokens { .. } => {
                Route::new(Method::GET, "/v1/item-tokens/{contractId}/fungibles")
            }
            Endpoint::CreateFungible { .. } => {
                Route::new(Method::POST, "/v1/item-tokens/{contractId}/fungibles")
            }
            Endpoint::FungibleToken { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/fungibles/{tokenType}",
            ),
            Endpoint::UpdateFungible { .. } => Route::new(
                Method::PUT,
                "/v1/item-tokens/{contractId}/fungibles/{tokenType}",
            ),
            Endpoint::FungibleTokenHolders { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/fungibles/{tokenType}/holders",
            ),
            Endpoint::MintFungible { .. } => Route::new(
                Method::POST,
                "/v1/item-tokens/{contractId}/fungibles/{tokenType}/mint",
            ),
            Endpoint::BurnFungible { .. } => Route::new(
                Method::POST,
                "/v1/item-tokens/{contractId}/fungibles/{tokenType}/burn",
            ),
            Endpoint::NonFungibleTokenTypes { .. } => {
                Route::new(Method::GET, "/v1/item-tokens/{contractId}/non-fungibles")
            }
            Endpoint::CreateNonFungibleType { .. } => {
                Route::new(Method::POST, "/v1/item-tokens/{contractId}/non-fungibles")
            }
            Endpoint::MultiMintNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/item-tokens/{contractId}/non-fungibles/multi-mint",
            ),
            Endpoint::NonFungibleTokenType { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}",
            ),
            Endpoint::UpdateNonFungibleTokenType { .. } => Route::new(
                Method::PUT,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}",
            ),
            Endpoint::MintNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/mint",
            ),
            Endpoint::NonFungibleTokenTypeHolders { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/holders",
            ),
            Endpoint::NonFungibleToken { .. } => Route::new(Method::GET, NON_FUNGIBLE),
            Endpoint::UpdateNonFungibleToken { .. } => Route::new(Method::PUT, NON_FUNGIBLE),
            Endpoint::NonFungibleTokenHolder { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/holder",
            ),
            Endpoint::BurnNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/burn",
            ),
            Endpoint::NonFungibleTokenChildren { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/children",
            ),
            Endpoint::NonFungibleTokenParent { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/parent",
            ),
            Endpoint::NonFungibleTokenRoot { .. } => Route::new(
                Method::GET,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/root",
            ),
            Endpoint::AttachNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/parent",
            ),
            Endpoint::DetachNonFungible { .. } => Route::new(
                Method::DELETE,
                "/v1/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/parent",
            ),

            Endpoint::UserDetail { .. } => Route::new(Method::GET, "/v1/users/{userId}"),
            Endpoint::UserTransactions { .. } => {
                Route::new(Method::GET, "/v1/users/{userId}/transactions")
            }
            Endpoint::UserBaseCoinBalance { .. } => {
                Route::new(Method::GET, "/v1/users/{userId}/base-coin")
            }
            Endpoint::UserServiceTokenBalances { .. } => {
                Route::new(Method::GET, "/v1/users/{userId}/service-tokens")
            }
            Endpoint::UserServiceTokenBalance { .. } => {
                Route::new(Method::GET, "/v1/users/{userId}/service-tokens/{contractId}")
            }
            Endpoint::UserFungibleBalances { .. } => Route::new(
                Method::GET,
                "/v1/users/{userId}/item-tokens/{contractId}/fungibles",
            ),
            Endpoint::UserFungibleBalance { .. } => Route::new(
                Method::GET,
                "/v1/users/{userId}/item-tokens/{contractId}/fungibles/{tokenType}",
            ),
            Endpoint::TransferUserFungible { .. } => Route::new(
                Method::POST,
                "/v1/users/{userId}/item-tokens/{contractId}/fungibles/{tokenType}/transfer",
            ),
            Endpoint::UserNonFungibleBalances { .. } => Route::new(
                Method::GET,
                "/v1/users/{userId}/item-tokens/{contractId}/non-fungibles",
            ),
            Endpoint::UserNonFungibleBalancesByType { .. } => Route::new(
                Method::GET,
                "/v1/users/{userId}/item-tokens/{contractId}/non-fungibles/{tokenType}",
            ),
            Endpoint::UserNonFungibleBalance { .. } => Route::new(
                Method::GET,
                "/v1/users/{userId}/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}",
            ),
            Endpoint::TransferUserNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/users/{userId}/item-tokens/{contractId}/non-fungibles/{tokenType}/{tokenIndex}/transfer",
            ),
            Endpoint::BatchTransferUserNonFungible { .. } => Route::new(
                Method::POST,
                "/v1/users/{userId}/item-tokens/{contractId}/non-fungibles/batch-transfer",
            ),

            Endpoint::IssueBaseCoinTransferSession { .. } => {
                Route::new(Method::POST, "/v1/users/{userId}/base-coin/request-transfer")
            }
            Endpoint::IssueServiceTokenTransferSession { .. } => Route::new(
                Method::POST,
                "/v1/users/{userId}/service-tokens/{contractId}/request-transfer",
            ),
            Endpoint::IssueItemTokenProxySession { .. } => Route::new(
                Method::POST,
                "/v1/users/{userId}/item-tokens/{contractId}/request-proxy",
            ),
            Endpoint::ItemTokenProxy { .. } => Route::new(
                Method::GET,
                "/v1/users/{userId}/item-tokens/{contractId}/proxy",
            ),
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.route().method
    }

    fn bindings(&self) -> Vec<(&'static str, &str)> {
        match self {
            Endpoint::Time | Endpoint::ServiceTokens | Endpoint::SaveMemo | Endpoint::Wallets => {
                Vec::new()
            }
            Endpoint::ServiceDetail { service_id } => vec![("serviceId", service_id.as_str())],
            Endpoint::UserRequest {
                request_session_token,
            }
            | Endpoint::CommitUserRequest {
                request_session_token,
            } => vec![("requestSessionToken", request_session_token.as_str())],
            Endpoint::Transaction { tx_hash } | Endpoint::Memo { tx_hash } => {
                vec![("txHash", tx_hash.as_str())]
            }

            Endpoint::ServiceToken { contract_id }
            | Endpoint::UpdateServiceToken { contract_id }
            | Endpoint::ServiceTokenHolders { contract_id }
            | Endpoint::MintServiceToken { contract_id }
            | Endpoint::BurnServiceToken { contract_id }
            | Endpoint::ItemToken { contract_id }
            | Endpoint::FungibleTokens { contract_id }
            | Endpoint::CreateFungible { contract_id }
            | Endpoint::NonFungibleTokenTypes { contract_id }
            | Endpoint::CreateNonFungibleType { contract_id }
            | Endpoint::MultiMintNonFungible { contract_id } => {
                vec![("contractId", contract_id.as_str())]
            }
            Endpoint::FungibleToken {
                contract_id,
                token_type,
            }
            | Endpoint::UpdateFungible {
                contract_id,
                token_type,
            }
            | Endpoint::FungibleTokenHolders {
                contract_id,
                token_type,
            }
            | Endpoint::MintFungible {
                contract_id,
                token_type,
            }
            | Endpoint::BurnFungible {
                contract_id,
                token_type,
            }
            | Endpoint::NonFungibleTokenType {
                contract_id,
                token_type,
            }
            | Endpoint::UpdateNonFungibleTokenType {
                contract_id,
                token_type,
            }
            | Endpoint::MintNonFungible {
                contract_id,
                token_type,
            }
            | Endpoint::NonFungibleTokenTypeHolders {
                contract_id,
                token_type,
            } => vec![("contractId", contract_id.as_str()), ("tokenType", token_type.as_str())],
            Endpoint::NonFungibleToken {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::UpdateNonFungibleToken {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::NonFungibleTokenHolder {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::BurnNonFungible {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::NonFungibleTokenChildren {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::NonFungibleTokenParent {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::NonFungibleTokenRoot {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::AttachNonFungible {
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::DetachNonFungible {
                contract_id,
                token_type,
                token_index,
            } => vec![
                ("contractId", contract_id.as_str()),
                ("tokenType", token_type.as_str()),
                ("tokenIndex", token_index.as_str()),
            ],

            Endpoint::Wallet { wallet_address }
            | Endpoint::WalletTransactions { wallet_address }
            | Endpoint::WalletBaseCoinBalance { wallet_address }
            | Endpoint::TransferBaseCoin { wallet_address }
            | Endpoint::WalletServiceTokenBalances { wallet_address } => {
                vec![("walletAddress", wallet_address.as_str())]
            }
            Endpoint::WalletServiceTokenBalance {
                wallet_address,
                contract_id,
            }
            | Endpoint::TransferServiceToken {
                wallet_address,
                contract_id,
            }
            | Endpoint::WalletFungibleBalances {
                wallet_address,
                contract_id,
            }
            | Endpoint::WalletNonFungibleBalances {
                wallet_address,
                contract_id,
            }
            | Endpoint::BatchTransferWalletNonFungible {
                wallet_address,
                contract_id,
            } => vec![("walletAddress", wallet_address.as_str()), ("contractId", contract_id.as_str())],
            Endpoint::WalletFungibleBalance {
                wallet_address,
                contract_id,
                token_type,
            }
            | Endpoint::TransferWalletFungible {
                wallet_address,
                contract_id,
                token_type,
            }
            | Endpoint::WalletNonFungibleBalancesByType {
                wallet_address,
                contract_id,
                token_type,
            } => vec![
                ("walletAddress", wallet_address.as_str()),
                ("contractId", contract_id.as_str()),
                ("tokenType", token_type.as_str()),
            ],
            Endpoint::WalletNonFungibleBalance {
                wallet_address,
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::TransferWalletNonFungible {
                wallet_address,
                contract_id,
                token_type,
                token_index,
            } => vec![
                ("walletAddress", wallet_address.as_str()),
                ("contractId", contract_id.as_str()),
                ("tokenType", token_type.as_str()),
                ("tokenIndex", token_index.as_str()),
            ],

            Endpoint::UserDetail { user_id }
            | Endpoint::UserTransactions { user_id }
            | Endpoint::UserBaseCoinBalance { user_id }
            | Endpoint::UserServiceTokenBalances { user_id }
            | Endpoint::IssueBaseCoinTransferSession { user_id } => {
                vec![("userId", user_id.as_str())]
            }
            Endpoint::UserServiceTokenBalance {
                user_id,
                contract_id,
            }
            | Endpoint::UserFungibleBalances {
                user_id,
                contract_id,
            }
            | Endpoint::UserNonFungibleBalances {
                user_id,
                contract_id,
            }
            | Endpoint::BatchTransferUserNonFungible {
                user_id,
                contract_id,
            }
            | Endpoint::IssueServiceTokenTransferSession {
                user_id,
                contract_id,
            }
            | Endpoint::IssueItemTokenProxySession {
                user_id,
                contract_id,
            }
            | Endpoint::ItemTokenProxy {
                user_id,
                contract_id,
            } => vec![("userId", user_id.as_str()), ("contractId", contract_id.as_str())],
            Endpoint::UserFungibleBalance {
                user_id,
                contract_id,
                token_type,
            }
            | Endpoint::TransferUserFungible {
                user_id,
                contract_id,
                token_type,
            }
            | Endpoint::UserNonFungibleBalancesByType {
                user_id,
                contract_id,
                token_type,
            } => vec![
                ("userId", user_id.as_str()),
                ("contractId", contract_id.as_str()),
                ("tokenType", token_type.as_str()),
            ],
            Endpoint::UserNonFungibleBalance {
                user_id,
                contract_id,
                token_type,
                token_index,
            }
            | Endpoint::TransferUserNonFungible {
                user_id,
                contract_id,
                token_type,
                token_index,
            } => vec![
                ("userId", user_id.as_str()),
                ("contractId", contract_id.as_str()),
                ("tokenType", token_type.as_str()),
                ("tokenIndex", token_index.as_str()),
            ],
        }
    }

    /// Substitutes the path parameters into the route template.
    ///
    /// Values must be non-empty single path segments. Dot segments (`.`, `..` and their
    /// percent-encoded forms) are rejected since URL parsing would collapse them into a
    /// different route.
    pub fn path(&self) -> Result<String> {
        let route = self.route();
        let mut path = route.template.to_owned();

        for (name, value) in self.bindings() {
            validate_segment(name, value)?;

            let placeholder = format!("{{{name}}}");
            if !path.contains(&placeholder) {
                return Err(Error::validation(format!(
                    "path parameter `{name}` is not part of {}",
                    route.template
                )));
            }
            path = path.replace(&placeholder, value);
        }

        if path.contains('{') {
            return Err(Error::validation(format!(
                "unbound path parameter left in {path}"
            )));
        }

        Ok(path)
    }
}

fn validate_segment(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(format!(
            "path parameter `{name}` is empty"
        )));
    }
    if value.chars().any(|c| {
        matches!(c, '/' | '\\' | '?' | '#' | '{' | '}') || c.is_whitespace() || c.is_control()
    }) {
        return Err(Error::validation(format!(
            "path parameter `{name}` must be a single path segment, got `{value}`"
        )));
    }
    if is_dot_segment(value) {
        return Err(Error::validation(format!(
            "path parameter `{name}` must not be a dot segment, got `{value}`"
        )));
    }
    Ok(())
}

/// `.` and `..`, also when some dots are written as `%2e`.
fn is_dot_segment(value: &str) -> bool {
    let decoded = value.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
