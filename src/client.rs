//! HTTP client wrapping the signing pipeline.
//!
//! Every call goes through the same ordered stages:
//!
//! 1. finalize method, path, query and body ([`Client::prepare`]),
//! 2. sign them with a fresh nonce and timestamp,
//! 3. merge the auth headers into the caller's headers,
//! 4. dispatch exactly once ([`Client::send`], which consumes the [`PreparedRequest`]).

use std::collections::BTreeMap;

use reqwest::Client as ReqwestClient;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::{
    AuthHeaders, Credentials, Nonce, SigningRequest, TIMESTAMP_HEADER, now_millis, sign,
};
use crate::config::Config;
use crate::error::{Error, Kind};
use crate::routes::Endpoint;
use crate::types::{GenericResponse, PageRequest, RequestType};
use crate::{Result, Timestamp};

/// One API call before it is finalized.
#[non_exhaustive]
#[derive(Clone, Debug, bon::Builder)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    #[builder(default)]
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    /// Extra headers; any not used for authentication are sent untouched.
    #[builder(default)]
    pub headers: HeaderMap,
    /// Fixed nonce instead of a freshly generated one.
    pub nonce: Option<Nonce>,
    /// Fixed timestamp instead of the current time.
    pub timestamp: Option<Timestamp>,
}

/// A finalized and signed request, ready to be dispatched once.
#[derive(Debug)]
pub struct PreparedRequest {
    request: reqwest::Request,
    auth: AuthHeaders,
}

impl PreparedRequest {
    #[must_use]
    pub fn request(&self) -> &reqwest::Request {
        &self.request
    }

    #[must_use]
    pub fn auth_headers(&self) -> &AuthHeaders {
        &self.auth
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    credentials: Credentials,
    client: ReqwestClient,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Self::with_client(config, builder.build()?)
    }

    /// Creates a client that dispatches through a caller supplied HTTP client.
    pub fn with_client(config: Config, client: ReqwestClient) -> Result<Self> {
        config.credentials.validate()?;

        Ok(Self {
            host: config.host,
            credentials: config.credentials,
            client,
        })
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Finalizes and signs `request` without sending it.
    ///
    /// The body value that gets signed is the one serialized into the request, so signature and
    /// content cannot drift apart.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip_all,
            fields(endpoint = ?request.endpoint, nonce, timestamp)
        )
    )]
    pub fn prepare(&self, request: ApiRequest) -> Result<PreparedRequest> {
        let ApiRequest {
            endpoint,
            query,
            body,
            mut headers,
            nonce,
            timestamp,
        } = request;

        let method = endpoint.method();
        let url = self.endpoint_url(&endpoint)?;

        let timestamp = match timestamp {
            Some(timestamp) => timestamp,
            None => match caller_timestamp(&headers)? {
                Some(timestamp) => timestamp,
                None => now_millis()?,
            },
        };
        let nonce = nonce.unwrap_or_else(Nonce::generate);

        #[cfg(feature = "tracing")]
        {
            let span = tracing::Span::current();
            span.record("nonce", nonce.as_str());
            span.record("timestamp", timestamp);
        }

        let signing = SigningRequest::builder()
            .method(method.as_str())
            .path(url.path())
            .timestamp(timestamp)
            .nonce(nonce)
            .query(query)
            .maybe_body(body)
            .build()?;
        let auth = sign(&self.credentials, &signing)?;
        auth.merge_into(&mut headers)?;

        let mut builder = self.client.request(method, url).headers(headers);
        if !signing.query().is_empty() {
            builder = builder.query(signing.query());
        }
        if let Some(body) = signing.body() {
            builder = builder.json(body);
        }

        Ok(PreparedRequest {
            request: builder.build()?,
            auth,
        })
    }

    /// Dispatches a prepared request. Consuming it makes re-signing impossible.
    pub async fn send<Response: DeserializeOwned>(
        &self,
        prepared: PreparedRequest,
    ) -> Result<Response> {
        crate::request(&self.client, prepared.request).await
    }

    pub async fn execute<Response: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Response> {
        let prepared = self.prepare(request)?;
        self.send(prepared).await
    }

    /// Signs an externally built request with a fresh nonce and the current time.
    pub fn sign_request(&self, request: &reqwest::Request) -> Result<AuthHeaders> {
        let timestamp = match caller_timestamp(request.headers())? {
            Some(timestamp) => timestamp,
            None => now_millis()?,
        };
        let signing = SigningRequest::from_request(request, timestamp, Nonce::generate())?;

        sign(&self.credentials, &signing)
    }

    /// Signs an externally built request in place and dispatches it.
    pub async fn sign_and_send<Response: DeserializeOwned>(
        &self,
        mut request: reqwest::Request,
    ) -> Result<Response> {
        let auth = self.sign_request(&request)?;
        auth.merge_into(request.headers_mut())?;

        crate::request(&self.client, request).await
    }

    fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url> {
        let path = format!(
            "{}{}",
            self.host.path().trim_end_matches('/'),
            endpoint.path()?
        );
        let mut url = self.host.clone();
        url.set_path(&path);

        // URL normalization must not merge or split segments, or the request would reach and
        // be signed for another route.
        let expected = path.split('/').count() - 1;
        if url.path_segments().map_or(0, Iterator::count) != expected {
            return Err(Error::validation(format!(
                "path {path} does not survive URL normalization (became {})",
                url.path()
            )));
        }

        Ok(url)
    }

    async fn call<Response: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: BTreeMap<String, String>,
        body: Option<Value>,
    ) -> Result<GenericResponse<Response>> {
        self.execute(
            ApiRequest::builder()
                .endpoint(endpoint)
                .query(query)
                .maybe_body(body)
                .build(),
        )
        .await
    }

    async fn get(&self, endpoint: Endpoint) -> Result<GenericResponse<Value>> {
        self.call(endpoint, BTreeMap::new(), None).await
    }

    async fn get_page(
        &self,
        endpoint: Endpoint,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.call(endpoint, page.to_query(), None).await
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write_with_query(endpoint, BTreeMap::new(), body).await
    }

    async fn write_with_query<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        query: BTreeMap<String, String>,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        let body = serde_json::to_value(body).map_err(|e| Error::with_source(Kind::Encoding, e))?;
        self.call(endpoint, query, Some(body)).await
    }

    /// Server time; useful to check connectivity and clock skew.
    pub async fn time(&self) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::Time).await
    }

    pub async fn service_detail(&self, service_id: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::ServiceDetail {
            service_id: service_id.to_owned(),
        })
        .await
    }

    pub async fn user_request(
        &self,
        request_session_token: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::UserRequest {
            request_session_token: request_session_token.to_owned(),
        })
        .await
    }

    pub async fn commit_user_request(
        &self,
        request_session_token: &str,
    ) -> Result<GenericResponse<Value>> {
        self.call(
            Endpoint::CommitUserRequest {
                request_session_token: request_session_token.to_owned(),
            },
            BTreeMap::new(),
            None,
        )
        .await
    }

    pub async fn service_tokens(&self) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::ServiceTokens).await
    }

    pub async fn service_token(&self, contract_id: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::ServiceToken {
            contract_id: contract_id.to_owned(),
        })
        .await
    }

    pub async fn update_service_token<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::UpdateServiceToken {
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn service_token_holders(
        &self,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::ServiceTokenHolders {
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn mint_service_token<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::MintServiceToken {
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn burn_service_token<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::BurnServiceToken {
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn transaction(&self, tx_hash: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::Transaction {
            tx_hash: tx_hash.to_owned(),
        })
        .await
    }

    pub async fn save_memo<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(Endpoint::SaveMemo, body).await
    }

    pub async fn memo(&self, tx_hash: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::Memo {
            tx_hash: tx_hash.to_owned(),
        })
        .await
    }

    pub async fn wallets(&self) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::Wallets).await
    }

    pub async fn wallet(&self, wallet_address: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::Wallet {
            wallet_address: wallet_address.to_owned(),
        })
        .await
    }

    /// Transactions of a wallet; `filters` (e.g. `msgType`) are added to the paging query.
    pub async fn wallet_transactions(
        &self,
        wallet_address: &str,
        page: &PageRequest,
        filters: &BTreeMap<String, String>,
    ) -> Result<GenericResponse<Value>> {
        let mut query = page.to_query();
        query.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.call(
            Endpoint::WalletTransactions {
                wallet_address: wallet_address.to_owned(),
            },
            query,
            None,
        )
        .await
    }

    pub async fn wallet_base_coin_balance(
        &self,
        wallet_address: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::WalletBaseCoinBalance {
            wallet_address: wallet_address.to_owned(),
        })
        .await
    }

    pub async fn transfer_base_coin<B: Serialize + ?Sized>(
        &self,
        wallet_address: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::TransferBaseCoin {
                wallet_address: wallet_address.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn wallet_service_token_balances(
        &self,
        wallet_address: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::WalletServiceTokenBalances {
                wallet_address: wallet_address.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn wallet_service_token_balance(
        &self,
        wallet_address: &str,
        contract_id: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::WalletServiceTokenBalance {
            wallet_address: wallet_address.to_owned(),
            contract_id: contract_id.to_owned(),
        })
        .await
    }

    pub async fn transfer_service_token<B: Serialize + ?Sized>(
        &self,
        wallet_address: &str,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::TransferServiceToken {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn wallet_fungible_balances(
        &self,
        wallet_address: &str,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::WalletFungibleBalances {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn wallet_fungible_balance(
        &self,
        wallet_address: &str,
        contract_id: &str,
        token_type: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::WalletFungibleBalance {
            wallet_address: wallet_address.to_owned(),
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
        })
        .await
    }

    pub async fn transfer_wallet_fungible<B: Serialize + ?Sized>(
        &self,
        wallet_address: &str,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::TransferWalletFungible {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn wallet_non_fungible_balances(
        &self,
        wallet_address: &str,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::WalletNonFungibleBalances {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn wallet_non_fungible_balances_by_type(
        &self,
        wallet_address: &str,
        contract_id: &str,
        token_type: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::WalletNonFungibleBalancesByType {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn wallet_non_fungible_balance(
        &self,
        wallet_address: &str,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::WalletNonFungibleBalance {
            wallet_address: wallet_address.to_owned(),
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
            token_index: token_index.to_owned(),
        })
        .await
    }

    pub async fn transfer_wallet_non_fungible<B: Serialize + ?Sized>(
        &self,
        wallet_address: &str,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::TransferWalletNonFungible {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            body,
        )
        .await
    }

    /// Transfers several non-fungibles of one contract; the body carries `transferList`.
    pub async fn batch_transfer_wallet_non_fungible<B: Serialize + ?Sized>(
        &self,
        wallet_address: &str,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::BatchTransferWalletNonFungible {
                wallet_address: wallet_address.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn item_token(&self, contract_id: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::ItemToken {
            contract_id: contract_id.to_owned(),
        })
        .await
    }

    pub async fn fungible_tokens(
        &self,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::FungibleTokens {
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn fungible_token(
        &self,
        contract_id: &str,
        token_type: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::FungibleToken {
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
        })
        .await
    }

    pub async fn non_fungible_token(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::NonFungibleToken {
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
            token_index: token_index.to_owned(),
        })
        .await
    }

    pub async fn update_non_fungible_token<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::UpdateNonFungibleToken {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn create_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::CreateFungible {
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn update_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::UpdateFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn fungible_token_holders(
        &self,
        contract_id: &str,
        token_type: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::FungibleTokenHolders {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn mint_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::MintFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn burn_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::BurnFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn non_fungible_token_types(
        &self,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::NonFungibleTokenTypes {
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn create_non_fungible_type<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::CreateNonFungibleType {
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    /// A token type together with a page of its tokens.
    pub async fn non_fungible_token_type(
        &self,
        contract_id: &str,
        token_type: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::NonFungibleTokenType {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn update_non_fungible_token_type<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::UpdateNonFungibleTokenType {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn non_fungible_token_type_holders(
        &self,
        contract_id: &str,
        token_type: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::NonFungibleTokenTypeHolders {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn non_fungible_token_holder(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::NonFungibleTokenHolder {
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
            token_index: token_index.to_owned(),
        })
        .await
    }

    pub async fn mint_non_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::MintNonFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    /// Mints several non-fungibles at once; the body carries `mintList`.
    pub async fn multi_mint_non_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::MultiMintNonFungible {
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn burn_non_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::BurnNonFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn non_fungible_token_children(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::NonFungibleTokenChildren {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn non_fungible_token_parent(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::NonFungibleTokenParent {
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
            token_index: token_index.to_owned(),
        })
        .await
    }

    pub async fn non_fungible_token_root(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::NonFungibleTokenRoot {
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
            token_index: token_index.to_owned(),
        })
        .await
    }

    /// Attaches the token to the parent named in the body (`parentTokenId`).
    pub async fn attach_non_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::AttachNonFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            body,
        )
        .await
    }

    /// Detaches the token from its parent. Sent as a `DELETE` with a signed body.
    pub async fn detach_non_fungible<B: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::DetachNonFungible {
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn user_detail(&self, user_id: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::UserDetail {
            user_id: user_id.to_owned(),
        })
        .await
    }

    pub async fn user_transactions(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::UserTransactions {
                user_id: user_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn user_base_coin_balance(&self, user_id: &str) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::UserBaseCoinBalance {
            user_id: user_id.to_owned(),
        })
        .await
    }

    pub async fn user_service_token_balances(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::UserServiceTokenBalances {
                user_id: user_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn user_service_token_balance(
        &self,
        user_id: &str,
        contract_id: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::UserServiceTokenBalance {
            user_id: user_id.to_owned(),
            contract_id: contract_id.to_owned(),
        })
        .await
    }

    pub async fn user_fungible_balances(
        &self,
        user_id: &str,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::UserFungibleBalances {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn user_fungible_balance(
        &self,
        user_id: &str,
        contract_id: &str,
        token_type: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::UserFungibleBalance {
            user_id: user_id.to_owned(),
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
        })
        .await
    }

    pub async fn transfer_user_fungible<B: Serialize + ?Sized>(
        &self,
        user_id: &str,
        contract_id: &str,
        token_type: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::TransferUserFungible {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn user_non_fungible_balances(
        &self,
        user_id: &str,
        contract_id: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::UserNonFungibleBalances {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn user_non_fungible_balances_by_type(
        &self,
        user_id: &str,
        contract_id: &str,
        token_type: &str,
        page: &PageRequest,
    ) -> Result<GenericResponse<Value>> {
        self.get_page(
            Endpoint::UserNonFungibleBalancesByType {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
            },
            page,
        )
        .await
    }

    pub async fn user_non_fungible_balance(
        &self,
        user_id: &str,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::UserNonFungibleBalance {
            user_id: user_id.to_owned(),
            contract_id: contract_id.to_owned(),
            token_type: token_type.to_owned(),
            token_index: token_index.to_owned(),
        })
        .await
    }

    pub async fn transfer_user_non_fungible<B: Serialize + ?Sized>(
        &self,
        user_id: &str,
        contract_id: &str,
        token_type: &str,
        token_index: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::TransferUserNonFungible {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
                token_type: token_type.to_owned(),
                token_index: token_index.to_owned(),
            },
            body,
        )
        .await
    }

    pub async fn batch_transfer_user_non_fungible<B: Serialize + ?Sized>(
        &self,
        user_id: &str,
        contract_id: &str,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write(
            Endpoint::BatchTransferUserNonFungible {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            body,
        )
        .await
    }

    /// Starts a user request for a base coin transfer; the user confirms it by
    /// `request_type`, after which [`Client::commit_user_request`] completes it.
    pub async fn issue_base_coin_transfer_session(
        &self,
        user_id: &str,
        request_type: RequestType,
    ) -> Result<GenericResponse<Value>> {
        self.call(
            Endpoint::IssueBaseCoinTransferSession {
                user_id: user_id.to_owned(),
            },
            request_type.to_query(),
            None,
        )
        .await
    }

    pub async fn issue_service_token_transfer_session<B: Serialize + ?Sized>(
        &self,
        user_id: &str,
        contract_id: &str,
        request_type: RequestType,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write_with_query(
            Endpoint::IssueServiceTokenTransferSession {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            request_type.to_query(),
            body,
        )
        .await
    }

    /// Asks the user to let the service act as proxy for an item token contract.
    pub async fn issue_item_token_proxy_session<B: Serialize + ?Sized>(
        &self,
        user_id: &str,
        contract_id: &str,
        request_type: RequestType,
        body: &B,
    ) -> Result<GenericResponse<Value>> {
        self.write_with_query(
            Endpoint::IssueItemTokenProxySession {
                user_id: user_id.to_owned(),
                contract_id: contract_id.to_owned(),
            },
            request_type.to_query(),
            body,
        )
        .await
    }

    /// Whether the service is proxy of the user's item token contract.
    pub async fn item_token_proxy(
        &self,
        user_id: &str,
        contract_id: &str,
    ) -> Result<GenericResponse<Value>> {
        self.get(Endpoint::ItemTokenProxy {
            user_id: user_id.to_owned(),
            contract_id: contract_id.to_owned(),
        })
        .await
    }
}

/// A `timestamp` header set by the caller is honoured as the signing time.
fn caller_timestamp(headers: &HeaderMap) -> Result<Option<Timestamp>> {
    headers
        .get(&TIMESTAMP_HEADER)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|text| text.parse::<Timestamp>().ok())
                .ok_or_else(|| {
                    Error::validation("caller supplied `timestamp` header is not decimal millis")
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    const SECRET: &str = "9256bf8a-2b86-42fe-b3e0-d3079d0141fe";

    fn client(host: &str) -> Client {
        let config = Config::from_raw(
            host,
            "136db0ec-0390-45a4-8b4c-f5b8b1b0a6a2",
            SecretString::from(SECRET),
        )
        .expect("valid config");
        Client::new(config).expect("client builds")
    }

    fn fixed(endpoint: Endpoint, body: Option<Value>) -> ApiRequest {
        ApiRequest::builder()
            .endpoint(endpoint)
            .maybe_body(body)
            .nonce("Bp0IqgXE".parse().expect("valid nonce"))
            .timestamp(1_581_850_266_351)
            .build()
    }

    #[test]
    fn prepare_reproduces_known_vector() {
        let prepared = client("https://test-api.blockchain.line.me")
            .prepare(fixed(Endpoint::Wallets, None))
            .expect("prepares");

        let headers = prepared.request().headers();
        assert_eq!(headers["service-api-key"], "136db0ec-0390-45a4-8b4c-f5b8b1b0a6a2");
        assert_eq!(headers["nonce"], "Bp0IqgXE");
        assert_eq!(headers["timestamp"], "1581850266351");
        assert_eq!(
            headers["signature"],
            "2LtyRNI16y/5/RdoTB65sfLkO0OSJ4pCuz2+ar0npkRbk1/dqq1fbt1FZo7fueQl1umKWWlBGu/53KD2cptcCA=="
        );
        assert_eq!(prepared.request().url().path(), "/v1/wallets");
    }

    #[test]
    fn client_is_shareable_across_tasks() {
        fn assert_shareable<T: Clone + Send + Sync>() {}
        assert_shareable::<Client>();
    }

    #[test]
    fn prepare_is_deterministic_for_fixed_inputs() {
        let client = client("https://test-api.blockchain.line.me");
        let build = || {
            fixed(
                Endpoint::SaveMemo,
                Some(json!({ "memo": "hello", "walletAddress": "tlink1" })),
            )
        };

        let first = client.prepare(build()).expect("prepares");
        let second = client.prepare(build()).expect("prepares");
        assert_eq!(first.auth_headers(), second.auth_headers());
    }

    #[test]
    fn prepare_signs_the_body_it_sends() {
        let prepared = client("https://test-api.blockchain.line.me")
            .prepare(fixed(
                Endpoint::SaveMemo,
                Some(json!({ "walletAddress": "tlink1", "memo": "hello" })),
            ))
            .expect("prepares");

        let sent = prepared
            .request()
            .body()
            .and_then(reqwest::Body::as_bytes)
            .expect("buffered body");
        let sent: Value = serde_json::from_slice(sent).expect("json body");
        assert_eq!(sent, json!({ "walletAddress": "tlink1", "memo": "hello" }));
    }

    #[test]
    fn base_path_prefix_is_kept_and_signed() {
        let prepared = client("https://gateway.example.com/link/")
            .prepare(fixed(Endpoint::Time, None))
            .expect("prepares");

        assert_eq!(prepared.request().url().path(), "/link/v1/time");
    }

    #[test]
    fn dot_segment_parameter_is_never_signed() {
        let client = client("https://gateway.example.com/link/");

        for wallet_address in ["..", ".", "%2e%2E"] {
            let err = client
                .prepare(fixed(
                    Endpoint::TransferBaseCoin {
                        wallet_address: wallet_address.to_owned(),
                    },
                    Some(json!({ "toAddress": "tlink1", "amount": "1" })),
                ))
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Validation, "`{wallet_address}` was accepted");
        }
    }

    #[test]
    fn endpoint_url_keeps_every_segment() {
        let url = client("https://gateway.example.com/link/")
            .endpoint_url(&Endpoint::WalletNonFungibleBalance {
                wallet_address: "tlink1".to_owned(),
                contract_id: "61e14383".to_owned(),
                token_type: "10000001".to_owned(),
                token_index: "a..b".to_owned(),
            })
            .expect("builds");

        assert_eq!(
            url.path(),
            "/link/v1/wallets/tlink1/item-tokens/61e14383/non-fungibles/10000001/a..b"
        );
    }

    #[test]
    fn session_issuance_sends_request_type_query() {
        let prepared = client("https://test-api.blockchain.line.me")
            .prepare(
                ApiRequest::builder()
                    .endpoint(Endpoint::IssueServiceTokenTransferSession {
                        user_id: "U1".to_owned(),
                        contract_id: "a48f097b".to_owned(),
                    })
                    .query(RequestType::Aoa.to_query())
                    .body(json!({ "toAddress": "tlink1", "amount": "1" }))
                    .build(),
            )
            .expect("prepares");

        assert_eq!(prepared.request().method(), reqwest::Method::POST);
        assert_eq!(prepared.request().url().query(), Some("requestType=aoa"));
    }

    #[test]
    fn fresh_nonce_per_prepare() {
        let client = client("https://test-api.blockchain.line.me");
        let first = client
            .prepare(ApiRequest::builder().endpoint(Endpoint::Wallets).build())
            .expect("prepares");
        let second = client
            .prepare(ApiRequest::builder().endpoint(Endpoint::Wallets).build())
            .expect("prepares");

        assert_ne!(first.auth_headers().nonce(), second.auth_headers().nonce());
    }

    #[test]
    fn caller_timestamp_header_is_adopted() {
        let mut headers = HeaderMap::new();
        headers.insert("timestamp", HeaderValue::from_static("1581850266351"));
        headers.insert("x-trace", HeaderValue::from_static("1"));

        let prepared = client("https://test-api.blockchain.line.me")
            .prepare(
                ApiRequest::builder()
                    .endpoint(Endpoint::Wallets)
                    .headers(headers)
                    .nonce("Bp0IqgXE".parse().expect("valid nonce"))
                    .build(),
            )
            .expect("prepares");

        assert_eq!(prepared.auth_headers().timestamp(), 1_581_850_266_351);
        assert_eq!(prepared.request().headers()["x-trace"], "1");
        assert_eq!(
            prepared.auth_headers().signature(),
            "2LtyRNI16y/5/RdoTB65sfLkO0OSJ4pCuz2+ar0npkRbk1/dqq1fbt1FZo7fueQl1umKWWlBGu/53KD2cptcCA=="
        );
    }

    #[test]
    fn conflicting_caller_header_fails_before_dispatch() {
        let mut headers = HeaderMap::new();
        headers.insert("nonce", HeaderValue::from_static("AAAAAAAA"));

        let err = client("https://test-api.blockchain.line.me")
            .prepare(
                ApiRequest::builder()
                    .endpoint(Endpoint::Wallets)
                    .headers(headers)
                    .build(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn unsignable_body_fails_locally() {
        let err = client("https://test-api.blockchain.line.me")
            .prepare(fixed(
                Endpoint::SaveMemo,
                Some(json!({ "memo": { "nested": true } })),
            ))
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Encoding);
        assert!(err.is_signing_failure(), "encoding errors are local");
    }

    #[test]
    fn sign_request_matches_prepare() {
        let client = client("https://test-api.blockchain.line.me");
        let mut headers = HeaderMap::new();
        headers.insert("timestamp", HeaderValue::from_static("1611243023551"));

        let request = reqwest::Client::new()
            .get("https://test-api.blockchain.line.me/v1/service-tokens/a48f097b/holders?page=1&limit=10&orderBy=desc")
            .headers(headers)
            .build()
            .expect("request builds");

        let auth = client.sign_request(&request).expect("signs");
        assert_eq!(auth.timestamp(), 1_611_243_023_551);
        assert_eq!(auth.nonce().as_str().len(), 8);
    }
}
