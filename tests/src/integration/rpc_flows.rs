//! # JSON-RPC Flows
//!
//! Runs the pipeline through `RpcLedgerClient` against a node double that
//! speaks the ledger's JSON-RPC methods. The double rebuilds each submitted
//! block from its wire form and recomputes the hash with ab-01, so a field
//! encoded differently on the wire than in the hash shows up here.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use ab_01_block_hashing::compute_account_block_hash;
    use ab_02_block_submission::{
        BlockSigner, BlockSubmissionApi, Ed25519Signer, JsonRpcClient, RpcError,
        RpcLedgerClient, SubmissionConfig, SubmissionErrorKind, SubmissionService,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use primitive_types::U256;
    use serde_json::{json, Value};
    use shared_crypto::{Ed25519PublicKey, Ed25519Signature};
    use shared_types::{
        decode_base64, encode_base64, hash_from_hex, hash_to_hex, AccountBlock, Address, Amount,
        HashedBlock, Nonce, TokenId, ZERO_HASH,
    };

    // =============================================================================
    // NODE DOUBLE
    // =============================================================================

    #[derive(Default)]
    struct NodeState {
        heads: HashMap<String, (u64, String)>,
        balances: HashMap<String, String>,
        current_quota: u64,
        required_quota: u64,
        reject_next_send: Option<String>,
        calls: Vec<String>,
        sent: Vec<Value>,
    }

    #[derive(Default)]
    struct NodeDouble {
        state: Mutex<NodeState>,
    }

    fn field<'a>(raw: &'a Value, name: &str) -> Option<&'a str> {
        raw.get(name).and_then(Value::as_str)
    }

    fn server_error(message: &str) -> RpcError {
        RpcError::Server {
            code: -35002,
            message: message.to_string(),
        }
    }

    /// Rebuild a transfer block from its `ledger_sendRawTransaction` form.
    fn transfer_from_wire(raw: &Value) -> Result<AccountBlock, RpcError> {
        let malformed = |what: &str| server_error(&format!("malformed {what}"));
        let address: Address = field(raw, "address")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("address"))?;
        let to: Address = field(raw, "toAddress")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("toAddress"))?;
        let token: TokenId = field(raw, "tokenId")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("tokenId"))?;
        let amount = field(raw, "amount")
            .and_then(|s| Amount::from_dec_str(s).ok())
            .ok_or_else(|| malformed("amount"))?;

        let mut block = AccountBlock::transfer(address, to, token, amount);
        block.height = field(raw, "height")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("height"))?;
        let previous = field(raw, "previousHash")
            .and_then(|s| hash_from_hex(s).ok())
            .ok_or_else(|| malformed("previousHash"))?;
        block.previous_hash = (previous != ZERO_HASH).then_some(previous);
        block.fee = field(raw, "fee").and_then(|s| Amount::from_dec_str(s).ok());
        block.data = field(raw, "data").and_then(|s| decode_base64(s).ok());
        block.nonce = field(raw, "nonce").and_then(|s| Nonce::from_base64(s).ok());
        block.difficulty = field(raw, "difficulty").and_then(|s| U256::from_dec_str(s).ok());
        block.vmlog_hash = field(raw, "vmlogHash").and_then(|s| hash_from_hex(s).ok());
        if let Some(children) = raw.get("triggeredSendBlockList").and_then(Value::as_array) {
            block.triggered_send_blocks = children
                .iter()
                .map(rebuild_triggered)
                .collect::<Result<_, _>>()?;
        }
        Ok(block)
    }

    /// Rebuild a triggered send and check the hash it was announced with.
    fn rebuild_triggered(raw: &Value) -> Result<HashedBlock, RpcError> {
        let block = transfer_from_wire(raw)?;
        let hash = compute_account_block_hash(&block).map_err(|e| server_error(&e.to_string()))?;
        if field(raw, "hash") != Some(hash_to_hex(&hash).as_str()) {
            return Err(server_error("triggered block hash verify failure"));
        }
        Ok(HashedBlock { block, hash })
    }

    impl NodeDouble {
        fn send_raw(&self, raw: &Value) -> Result<Value, RpcError> {
            let mut state = self.state.lock();
            state.sent.push(raw.clone());
            if let Some(message) = state.reject_next_send.take() {
                return Err(server_error(&message));
            }

            let block = transfer_from_wire(raw)?;
            let hash = compute_account_block_hash(&block)
                .map_err(|e| server_error(&e.to_string()))?;
            if field(raw, "hash") != Some(hash_to_hex(&hash).as_str()) {
                return Err(server_error("hash verify failure"));
            }

            let public_key = field(raw, "publicKey")
                .and_then(|s| decode_base64(s).ok())
                .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
                .ok_or_else(|| server_error("malformed publicKey"))?;
            let signature = field(raw, "signature")
                .and_then(|s| decode_base64(s).ok())
                .and_then(|bytes| <[u8; 64]>::try_from(bytes).ok())
                .ok_or_else(|| server_error("malformed signature"))?;
            Ed25519PublicKey::from_bytes(public_key)
                .and_then(|key| key.verify(&hash, &Ed25519Signature::from_bytes(signature)))
                .map_err(|_| server_error("signature verify failure"))?;

            let account = block.address.to_string();
            let expected_previous = state
                .heads
                .get(&account)
                .map(|(_, hash)| hash.clone())
                .unwrap_or_else(|| hash_to_hex(&ZERO_HASH));
            if field(raw, "previousHash") != Some(expected_previous.as_str()) {
                return Err(server_error(
                    "verify prevBlock failed, incorrect use of prevHash or fork happened",
                ));
            }

            state
                .heads
                .insert(account, (block.height, hash_to_hex(&hash)));
            Ok(Value::Null)
        }
    }

    #[async_trait]
    impl JsonRpcClient for NodeDouble {
        async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
            self.state.lock().calls.push(method.to_string());
            match method {
                "ledger_getLatestAccountBlock" => {
                    let state = self.state.lock();
                    let address = params[0].as_str().unwrap_or_default();
                    Ok(state
                        .heads
                        .get(address)
                        .map(|(height, hash)| json!({"height": height.to_string(), "hash": hash}))
                        .unwrap_or(Value::Null))
                }
                "ledger_getAccountInfoByAddress" => {
                    let state = self.state.lock();
                    let address = params[0].as_str().unwrap_or_default();
                    let balance = state.balances.get(address).cloned().unwrap_or_else(|| "0".into());
                    let mut map = serde_json::Map::new();
                    map.insert(TokenId::vite().to_string(), json!({ "balance": balance }));
                    Ok(json!({ "address": address, "balanceInfoMap": map }))
                }
                "contract_getQuotaByAccount" => {
                    let state = self.state.lock();
                    Ok(json!({
                        "currentQuota": state.current_quota.to_string(),
                        "maxQuota": state.current_quota.to_string(),
                        "stakeAmount": "0"
                    }))
                }
                "ledger_getPoWDifficulty" => {
                    let state = self.state.lock();
                    Ok(json!({
                        "requiredQuota": state.required_quota.to_string(),
                        "difficulty": "67108863",
                        "qc": "1",
                        "isCongestion": false
                    }))
                }
                "util_getPoWNonce" => Ok(json!(encode_base64(&7u64.to_be_bytes()))),
                "ledger_sendRawTransaction" => self.send_raw(&params[0]),
                other => Err(RpcError::Transport(format!("unknown method {other}"))),
            }
        }
    }

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Rpc = RpcLedgerClient<NodeDouble>;

    fn setup(current_quota: u64) -> (Arc<Rpc>, SubmissionService, Ed25519Signer) {
        let signer = Ed25519Signer::from_seed([11; 32]);
        let node = NodeDouble::default();
        {
            let mut state = node.state.lock();
            state
                .balances
                .insert(signer.address().to_string(), "1000000000000000000000".into());
            state.current_quota = current_quota;
            state.required_quota = 21_000;
        }
        let rpc = Arc::new(RpcLedgerClient::new(node));
        let service = SubmissionService::new(
            rpc.clone(),
            rpc.clone(),
            rpc.clone(),
            SubmissionConfig::for_testing(),
        )
        .expect("valid config");
        (rpc, service, signer)
    }

    fn destination() -> Address {
        Ed25519Signer::from_seed([12; 32]).address()
    }

    fn one_vite() -> Amount {
        Amount::from_dec_str("1000000000000000000").unwrap()
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_transfers_round_trip_through_node() {
        let (rpc, service, signer) = setup(21_000);

        let first = service
            .transfer(&signer, destination(), TokenId::vite(), one_vite())
            .await
            .unwrap();
        let second = service
            .transfer(&signer, destination(), TokenId::vite(), one_vite())
            .await
            .unwrap();

        assert_eq!(first.height, 1);
        assert_eq!(second.height, 2);
        assert_eq!(second.previous_hash, Some(first.hash));

        let state = rpc.inner().state.lock();
        assert_eq!(
            state.heads.get(&signer.address().to_string()),
            Some(&(2, hash_to_hex(&second.hash)))
        );
        assert!(!state.calls.iter().any(|m| m == "util_getPoWNonce"));
    }

    #[tokio::test]
    async fn test_pow_nonce_reaches_the_wire() {
        let (rpc, service, signer) = setup(0);

        let receipt = service
            .transfer(&signer, destination(), TokenId::vite(), one_vite())
            .await
            .unwrap();

        assert!(receipt.pow_performed);
        let state = rpc.inner().state.lock();
        let raw = &state.sent[0];
        assert_eq!(raw["difficulty"], json!("67108863"));
        assert_eq!(raw["nonce"], json!(encode_base64(&7u64.to_be_bytes())));
        assert_eq!(raw["hash"], json!(hash_to_hex(&receipt.hash)));
    }

    #[tokio::test]
    async fn test_vmlog_and_triggered_sends_survive_the_wire() {
        let (rpc, service, signer) = setup(21_000);

        let mut child = AccountBlock::transfer(destination(), signer.address(), TokenId::vite(), Amount::from(3));
        child.height = 4;
        child.previous_hash = Some([0x5a; 32]);
        let child_hash = compute_account_block_hash(&child).unwrap();

        let mut draft = AccountBlock::transfer(signer.address(), destination(), TokenId::vite(), one_vite());
        draft.vmlog_hash = Some([0x11; 32]);
        draft.triggered_send_blocks = vec![HashedBlock {
            block: child,
            hash: child_hash,
        }];

        let receipt = service.build_and_submit(draft, &signer).await.unwrap();

        let state = rpc.inner().state.lock();
        assert_eq!(
            state.heads.get(&signer.address().to_string()),
            Some(&(1, hash_to_hex(&receipt.hash)))
        );
        let raw = &state.sent[0];
        assert_eq!(raw["vmlogHash"], json!(hash_to_hex(&[0x11; 32])));
        assert_eq!(
            raw["triggeredSendBlockList"][0]["hash"],
            json!(hash_to_hex(&child_hash))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fork_rejection_is_retried() {
        let (rpc, service, signer) = setup(21_000);
        rpc.inner().state.lock().reject_next_send =
            Some("verify prevBlock failed, incorrect use of prevHash or fork happened".into());

        let draft = AccountBlock::transfer(signer.address(), destination(), TokenId::vite(), one_vite());
        let outcome = service.submit_with_retry(draft, &signer).await;

        assert_eq!(outcome.attempts, 2);
        assert!(outcome.result.is_ok());
        assert_eq!(rpc.inner().state.lock().sent.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_rejection_is_not_retried() {
        let (rpc, service, signer) = setup(21_000);
        rpc.inner().state.lock().reject_next_send = Some("token id not exist".into());

        let draft = AccountBlock::transfer(signer.address(), destination(), TokenId::vite(), one_vite());
        let outcome = service.submit_with_retry(draft, &signer).await;

        assert_eq!(outcome.attempts, 1);
        let err = outcome.result.unwrap_err();
        assert!(!err.is_chain_conflict());
        assert!(matches!(err.kind(), Some(SubmissionErrorKind::Rejected(_))));
    }

    #[tokio::test]
    async fn test_overdraft_stops_before_linking() {
        let (rpc, service, signer) = setup(21_000);

        let err = service
            .transfer(
                &signer,
                destination(),
                TokenId::vite(),
                Amount::from_dec_str("1000000000000000000001").unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err.kind(),
            Some(SubmissionErrorKind::InsufficientBalance { .. })
        ));
        let state = rpc.inner().state.lock();
        assert_eq!(state.calls, vec!["ledger_getAccountInfoByAddress".to_string()]);
    }
}
