//! # Pipeline Flows
//!
//! Drives the submission pipeline against the in-memory ledger, which checks
//! every submitted block like a node would: linkage against the head, hash
//! recomputed by ab-01, Ed25519 signature over the hash.
//!
//! ## Flows Tested:
//!
//! 1. **Send → Receive**: a transfer from A answered by a receive on B
//! 2. **Quota shortage**: PoW nonce and difficulty land in the hashed block
//! 3. **Stale head**: a chain conflict is retried and re-linked
//! 4. **Batch isolation**: a failing receiver does not stop the others

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ab_01_block_hashing::{compute_account_block_hash, pow_challenge};
    use ab_02_block_submission::test_utils::{FixedPowSolver, InMemoryLedger, StaticSigner};
    use ab_02_block_submission::{
        BatchDispatcher, BlockSigner, BlockSubmissionApi, ChainHead, Receiver, RetryPolicy,
        SubmissionConfig, SubmissionErrorKind, SubmissionService, TransportError,
    };
    use primitive_types::U256;
    use shared_types::{Amount, BlockBody, TokenId};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const DIFFICULTY: u64 = 67_108_863;

    struct Harness {
        ledger: Arc<InMemoryLedger>,
        pow: Arc<FixedPowSolver>,
        service: Arc<SubmissionService>,
    }

    fn harness(config: SubmissionConfig) -> Harness {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_requirement(21_000, Some(U256::from(DIFFICULTY)));
        let pow = Arc::new(FixedPowSolver::new(0x2a));
        let service = SubmissionService::new(ledger.clone(), pow.clone(), ledger.clone(), config)
            .expect("valid config");
        Harness {
            ledger,
            pow,
            service: Arc::new(service),
        }
    }

    fn funded(h: &Harness, seed: u8, quota: u64) -> StaticSigner {
        let signer = StaticSigner::new(seed);
        h.ledger
            .set_balance(signer.address(), TokenId::vite(), Amount::from(1_000_000));
        h.ledger.set_quota(signer.address(), quota);
        signer
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_send_then_receive() {
        let h = harness(SubmissionConfig::for_testing());
        let alice = funded(&h, 1, 21_000);
        let bob = funded(&h, 2, 21_000);

        let sent = h
            .service
            .transfer(&alice, bob.address(), TokenId::vite(), Amount::from(250))
            .await
            .unwrap();
        let received = h.service.receive(&bob, sent.hash).await.unwrap();

        assert_eq!(sent.height, 1);
        assert_eq!(received.height, 1);
        assert_ne!(sent.hash, received.hash);

        let accepted = h.ledger.accepted_blocks();
        assert_eq!(accepted.len(), 2);
        match &accepted[1].block.body {
            BlockBody::Response(body) => assert_eq!(body.send_block_hash, Some(sent.hash)),
            other => panic!("expected a response block, got {other:?}"),
        }
        for block in &accepted {
            assert_eq!(compute_account_block_hash(&block.block).unwrap(), block.hash);
        }
        assert_eq!(
            h.ledger.balance(&alice.address(), &TokenId::vite()),
            Amount::from(1_000_000 - 250)
        );
    }

    #[tokio::test]
    async fn test_chain_grows_monotonically() {
        let h = harness(SubmissionConfig::for_testing());
        let alice = funded(&h, 1, 21_000);
        let bob = StaticSigner::new(2).address();

        let mut previous = None;
        for expected_height in 1..=5u64 {
            let receipt = h
                .service
                .transfer(&alice, bob, TokenId::vite(), Amount::from(1))
                .await
                .unwrap();
            assert_eq!(receipt.height, expected_height);
            assert_eq!(receipt.previous_hash, previous);
            previous = Some(receipt.hash);
        }

        assert_eq!(
            h.ledger.head(&alice.address()),
            previous.map(|hash| ChainHead { height: 5, hash })
        );
    }

    #[tokio::test]
    async fn test_quota_shortage_runs_pow_into_hash() {
        let h = harness(SubmissionConfig::for_testing());
        let alice = funded(&h, 1, 20_999);
        h.ledger.set_head(
            alice.address(),
            ChainHead {
                height: 199,
                hash: [0x33; 32],
            },
        );

        let receipt = h
            .service
            .transfer(&alice, StaticSigner::new(2).address(), TokenId::vite(), Amount::from(5))
            .await
            .unwrap();

        assert!(receipt.pow_performed);
        assert_eq!(receipt.height, 200);
        assert_eq!(
            h.pow.last_challenge(),
            Some(pow_challenge(&alice.address(), Some(&[0x33; 32])))
        );

        let block = &h.ledger.accepted_blocks()[0].block;
        assert_eq!(block.difficulty, Some(U256::from(DIFFICULTY)));
        assert_eq!(
            block.nonce.as_ref().map(|n| n.as_bytes().to_vec()),
            Some(0x2au64.to_be_bytes().to_vec())
        );
    }

    #[tokio::test]
    async fn test_enough_quota_skips_pow() {
        let h = harness(SubmissionConfig::for_testing());
        let alice = funded(&h, 1, 21_000);

        let receipt = h
            .service
            .transfer(&alice, StaticSigner::new(2).address(), TokenId::vite(), Amount::from(5))
            .await
            .unwrap();

        assert!(!receipt.pow_performed);
        assert_eq!(h.pow.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_head_is_retried_and_relinked() {
        let h = harness(SubmissionConfig::for_testing());
        let alice = funded(&h, 1, 21_000);
        h.ledger
            .fail_next_submission(TransportError::ChainConflict("fork happened".into()));

        let draft = shared_types::AccountBlock::transfer(
            alice.address(),
            StaticSigner::new(2).address(),
            TokenId::vite(),
            Amount::from(5),
        );
        let outcome = h.service.submit_with_retry(draft, &alice).await;

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.result.unwrap().height, 1);
        assert_eq!(h.ledger.head_reads(), 2);
        assert_eq!(h.ledger.submissions(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insufficient_balance_never_reaches_network() {
        let h = harness(SubmissionConfig::for_testing());
        let alice = funded(&h, 1, 21_000);

        let outcome = h
            .service
            .submit_with_retry(
                shared_types::AccountBlock::transfer(
                    alice.address(),
                    StaticSigner::new(2).address(),
                    TokenId::vite(),
                    Amount::from(1_000_001),
                ),
                &alice,
            )
            .await;

        assert_eq!(outcome.attempts, 1);
        assert!(matches!(
            outcome.result.unwrap_err().kind(),
            Some(SubmissionErrorKind::InsufficientBalance { .. })
        ));
        assert_eq!(h.ledger.submissions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_isolates_failing_receiver() {
        let mut config = SubmissionConfig::default();
        config.retry = RetryPolicy::new(3, Duration::from_secs(20));
        let interval = config.dispatch_interval();
        let h = harness(config);
        let alice = funded(&h, 1, 21_000);

        let receivers: Vec<Receiver> = (2..=4u8)
            .map(|seed| Receiver::new(StaticSigner::new(seed).address(), Amount::from(100)))
            .collect();
        h.ledger.fail_submissions_to(
            receivers[1].address,
            TransportError::Unavailable("node restarting".into()),
        );

        let dispatcher = BatchDispatcher::new(
            h.service.clone(),
            Arc::new(alice),
            TokenId::vite(),
            interval,
        );
        let report = dispatcher.dispatch(receivers).await;

        assert!(report.outcomes[0].result.is_ok());
        assert!(report.outcomes[1].result.is_err());
        assert!(report.outcomes[2].result.is_ok());
        assert_eq!(report.outcomes[1].attempts, 3);
        assert_eq!(report.failed().count(), 1);

        let heights: Vec<u64> = report
            .succeeded()
            .map(|o| o.result.as_ref().unwrap().height)
            .collect();
        assert_eq!(heights, vec![1, 2]);
    }
}
