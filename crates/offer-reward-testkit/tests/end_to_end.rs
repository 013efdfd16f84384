//! End-to-end tests: the client against the contract emulator on an
//! in-memory chain.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use offer_reward::ledger::{Ledger, LedgerError};
use offer_reward::{
    BlockRange, CallOverrides, ClientError, ConnectionHandle, DeploymentRegistry, FailureReason,
    OfferReward, Overrides, U256,
};
use offer_reward_testkit::{ProgramConfig, TestFixture, CONTRACT};

const OFFER_VALUE: u64 = 10_000;

async fn tip(fixture: &TestFixture) -> Result<u64> {
    Ok(fixture.ledger.block_number().await?)
}

async fn publish(fixture: &TestFixture, client: &ConnectionHandle, title: &str) -> Result<u64> {
    let event = client
        .publish_offer(title, "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .execute()
        .await?;
    Ok(event.offer_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_publish_offer_on_local_network() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;

    let event = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(1_000u64))
        .execute()
        .await?;

    assert_eq!(event.offer_id, 0);
    assert_eq!(event.title, "t");
    assert_eq!(event.content, "c");
    assert_eq!(client.address()?, CONTRACT);
    Ok(())
}

#[tokio::test]
async fn test_written_strings_read_back_identically() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    let title = "Répondez s'il vous plaît: 42 × 7?";
    let content = "line one\nline two\t✓";

    let written = client
        .publish_offer(title, content, fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .execute()
        .await?;

    let range = BlockRange::new(0, tip(&fixture).await?);
    let read = client
        .offer_published_event(Some(written.offer_id), range)
        .await?;
    assert_eq!(read, written);
    assert_eq!(read.title, title);
    assert_eq!(read.content, content);
    Ok(())
}

#[tokio::test]
async fn test_two_stage_mutation() -> Result<()> {
    let fixture = TestFixture::new();
    fixture.ledger.set_automine(false)?;
    let client = fixture.client(1).await?;

    let pending = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .send()
        .await?;
    let hash = pending.hash();
    assert_eq!(pending.transaction().transaction.hash, hash);
    assert!(fixture.ledger.transaction_receipt(&hash).await?.is_none());
    assert_eq!(fixture.ledger.pending_count()?, 1);

    let confirming = tokio::spawn(pending.confirm());
    tokio::time::sleep(Duration::from_millis(20)).await;
    fixture.ledger.mine(1)?;

    let confirmed = tokio::time::timeout(Duration::from_secs(5), confirming).await???;
    assert_eq!(confirmed.receipt.tx_hash, hash);
    assert_eq!(confirmed.receipt.block_number, 1);
    assert!(confirmed.receipt.status);
    assert_eq!(confirmed.event.hash, hash);
    Ok(())
}

#[tokio::test]
async fn test_offer_lifecycle() -> Result<()> {
    let fixture = TestFixture::new();
    let publisher = fixture.client(1).await?;
    let answerer = fixture.client(2).await?;
    let answerer_address = answerer_address(&fixture)?;

    let offer_id = publish(&fixture, &publisher, "question").await?;

    let answer = answerer.publish_answer(offer_id, "answer").execute().await?;
    assert_eq!(answer.offer_id, offer_id);
    assert_eq!(answer.publisher, answerer_address);
    assert_eq!(answer.content, "answer");

    let before = fixture.ledger.balance(&answerer_address).await?;
    let finished = publisher
        .finish_offer(offer_id, answerer_address)
        .execute()
        .await?;
    assert_eq!(finished.offer_id, offer_id);
    assert_eq!(finished.rewarder, answerer_address);
    assert_eq!(finished.value, U256::from(OFFER_VALUE));

    // 2% fee by default
    let after = fixture.ledger.balance(&answerer_address).await?;
    assert_eq!(after - before, U256::from(9_800u64));
    let fee_address = publisher.fee_address(CallOverrides::default()).await?;
    assert_eq!(fixture.ledger.balance(&fee_address).await?, U256::from(200u64));

    let data = publisher
        .offer_data(offer_id, CallOverrides::default())
        .await?;
    assert!(data.is_finished());
    assert_eq!(data.answer_amount, 1);
    assert_eq!(data.answer_block_list_length, 1);

    let stats = publisher
        .publisher_data(answerer_address, CallOverrides::default())
        .await?;
    assert_eq!(stats.publish_answer_amount, 1);
    assert_eq!(stats.reward_answer_amount, 1);
    assert_eq!(stats.reward_answer_value, U256::from(9_800u64));

    let rewarded = publisher
        .reward_offer_id_list_by_publisher(answerer_address, 0, 10, CallOverrides::default())
        .await?;
    assert_eq!(rewarded, vec![offer_id]);

    let range = BlockRange::new(0, tip(&fixture).await?);
    let answers = publisher
        .answer_published_events(Some(offer_id), Some(answerer_address), range)
        .await?;
    assert_eq!(answers, vec![answer]);
    let event = publisher
        .offer_finished_event(Some(offer_id), None, range)
        .await?;
    assert_eq!(event, finished);
    Ok(())
}

fn answerer_address(fixture: &TestFixture) -> Result<offer_reward::Address> {
    Ok(fixture.signer(2)?.address())
}

#[tokio::test]
async fn test_change_offer_value_is_void() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    let offer_id = publish(&fixture, &client, "t").await?;

    let later = fixture.finish_time() + 3600;
    client
        .change_offer_value(offer_id, later)
        .overrides(Overrides::value(500u64))
        .execute()
        .await?;

    let data = client.offer_data(offer_id, CallOverrides::default()).await?;
    assert_eq!(data.value, U256::from(OFFER_VALUE + 500));
    assert_eq!(data.finish_time, later);
    Ok(())
}

#[tokio::test]
async fn test_change_offer_data_republishes() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    let offer_id = publish(&fixture, &client, "first").await?;

    let changed = client
        .change_offer_data(offer_id, "second", "new content")
        .execute()
        .await?;
    assert_eq!(changed.offer_id, offer_id);
    assert_eq!(changed.title, "second");

    let range = BlockRange::new(0, tip(&fixture).await?);
    let history = client.offer_published_events(Some(offer_id), range).await?;
    let titles: Vec<_> = history.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);

    // single-result query keeps the first match
    let first = client.offer_published_event(Some(offer_id), range).await?;
    assert_eq!(first.title, "first");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_configuration_reads() -> Result<()> {
    let fixture = TestFixture::new();
    let reader = fixture.reader().await?;
    let config = ProgramConfig::default();
    let at_tip = CallOverrides::default();

    assert_eq!(reader.wait_time(at_tip).await?, config.wait_time);
    assert_eq!(reader.min_finish_time(at_tip).await?, config.min_finish_time);
    assert_eq!(reader.fee_rate(at_tip).await?, config.fee_rate);
    assert_eq!(reader.fee_address(at_tip).await?, config.fee_address);
    assert_eq!(reader.min_offer_value(at_tip).await?, config.min_offer_value);
    assert_eq!(reader.answer_fee(at_tip).await?, config.answer_fee);
    assert_eq!(reader.block_skip(at_tip).await?, config.block_skip);
    Ok(())
}

#[tokio::test]
async fn test_pagination_bounds() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    let owner = fixture.signer(1)?.address();
    let n = 3;
    for i in 0..n {
        publish(&fixture, &client, &format!("offer {i}")).await?;
    }
    let at_tip = CallOverrides::default();

    let full = client
        .offer_id_list_by_publisher(owner, 0, n, at_tip)
        .await?;
    assert_eq!(full, vec![0, 1, 2]);

    let short = client
        .offer_id_list_by_publisher(owner, 0, n - 1, at_tip)
        .await?;
    assert_eq!(short, vec![0, 1]);

    let over = client
        .offer_id_list_by_publisher(owner, 0, n + 5, at_tip)
        .await?;
    assert_eq!(over, vec![0, 1, 2]);

    let tail = client
        .offer_id_list_by_publisher(owner, 2, n, at_tip)
        .await?;
    assert_eq!(tail, vec![2]);

    let beyond = client
        .offer_id_list_by_publisher(owner, n, 1, at_tip)
        .await?;
    assert!(beyond.is_empty());

    let stranger = client
        .offer_id_list_by_publisher(CONTRACT, 0, n, at_tip)
        .await?;
    assert!(stranger.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_batch_reads_keep_input_order() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    publish(&fixture, &client, "a").await?;
    client
        .publish_offer("b", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE * 2))
        .execute()
        .await?;

    let at_tip = CallOverrides::default();
    let list = client.offer_data_list(&[1, 0], at_tip).await?;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].value, U256::from(OFFER_VALUE * 2));
    assert_eq!(list[1].value, U256::from(OFFER_VALUE));

    let owner = fixture.signer(1)?.address();
    let stats = client
        .publisher_data_list(&[CONTRACT, owner], at_tip)
        .await?;
    assert_eq!(stats[0].publish_offer_amount, 0);
    assert_eq!(stats[1].publish_offer_amount, 2);
    assert_eq!(stats[1].publish_offer_value, U256::from(OFFER_VALUE * 3));
    Ok(())
}

#[tokio::test]
async fn test_historic_reads() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    publish(&fixture, &client, "a").await?;
    let before_second = tip(&fixture).await?;
    publish(&fixture, &client, "b").await?;

    assert_eq!(client.offer_length(CallOverrides::default()).await?, 2);
    assert_eq!(
        client.offer_length(CallOverrides::at_block(before_second)).await?,
        1
    );
    assert_eq!(client.offer_length(CallOverrides::at_block(0)).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_event_range_and_miss() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    publish(&fixture, &client, "a").await?;
    let first_block = tip(&fixture).await?;
    publish(&fixture, &client, "b").await?;

    let later = client
        .offer_published_events(None, BlockRange::new(first_block + 1, tip(&fixture).await?))
        .await?;
    assert_eq!(later.len(), 1);
    assert_eq!(later[0].title, "b");

    let err = client
        .offer_finished_event(None, None, BlockRange::new(0, tip(&fixture).await?))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EventNotFound { event: "OfferFinished", .. }));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Confirmation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_waits_for_confirmation_depth() -> Result<()> {
    let fixture = TestFixture::new();
    let mut client = fixture.handle();
    client.connect(fixture.signer(1)?, None, Some(3)).await?;

    let pending = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .send()
        .await?;
    let confirming = tokio::spawn(pending.confirm());

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!confirming.is_finished());

    // two blocks beyond inclusion is one short
    fixture.ledger.mine(2)?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!confirming.is_finished());

    fixture.ledger.mine(1)?;
    let confirmed = tokio::time::timeout(Duration::from_secs(5), confirming).await???;
    assert_eq!(confirmed.receipt.block_number, 1);
    assert_eq!(tip(&fixture).await?, 4);
    assert_eq!(confirmed.receipt.confirmations(4), 3);
    Ok(())
}

#[tokio::test]
async fn test_depth_one_waits_for_block_after_inclusion() -> Result<()> {
    let fixture = TestFixture::new();
    fixture.ledger.set_automine(false)?;
    let mut client = fixture.handle();
    client.connect(fixture.signer(1)?, None, Some(1)).await?;

    let pending = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .send()
        .await?;
    let hash = pending.hash();
    let confirming = tokio::spawn(pending.confirm());

    fixture.ledger.mine(1)?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(fixture.ledger.transaction_receipt(&hash).await?.is_some());
    assert!(!confirming.is_finished());

    fixture.ledger.mine(1)?;
    let confirmed = tokio::time::timeout(Duration::from_secs(5), confirming).await???;
    assert_eq!(confirmed.receipt.block_number, 1);
    assert_eq!(confirmed.event.offer_id, 0);
    Ok(())
}

#[tokio::test]
async fn test_zero_depth_resolves_on_inclusion() -> Result<()> {
    let fixture = TestFixture::new();
    let mut client = fixture.handle();
    client.connect(fixture.signer(1)?, None, Some(0)).await?;

    let offer_id = publish(&fixture, &client, "t").await?;
    assert_eq!(offer_id, 0);
    // nothing mined beyond the including block
    assert_eq!(tip(&fixture).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_reorg_fails_confirmation() -> Result<()> {
    let fixture = TestFixture::new();
    let mut client = fixture.handle();
    client.connect(fixture.signer(1)?, None, Some(3)).await?;

    let pending = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .send()
        .await?;
    let hash = pending.hash();
    let confirming = tokio::spawn(pending.confirm());

    // let the confirmation loop observe the inclusion first
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(fixture.ledger.reorg(1)?, vec![hash]);
    fixture.ledger.mine(3)?;

    let err = tokio::time::timeout(Duration::from_secs(5), confirming)
        .await??
        .unwrap_err();
    match err {
        ClientError::TransactionFailed { tx, reason, .. } => {
            assert_eq!(tx, hash);
            assert!(matches!(reason, FailureReason::Dropped));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_contract_precondition_is_rejection() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;

    let err = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(1u64))
        .execute()
        .await
        .unwrap_err();
    match err {
        ClientError::TransactionRejected { operation, source } => {
            assert_eq!(operation, "publishOffer");
            assert!(matches!(
                source,
                LedgerError::Reverted(reason) if reason == "offer value too low"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(tip(&fixture).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_out_of_gas_is_failure() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;

    let err = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE).with_gas_limit(21_000))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::TransactionFailed {
            reason: FailureReason::Reverted { block: 1 },
            ..
        }
    ));
    assert_eq!(client.offer_length(CallOverrides::default()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_unfunded_signer_is_rejection() -> Result<()> {
    let fixture = TestFixture::new();
    let mut client = fixture.handle();
    client.connect(fixture.stranger(), None, None).await?;

    let err = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE))
        .send()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::TransactionRejected {
            source: LedgerError::InsufficientFunds { .. },
            ..
        }
    ));
    assert_eq!(fixture.ledger.pending_count()?, 0);
    assert_eq!(tip(&fixture).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_stale_nonce_is_rejection() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    publish(&fixture, &client, "t").await?;

    let err = client
        .publish_offer("t", "c", fixture.finish_time())
        .overrides(Overrides::value(OFFER_VALUE).with_nonce(0))
        .send()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::TransactionRejected {
            source: LedgerError::NonceMismatch { expected: 1, got: 0 },
            ..
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_read_only_handle_cannot_mutate() -> Result<()> {
    let fixture = TestFixture::new();
    let reader = fixture.reader().await?;

    let err = reader
        .publish_offer("t", "c", fixture.finish_time())
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NoSigner { operation: "publishOffer" }));

    // reads still work
    assert_eq!(reader.offer_length(CallOverrides::default()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_unconnected_handle() -> Result<()> {
    let fixture = TestFixture::new();
    let handle = fixture.handle();

    assert!(matches!(handle.address(), Err(ClientError::NotConnected)));
    assert!(matches!(
        handle.offer_length(CallOverrides::default()).await,
        Err(ClientError::ContractUnavailable { .. })
    ));
    assert!(matches!(
        handle
            .offer_published_event(None, BlockRange::new(0, 10))
            .await,
        Err(ClientError::ContractUnavailable { .. })
    ));
    assert!(matches!(
        handle.finish_offer(0, CONTRACT).send().await,
        Err(ClientError::NoSigner { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_network() -> Result<()> {
    let fixture = TestFixture::new();
    let mut handle =
        ConnectionHandle::new(Arc::new(DeploymentRegistry::new()), fixture.config.clone());

    let err = handle
        .connect(fixture.provider(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnsupportedNetwork(1337)));

    // an explicit address needs no registry entry
    handle
        .connect(fixture.provider(), Some(CONTRACT), None)
        .await?;
    assert_eq!(handle.offer_length(CallOverrides::default()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_clones_run_concurrently() -> Result<()> {
    let fixture = TestFixture::new();
    let client = fixture.client(1).await?;
    publish(&fixture, &client, "t").await?;

    let reads = (0..4).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.offer_data(0, CallOverrides::default()).await })
    });
    for read in reads.collect::<Vec<_>>() {
        assert_eq!(read.await??.value, U256::from(OFFER_VALUE));
    }
    Ok(())
}
