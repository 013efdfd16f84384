//! Property tests over the full client/ledger stack.

use offer_reward::{BlockRange, CallOverrides, OfferReward, Overrides};
use offer_reward_testkit::generators::{offer_value, page_request, text};
use offer_reward_testkit::TestFixture;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_page_is_bounded_slice((n, start, length) in page_request(6)) {
        let ids = runtime().block_on(async {
            let fixture = TestFixture::new();
            let client = fixture.client(1).await.unwrap();
            let owner = fixture.signer(1).unwrap().address();
            for _ in 0..n {
                client
                    .publish_offer("t", "c", fixture.finish_time())
                    .overrides(Overrides::value(1_000u64))
                    .execute()
                    .await
                    .unwrap();
            }
            client
                .offer_id_list_by_publisher(owner, start, length, CallOverrides::default())
                .await
                .unwrap()
        });

        let expected: Vec<u64> = (start..n.max(start)).take(length as usize).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn prop_text_round_trips(title in text(), content in text(), value in offer_value()) {
        let (written, read) = runtime().block_on(async {
            let fixture = TestFixture::new();
            let client = fixture.client(1).await.unwrap();
            let written = client
                .publish_offer(&title, &content, fixture.finish_time())
                .overrides(Overrides::value(value))
                .execute()
                .await
                .unwrap();
            let read = client
                .offer_published_event(Some(written.offer_id), BlockRange::new(0, 1))
                .await
                .unwrap();
            (written, read)
        });

        prop_assert_eq!(&written.title, &title);
        prop_assert_eq!(&written.content, &content);
        prop_assert_eq!(written, read);
    }
}
