use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

use tandem_core::app::{DualWriteConfig, DualWriteCoordinator, FriendService, UserService};
use tandem_core::domain::{DualWriteError, Friendship, User, UserId, WriteOutcome};
use tandem_core::impls::{BrokerMode, InMemoryBroker, InMemoryIdentityDirectory, InMemoryStore};
use tandem_core::observability::{OutcomeCounts, init_tracing};

/// 1 ステップの結果を表示して集計する
fn report<R: Serialize>(
    step: &str,
    result: Result<R, DualWriteError>,
    counts: &mut OutcomeCounts,
) -> Option<R> {
    let outcome = WriteOutcome::from(result);
    counts.record(&outcome);
    match serde_json::to_string(&outcome) {
        Ok(json) => println!("{step:<28} {json}"),
        Err(e) => println!("{step:<28} <unprintable outcome: {e}>"),
    }
    match outcome {
        WriteOutcome::Success { record } => Some(record),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let config = DualWriteConfig::from_env()?;
    tracing::info!(
        publish_timeout_ms = config.publish_timeout_ms,
        correlation_ids = config.correlation_ids,
        "tandem demo starting"
    );

    // (A) 2 つのサービスが 1 つの broker を共有する
    let broker = Arc::new(InMemoryBroker::new());
    let directory = Arc::new(InMemoryIdentityDirectory::new());

    let users = UserService::new(
        DualWriteCoordinator::<User>::builder()
            .store(Arc::new(InMemoryStore::<User>::new()))
            .broker(broker.clone())
            .config(config.clone())
            .build()?,
    );
    let friends = FriendService::new(
        DualWriteCoordinator::<Friendship>::builder()
            .store(Arc::new(InMemoryStore::<Friendship>::new()))
            .broker(broker.clone())
            .identity(directory.clone())
            .config(config)
            .build()?,
    );

    let mut counts = OutcomeCounts::default();

    // (B) ユーザー作成（user サービスが採番）
    let mut registered = Vec::new();
    for (first, last) in [("Kenny", "Bastani"), ("Jane", "Doe")] {
        let created = report(
            "create user",
            users.create_user(User::new(first, last)).await,
            &mut counts,
        );
        if let Some(id) = created.and_then(|user| user.id) {
            directory.insert(id).await;
            registered.push(id);
        }
    }
    let [kenny, jane] = registered[..] else {
        return Err("users were not created".into());
    };

    // (C) 友達関係
    report("add friend", friends.add_friend(kenny, jane).await, &mut counts);
    report("add friend (again)", friends.add_friend(kenny, jane).await, &mut counts);
    report("add self as friend", friends.add_friend(kenny, kenny).await, &mut counts);
    report(
        "add unknown friend",
        friends.add_friend(kenny, UserId::new(99)).await,
        &mut counts,
    );

    // (D) broker 障害中の書き込み: Store には残るがイベントは出ない
    broker
        .set_mode(BrokerMode::Reject("broker offline".to_string()))
        .await;
    report("add friend (broker down)", friends.add_friend(jane, kenny).await, &mut counts);
    broker.set_mode(BrokerMode::Accept).await;

    report("remove friend", friends.remove_friend(kenny, jane).await, &mut counts);
    println!(
        "friends of {jane}: {:?}",
        friends
            .find_user_friends(jane)
            .await?
            .iter()
            .map(|f| f.friend_id.to_string())
            .collect::<Vec<_>>()
    );

    // (E) 発行されたメッセージ
    println!("--- published ({} attempts) ---", broker.attempts());
    for message in broker.published().await {
        println!("[{}] key={} {}", message.topic, message.key, message.payload);
    }
    println!("--- outcomes ---");
    println!("{}", serde_json::to_string_pretty(&counts)?);
    if counts.committed_unpublished > 0 {
        tracing::warn!(
            count = counts.committed_unpublished,
            "some committed writes were never announced"
        );
    }

    Ok(())
}
