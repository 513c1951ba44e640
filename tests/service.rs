use feedsieve::adapter::RawNode;
use feedsieve::{
    initialize, Config, ControlMessage, Directive, FilterEngine, FilterService, ItemId,
    JsonPolicyStore, LayoutVariant, MemoryFeed, MemoryPolicyStore, PolicyRecord, PolicyStore,
    ServiceHandle, SieveError,
};
use std::time::Duration;
use tokio::task::JoinHandle;

struct Harness {
    feed: MemoryFeed,
    store: MemoryPolicyStore,
    handle: ServiceHandle,
    task: JoinHandle<FilterEngine>,
}

impl Harness {
    async fn start(feed: MemoryFeed, store: MemoryPolicyStore) -> Self {
        let (service, handle) =
            FilterService::new(initialize(&Config::default()), feed.clone(), store.clone());
        let task = tokio::spawn(service.run(Some("/feed/home".to_string())));
        settle().await;
        Self {
            feed,
            store,
            handle,
            task,
        }
    }

    async fn stop(self) -> FilterEngine {
        self.handle.shutdown().unwrap();
        self.task.await.unwrap()
    }

    fn is_dimmed(&self, item: ItemId) -> bool {
        matches!(self.feed.directive(item), Some(Directive::Dim(_)))
    }
}

/// Lets the service drain pending signals.
async fn settle() {
    advance(1).await;
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn video(title: &str, channel: &str, views: &str) -> RawNode {
    RawNode::new()
        .with_slot("video-title", title)
        .with_slot("channel-name", channel)
        .with_slot("metadata-line", views)
}

fn policy() -> PolicyRecord {
    PolicyRecord {
        blocked_keywords: vec!["spoiler".to_string()],
        blocked_channels: vec!["Acme Clips".to_string()],
        min_quantity: 1_000,
        ..PolicyRecord::default()
    }
}

fn feed() -> MemoryFeed {
    MemoryFeed::new(LayoutVariant::Desktop)
}

#[tokio::test(start_paused = true)]
async fn initial_pass_settles_the_whole_feed() {
    let feed = feed();
    let keyword = feed.push(video("Finale SPOILERS", "Other", "2M views")).unwrap();
    let channel = feed.push(video("Daily upload", "acme clips", "2M views")).unwrap();
    let low = feed.push(video("Daily upload", "Other", "999 views")).unwrap();
    let fine = feed.push(video("Daily upload", "Other", "1,000 views")).unwrap();

    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    assert!(h.is_dimmed(keyword));
    assert!(h.is_dimmed(channel));
    assert!(h.is_dimmed(low));
    assert_eq!(h.feed.directive(fine), Some(Directive::Reveal));
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 3 videos"));

    match h.feed.directive(low) {
        Some(Directive::Dim(overlay)) => {
            assert_eq!(overlay.reason, "Low views (999 views)");
            assert_eq!(overlay.action_label, "Show Anyway");
        }
        other => panic!("expected dim overlay, got {other:?}"),
    }

    let engine = h.stop().await;
    assert_eq!(engine.filtered_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn appended_items_wait_for_the_debounce_window() {
    let h = Harness::start(feed(), MemoryPolicyStore::new(policy())).await;

    let late = h.feed.push(video("spoiler inside", "Other", "5K views")).unwrap();
    h.handle.feed_mutated().unwrap();

    advance(100).await;
    assert_eq!(h.feed.directive(late), None);

    advance(100).await;
    assert!(h.is_dimmed(late));
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 1 videos"));
}

#[tokio::test(start_paused = true)]
async fn mutation_bursts_coalesce_into_one_pass() {
    let h = Harness::start(feed(), MemoryPolicyStore::new(policy())).await;
    let loads_after_start = h.store.load_count();

    for i in 0..3 {
        h.feed.push(video(&format!("Clip {i}"), "Other", "5K views")).unwrap();
        h.handle.feed_mutated().unwrap();
        advance(50).await;
    }

    advance(200).await;
    assert_eq!(h.store.load_count(), loads_after_start + 1);
    assert_eq!(h.feed.directive_writes(), 3);
}

#[tokio::test(start_paused = true)]
async fn consecutive_passes_write_nothing_new() {
    let feed = feed();
    feed.push(video("spoiler", "Other", "5K views")).unwrap();
    feed.push(video("Tutorial", "Other", "5K views")).unwrap();

    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;
    let writes = h.feed.directive_writes();
    assert_eq!(writes, 2);

    h.handle.feed_mutated().unwrap();
    advance(200).await;
    assert_eq!(h.feed.directive_writes(), writes);

    advance(10_000).await;
    assert_eq!(h.feed.directive_writes(), writes);
}

#[tokio::test(start_paused = true)]
async fn override_survives_incremental_passes() {
    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    h.handle.show_anyway(item).unwrap();
    settle().await;
    assert_eq!(h.feed.directive(item), Some(Directive::Reveal));
    assert_eq!(h.feed.counter_label(), None);

    let appended = h.feed.push(video("another spoiler", "Other", "5K views")).unwrap();
    h.handle.feed_mutated().unwrap();
    advance(200).await;

    assert!(h.feed.is_visible(item));
    assert!(h.is_dimmed(appended));

    advance(10_000).await;
    assert!(h.feed.is_visible(item));
}

#[tokio::test(start_paused = true)]
async fn navigation_reevaluates_overridden_items() {
    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    h.handle.show_anyway(item).unwrap();
    settle().await;

    h.handle.navigated("/feed/home").unwrap();
    advance(1_300).await;
    assert!(h.feed.is_visible(item), "same location is not a navigation");

    h.handle.navigated("/results?q=finale").unwrap();
    advance(1_000).await;
    assert!(h.feed.is_visible(item));

    advance(300).await;
    assert!(h.is_dimmed(item));
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 1 videos"));
}

#[tokio::test(start_paused = true)]
async fn enable_toggle_clears_and_restores_filtering() {
    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    h.handle.show_anyway(item).unwrap();
    h.handle
        .control(ControlMessage::SetEnabled { enabled: false })
        .unwrap();
    settle().await;

    assert!(!h.store.get().unwrap().enabled);
    assert_eq!(h.feed.directive(item), None);
    assert_eq!(h.feed.counter_label(), None);

    h.handle
        .control(ControlMessage::SetEnabled { enabled: true })
        .unwrap();
    settle().await;

    assert!(h.is_dimmed(item), "re-enabling discards the override");
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 1 videos"));
}

#[tokio::test(start_paused = true)]
async fn hide_mode_toggle_switches_directives() {
    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;
    assert!(h.is_dimmed(item));

    h.handle.control(ControlMessage::ToggleHideMode).unwrap();
    settle().await;

    assert!(h.store.get().unwrap().hide_filtered);
    assert_eq!(h.feed.directive(item), Some(Directive::Hide));
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 1 videos"));
}

#[tokio::test(start_paused = true)]
async fn policy_update_message_reloads_the_store() {
    let feed = feed();
    let item = feed.push(video("Weekly recap", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;
    assert!(h.feed.is_visible(item));

    h.store
        .set(PolicyRecord {
            blocked_keywords: vec!["recap".to_string()],
            ..PolicyRecord::default()
        })
        .unwrap();
    h.handle.control_json(r#"{"action":"filterUpdated"}"#).unwrap();
    settle().await;

    assert!(h.is_dimmed(item));
}

#[tokio::test(start_paused = true)]
async fn unavailable_policy_shows_everything() {
    let feed = feed();
    let items: Vec<_> = ["spoiler", "fine", "another spoiler"]
        .into_iter()
        .map(|title| feed.push(video(title, "Acme Clips", "3 views")).unwrap())
        .collect();

    let store = MemoryPolicyStore::new(policy());
    store.set_failing(true);
    let h = Harness::start(feed, store).await;

    for item in &items {
        assert!(h.feed.is_visible(*item));
    }
    assert_eq!(h.feed.counter_label(), None);

    h.store.set_failing(false);
    h.handle.control(ControlMessage::PolicyUpdated).unwrap();
    settle().await;

    for item in &items {
        assert!(h.is_dimmed(*item));
    }
}

#[tokio::test(start_paused = true)]
async fn unreadable_item_is_shown_and_isolated() {
    let feed = feed();
    let broken = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let healthy = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    feed.make_unreadable(broken).unwrap();

    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    assert_eq!(h.feed.directive(broken), Some(Directive::Reveal));
    assert!(h.is_dimmed(healthy));
}

#[tokio::test(start_paused = true)]
async fn periodic_pass_catches_unreported_items_only() {
    let feed = feed();
    let settled = feed.push(video("Tutorial", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    h.feed.set_slot(settled, "video-title", "Tutorial (spoiler)").unwrap();
    let unreported = h.feed.push(video("Trailer", "Acme Clips", "5K views")).unwrap();

    advance(9_000).await;
    assert_eq!(h.feed.directive(unreported), None);

    advance(1_000).await;
    assert!(h.is_dimmed(unreported));
    assert_eq!(h.feed.directive(settled), Some(Directive::Reveal));
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 1 videos"));

    h.handle.navigated("/feed/trending").unwrap();
    advance(1_300).await;
    assert!(h.is_dimmed(settled), "full passes re-read settled items");
}

#[tokio::test(start_paused = true)]
async fn removed_items_drop_out_of_the_counter() {
    let feed = feed();
    let removed = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    feed.push(video("another spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;
    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 2 videos"));

    h.feed.remove(removed).unwrap();
    advance(10_000).await;

    assert_eq!(h.feed.counter_label().as_deref(), Some("Filtered: 1 videos"));
}

#[tokio::test(start_paused = true)]
async fn acknowledged_toggle_reports_the_write() {
    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    h.handle.control_acked(ControlMessage::ToggleHideMode).await.unwrap();
    assert!(h.store.get().unwrap().hide_filtered);

    h.handle.control_acked(ControlMessage::PolicyUpdated).await.unwrap();
    assert_eq!(h.feed.directive(item), Some(Directive::Hide));

    h.store.set_failing(true);
    let result = h
        .handle
        .control_acked(ControlMessage::SetEnabled { enabled: false })
        .await;
    assert!(matches!(result, Err(SieveError::Storage(_))));

    let handle = h.handle.clone();
    h.stop().await;
    assert!(matches!(
        handle.control_acked(ControlMessage::PolicyUpdated).await,
        Err(SieveError::Channel(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn malformed_control_messages_are_ignored() {
    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;

    h.handle.control_json("not json").unwrap();
    h.handle.control_json(r#"{"action":"explode"}"#).unwrap();
    settle().await;

    assert!(h.is_dimmed(item));
    assert!(!h.store.get().unwrap().hide_filtered);
}

#[tokio::test(start_paused = true)]
async fn shutdown_hands_back_the_engine() {
    let feed = feed();
    feed.push(video("spoiler", "Other", "5K views")).unwrap();
    let h = Harness::start(feed, MemoryPolicyStore::new(policy())).await;
    let handle = h.handle.clone();

    let engine = h.stop().await;
    assert_eq!(engine.filtered_count(), 1);
    assert!(handle.feed_mutated().is_err());
}

#[tokio::test]
async fn json_store_round_trips_control_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonPolicyStore::new(dir.path().join("policy.json"));
    store.save(&policy()).await.unwrap();

    let feed = feed();
    let item = feed.push(video("spoiler", "Other", "5K views")).unwrap();

    let (service, handle) = FilterService::new(initialize(&Config::default()), feed.clone(), store.clone());
    let task = tokio::spawn(service.run(None));

    handle.control(ControlMessage::ToggleHideMode).unwrap();
    for _ in 0..200 {
        if feed.directive(item) == Some(Directive::Hide) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(feed.directive(item), Some(Directive::Hide));
    assert!(store.load().await.unwrap().hide_filtered);

    handle.shutdown().unwrap();
    task.await.unwrap();
}
