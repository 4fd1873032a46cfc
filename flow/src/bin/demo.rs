//! Booking Flow Demo
//!
//! Walks one participant through a three-slot booking against the in-memory
//! ledger. A competing booking fills the last slot after the participant's
//! catalog snapshot was taken, so the commit ends in partial success.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin booking-demo
//! BOOKING_COMMIT_DISPATCH=parallel RUST_LOG=photo_booking_flow=debug cargo run --bin booking-demo
//! ```

use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use photo_booking_core::environment::SystemClock;
use photo_booking_flow::{
    BookingFlowAction, BookingFlowEnvironment, BookingFlowStore, CapacityLedger, CapacityMode,
    Config, InMemoryLedger, Money, Session, SessionId, Slot, SlotId, TimeRange, TracingNavigator,
    UserId, enter_flow,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

fn demo_slot(number: u32, start: chrono::DateTime<Utc>, price_yen: u64, max: u32) -> Slot {
    let start = start + ChronoDuration::minutes(30 * i64::from(number - 1));
    Slot {
        id: SlotId::new(),
        slot_number: number,
        time: TimeRange::new(start, start + ChronoDuration::minutes(30)),
        max_participants: max,
        current_participants: 0,
        price_per_person: Money::from_yen(price_yen),
    }
}

async fn print_state(store: &BookingFlowStore, heading: &str) {
    let (step, selected, price, notice) = store
        .state(|s| {
            (
                s.step,
                s.selection.len(),
                s.total_price(),
                s.notice.as_ref().map(|n| n.message.clone()),
            )
        })
        .await;

    println!("{heading}");
    println!("   step: {step}, selected: {selected}, total: {}", price.label());
    if let Some(message) = notice {
        println!("   notice: {message}");
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid booking configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "info,photo_booking_flow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    photo_booking_runtime::metrics::register_store_metrics();
    photo_booking_flow::metrics::register_booking_metrics();

    println!("\n============================================");
    println!("   Photo Session Booking - Live Demo");
    println!("============================================\n");
    println!("Commit dispatch: {:?}\n", config.dispatch);

    let start = Utc::now() + ChronoDuration::days(7);
    let session = Session {
        id: SessionId::new(),
        title: "Golden hour portraits".to_string(),
        time: TimeRange::new(start, start + ChronoDuration::hours(2)),
        location: "Riverside Park".to_string(),
        price_per_person: Money::ZERO,
        capacity_mode: CapacityMode::Slotted,
        allow_multiple_bookings: true,
    };
    let slots = [
        demo_slot(1, start, 1000, 2),
        demo_slot(2, start, 0, 1),
        demo_slot(3, start, 2500, 1),
    ];

    let ledger = Arc::new(InMemoryLedger::new().with_latency(Duration::from_millis(50)));
    for slot in &slots {
        ledger.add_slot(session.id, slot.clone()).await;
    }

    let env = BookingFlowEnvironment::new(
        Arc::new(SystemClock),
        ledger.clone(),
        Arc::new(TracingNavigator::new()),
        UserId::new(),
    )
    .with_dispatch(config.dispatch);

    let store = enter_flow(&*ledger, session, env, "").await?;
    print_state(&store, "1. Flow entered").await;

    for slot in &slots {
        store
            .send(BookingFlowAction::ToggleSlot { slot_id: slot.id })
            .await?
            .wait()
            .await;
    }
    print_state(&store, "2. Three slots selected").await;

    store.send(BookingFlowAction::Proceed).await?.wait().await;
    print_state(&store, "3. Reviewing selection").await;

    ledger
        .reserve_slot(slots[2].id, UserId::new())
        .await
        .context("competing booking failed")?;
    println!("   (another participant just booked slot 3)\n");

    store
        .send_and_wait_for(
            BookingFlowAction::Commit,
            |action| matches!(action, BookingFlowAction::CommitSettled { .. }),
            SETTLE_TIMEOUT,
        )
        .await?;
    print_state(&store, "4. Commit settled").await;

    if let Some(report) = store.state(|s| s.last_report.clone()).await {
        println!(
            "Report: {} of {} booked",
            report.success_count, report.total_attempted
        );
        for failure in &report.failures {
            println!("   {} -> {} ({})", failure.label, failure.kind, failure.message);
        }
    }

    for slot in &slots {
        let booked = ledger.slot_participants(slot.id).await.unwrap_or_default();
        println!(
            "   slot {}: {booked}/{} participants",
            slot.slot_number, slot.max_participants
        );
    }

    store.shutdown(SETTLE_TIMEOUT).await?;
    println!("\nDone.");
    Ok(())
}
