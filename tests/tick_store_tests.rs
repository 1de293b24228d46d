use kalshi_signal::indicator::BollingerBands;
use kalshi_signal::model::market::MarketInfo;
use kalshi_signal::model::record::TickRecord;
use kalshi_signal::model::signal::{Direction, TradeSide};
use kalshi_signal::model::tick::Quote;
use kalshi_signal::tick_store::TickStore;

fn market() -> MarketInfo {
    MarketInfo {
        event_id: "INXD-24AUG05".to_string(),
        market_id: "INXD-24AUG05-B5400".to_string(),
        title: "S&P 500 close".to_string(),
        subtitle: "5400 to 5424".to_string(),
        volume: 150_000,
    }
}

fn record(price: f64, timestamp_ms: u64) -> TickRecord {
    TickRecord {
        market_id: "INXD-24AUG05-B5400".to_string(),
        timestamp_ms,
        price,
        last_price: price,
        quote: None,
        sma: None,
        total_average: None,
        margin_of_error: None,
        std_dev: None,
        anchor: None,
        rsi: None,
        bollinger: None,
        pattern: None,
        trade_sent: false,
        crossed: None,
        trade_side: None,
    }
}

#[test]
/// Verifies appended rows are read back in order with their labels and
/// optional indicator columns intact.
fn append_and_read_back() {
    let store = TickStore::open_in_memory().unwrap();
    store.append(&market(), &record(43.0, 1_722_873_600_000)).unwrap();

    let full = TickRecord {
        quote: Some(Quote {
            yes_bid: 43.0,
            yes_ask: 45.0,
            no_bid: 55.0,
            no_ask: 57.0,
        }),
        sma: Some(44.0),
        total_average: Some(43.5),
        margin_of_error: Some(1.2),
        std_dev: Some(0.8),
        anchor: Some(43.0),
        rsi: Some(61.0),
        bollinger: Some(BollingerBands {
            upper: 47.0,
            mid: 44.0,
            lower: 41.0,
        }),
        pattern: Some(Direction::Up),
        trade_sent: true,
        crossed: Some(Direction::Up),
        trade_side: Some(TradeSide::BuyYes),
        ..record(44.0, 1_722_873_660_000)
    };
    store.append(&market(), &full).unwrap();

    assert_eq!(store.count().unwrap(), 2);
    let rows = store.load_market("INXD-24AUG05-B5400").unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].event_id, "INXD-24AUG05");
    assert_eq!(rows[0].timestamp, "2024-08-05T16:00:00+00:00");
    assert_eq!(rows[0].pattern, "none");
    assert_eq!(rows[0].sma, None);
    assert!(!rows[0].trade_sent);

    assert!((rows[1].price - 44.0).abs() < f64::EPSILON);
    assert_eq!(rows[1].total_average, Some(43.5));
    assert_eq!(rows[1].pattern, "up");
    assert_eq!(rows[1].crossed, "up");
    assert_eq!(rows[1].trade_side, "buy_yes");
    assert!(rows[1].trade_sent);
}

#[test]
/// Verifies the store creates missing parent directories on open.
fn open_creates_parent_directory() {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ks-tick-store-{}", nanos));
    let path = dir.join("nested").join("tick_log.sqlite");

    let store = TickStore::open(&path).unwrap();
    store.append(&market(), &record(10.0, 0)).unwrap();
    drop(store);

    let reopened = TickStore::open(&path).unwrap();
    assert_eq!(reopened.count().unwrap(), 1);
    let _ = std::fs::remove_dir_all(dir);
}
