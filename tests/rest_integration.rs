use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bybit_api_client::BybitError;
use bybit_api_client::auth::{Credentials, FixedTimestamp, StaticCredentials, sign_request};
use bybit_api_client::rest::BybitRestClient;
use bybit_api_client::rest::account::{
    PositionListRequest, SetCollateralSwitchRequest, SetLeverageRequest, WalletBalanceRequest,
};
use bybit_api_client::rest::market::{InstrumentsInfoRequest, KlineRequest};
use bybit_api_client::rest::trade::{CancelOrderRequest, CreateOrderRequest};
use bybit_api_client::types::{AccountType, Category, CollateralSwitch, Interval, Side};

const API_KEY: &str = "test-key";
const API_SECRET: &str = "test-secret";
const TIMESTAMP: i64 = 1_700_000_000_000;

fn build_client(server: &MockServer) -> BybitRestClient {
    BybitRestClient::builder()
        .base_url(server.uri())
        .credentials(StaticCredentials::new(API_KEY, API_SECRET))
        .timestamp_provider(Arc::new(FixedTimestamp(TIMESTAMP)))
        .build()
}

#[tokio::test]
async fn test_get_server_time() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "timeSecond": "1700000000",
            "timeNano": "1700000000123456789"
        },
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("GET"))
        .and(path("/v5/market/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let time = client.get_server_time().await.unwrap();

    assert_eq!(time.time_second, 1_700_000_000);
    assert_eq!(time.time_ms(), 1_700_000_000_123);
}

#[tokio::test]
async fn test_get_instruments_info() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "category": "linear",
            "list": [{
                "symbol": "BTCUSDT",
                "contractType": "LinearPerpetual",
                "status": "Trading",
                "baseCoin": "BTC",
                "quoteCoin": "USDT",
                "settleCoin": "USDT",
                "launchTime": "1585526400000",
                "priceScale": "2",
                "leverageFilter": {
                    "minLeverage": "1",
                    "maxLeverage": "100.00",
                    "leverageStep": "0.01"
                },
                "priceFilter": {
                    "minPrice": "0.10",
                    "maxPrice": "199999.80",
                    "tickSize": "0.10"
                },
                "lotSizeFilter": {
                    "maxOrderQty": "1190.000",
                    "minOrderQty": "0.001",
                    "qtyStep": "0.001"
                },
                "fundingInterval": 480
            }],
            "nextPageCursor": ""
        },
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("GET"))
        .and(path("/v5/market/instruments-info"))
        .and(query_param("category", "linear"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = InstrumentsInfoRequest::new(Category::Linear).symbol("BTCUSDT");
    let info = client.get_instruments_info(&request).await.unwrap();

    assert_eq!(info.list.len(), 1);
    let instrument = &info.list[0];
    assert_eq!(instrument.symbol, "BTCUSDT");
    assert_eq!(instrument.launch_time, Some(1_585_526_400_000));
    let price_filter = instrument.price_filter.as_ref().unwrap();
    assert_eq!(price_filter.tick_size, "0.10".parse::<Decimal>().unwrap());
    assert!(info.next_page_cursor.is_none());
}

#[tokio::test]
async fn test_get_kline_decodes_array_entries() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "category": "linear",
            "symbol": "BTCUSDT",
            "list": [
                ["1700000060000", "35050", "35120.5", "35010", "35100", "120.5", "4226025"],
                ["1700000000000", "35000", "35060", "34950", "35050", "98.2", "3440000"]
            ]
        },
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .and(query_param("category", "linear"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = KlineRequest::new(Category::Linear, "BTCUSDT", Interval::Min1);
    let klines = client.get_kline(&request).await.unwrap();

    assert_eq!(klines.list.len(), 2);
    let latest = &klines.list[0];
    assert_eq!(latest.start_ms, 1_700_000_060_000);
    assert_eq!(latest.high, "35120.5".parse::<Decimal>().unwrap());
    assert_eq!(latest.volume, "120.5".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn test_signed_get_signs_the_query_string() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "category": "linear",
            "list": [{
                "symbol": "BTCUSDT",
                "side": "Buy",
                "size": "0.5",
                "positionIdx": 0,
                "leverage": "10",
                "avgPrice": "34000",
                "positionValue": "17000",
                "markPrice": "35000",
                "liqPrice": "",
                "unrealisedPnl": "500",
                "positionStatus": "Normal",
                "createdTime": "1699000000000",
                "updatedTime": "1699999999999"
            }],
            "nextPageCursor": ""
        },
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    // The signature covers the exact query string the request serializes to.
    let credentials = Credentials::new(API_KEY, API_SECRET);
    let expected_signature = sign_request(&credentials, TIMESTAMP, 5_000, "category=linear").unwrap();

    Mock::given(method("GET"))
        .and(path("/v5/position/list"))
        .and(query_param("category", "linear"))
        .and(header("X-BAPI-API-KEY", API_KEY))
        .and(header("X-BAPI-TIMESTAMP", "1700000000000"))
        .and(header("X-BAPI-RECV-WINDOW", "5000"))
        .and(header("X-BAPI-SIGN-TYPE", "2"))
        .and(header("X-BAPI-SIGN", expected_signature.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = PositionListRequest::new(Category::Linear);
    let positions = client.get_positions(&request).await.unwrap();

    assert_eq!(positions.list.len(), 1);
    let position = &positions.list[0];
    assert!(position.is_open());
    assert_eq!(position.liq_price, None);
    assert_eq!(
        position.unrealised_pnl,
        Some("500".parse::<Decimal>().unwrap())
    );
}

#[tokio::test]
async fn test_signed_post_signs_the_exact_body() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "orderId": "1321003749386327552",
            "orderLinkId": ""
        },
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    let request =
        CreateOrderRequest::market(Category::Linear, "BTCUSDT", Side::Buy, Decimal::new(1, 3));
    let body = serde_json::to_string(&request).unwrap();
    let credentials = Credentials::new(API_KEY, API_SECRET);
    let expected_signature = sign_request(&credentials, TIMESTAMP, 5_000, &body).unwrap();

    Mock::given(method("POST"))
        .and(path("/v5/order/create"))
        .and(header("X-BAPI-SIGN", expected_signature.as_str()))
        .and(body_string_contains("\"qty\":\"0.001\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let ack = client.create_order(&request).await.unwrap();

    assert_eq!(ack.order_id, "1321003749386327552");
    assert!(ack.order_link_id.is_empty());
}

#[tokio::test]
async fn test_api_error_carries_code_and_message() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 110001,
        "retMsg": "order not exists or too late to cancel",
        "result": {},
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("POST"))
        .and(path("/v5/order/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = CancelOrderRequest::by_order_id(Category::Linear, "BTCUSDT", "missing-order");
    match client.cancel_order(&request).await {
        Err(BybitError::Api(error)) => {
            assert_eq!(error.code, 110001);
            assert!(error.message.contains("too late to cancel"));
        }
        other => panic!("expected an api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_maps_the_reset_header() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 10006,
        "retMsg": "Too many visits!",
        "result": {},
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });
    let reset_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
        + 2_000;

    Mock::given(method("GET"))
        .and(path("/v5/position/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(response)
                .insert_header("X-Bapi-Limit-Reset-Timestamp", reset_ms.to_string().as_str()),
        )
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = PositionListRequest::new(Category::Linear);
    match client.get_positions(&request).await {
        Err(BybitError::RateLimitExceeded { retry_after_ms }) => {
            let retry = retry_after_ms.expect("reset header should map to a delay");
            assert!(retry > 0, "delay should still be in the future");
            assert!(retry <= 2_000, "delay {retry}ms exceeds the reset window");
        }
        other => panic!("expected a rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_wallet_balance() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "list": [{
                "accountType": "UNIFIED",
                "totalEquity": "10000.50",
                "totalWalletBalance": "9800",
                "totalMarginBalance": "9900",
                "totalAvailableBalance": "9000",
                "totalPerpUPL": "-12.5",
                "coin": [{
                    "coin": "USDT",
                    "walletBalance": "9800",
                    "equity": "9800",
                    "usdValue": "9800.01",
                    "unrealisedPnl": "0",
                    "cumRealisedPnl": "120.5",
                    "availableToWithdraw": "",
                    "locked": "0",
                    "collateralSwitch": true,
                    "marginCollateral": true
                }]
            }]
        },
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("GET"))
        .and(path("/v5/account/wallet-balance"))
        .and(query_param("accountType", "UNIFIED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = WalletBalanceRequest::new(AccountType::Unified);
    let balance = client.get_wallet_balance(&request).await.unwrap();

    assert_eq!(balance.list.len(), 1);
    let account = &balance.list[0];
    assert_eq!(account.account_type, AccountType::Unified);
    assert_eq!(
        account.total_perp_upl,
        Some("-12.5".parse::<Decimal>().unwrap())
    );
    let coin = &account.coin[0];
    assert_eq!(coin.coin, "USDT");
    assert_eq!(coin.wallet_balance, Decimal::new(9_800, 0));
    assert_eq!(coin.available_to_withdraw, None);
    assert_eq!(coin.collateral_switch, Some(true));
}

#[tokio::test]
async fn test_set_leverage_discards_the_empty_result() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {},
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("POST"))
        .and(path("/v5/position/set-leverage"))
        .and(body_string_contains("\"buyLeverage\":\"25\""))
        .and(body_string_contains("\"sellLeverage\":\"25\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = SetLeverageRequest::new(Category::Linear, "BTCUSDT", Decimal::new(25, 0));
    client.set_leverage(&request).await.unwrap();
}

#[tokio::test]
async fn test_set_collateral_switch_tolerates_a_missing_result() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "retExtInfo": {},
        "time": 1_700_000_000_123u64
    });

    Mock::given(method("POST"))
        .and(path("/v5/account/set-collateral-switch"))
        .and(body_string_contains("\"collateralSwitch\":\"ON\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = SetCollateralSwitchRequest::new("BTC", CollateralSwitch::On);
    client.set_collateral_switch(&request).await.unwrap();
}
