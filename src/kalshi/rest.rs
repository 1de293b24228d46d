use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::model::market::MarketInfo;
use crate::model::order::{OrderHandle, OrderStatus};
use crate::model::signal::TradeSide;
use crate::model::tick::{PriceSource, Tick};
use crate::order_manager::OrderExecutor;
use crate::runtime::feed::MarketFeed;

use super::types::{
    CreateOrderRequest, EventsResponse, KalshiErrorResponse, KalshiMarket, KalshiOrder,
    LoginRequest, LoginResponse, MarketResponse, OrderResponse,
};

pub struct KalshiRestClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    page_limit: u32,
    price_source: PriceSource,
    token: Mutex<Option<String>>,
}

impl KalshiRestClient {
    pub fn new(
        base_url: &str,
        email: &str,
        password: &str,
        page_limit: u32,
        price_source: PriceSource,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            password: password.to_string(),
            page_limit: page_limit.max(1),
            price_source,
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cached_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn store_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = token;
        }
    }

    pub async fn login(&self) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await
            .context("login HTTP failed")?;
        let login: LoginResponse = check_response(resp, "login").await?;
        tracing::info!(member_id = ?login.member_id, "Kalshi session established");
        self.store_token(Some(login.token.clone()));
        Ok(login.token)
    }

    async fn token(&self) -> Result<String> {
        match self.cached_token() {
            Some(token) => Ok(token),
            None => self.login().await,
        }
    }

    /// Send an authenticated request, logging in again once on 401.
    async fn send<T, F>(&self, what: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.token().await?;
        let resp = build(&token)
            .send()
            .await
            .with_context(|| format!("{} HTTP failed", what))?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return check_response(resp, what).await;
        }

        tracing::warn!(what, "Kalshi session expired; logging in again");
        self.store_token(None);
        let token = self.login().await?;
        let resp = build(&token)
            .send()
            .await
            .with_context(|| format!("{} HTTP failed", what))?;
        check_response(resp, what).await
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(token)
    }

    /// Every active market of every open event, following the cursor.
    pub async fn list_open_markets(&self) -> Result<Vec<MarketInfo>> {
        let mut markets = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let limit = self.page_limit.to_string();
            let page: EventsResponse = self
                .send("get_events", |token| {
                    let mut query: Vec<(&str, &str)> = vec![
                        ("status", "open"),
                        ("with_nested_markets", "true"),
                        ("limit", limit.as_str()),
                    ];
                    if let Some(c) = cursor.as_deref() {
                        query.push(("cursor", c));
                    }
                    self.request(Method::GET, "/events", token).query(&query)
                })
                .await?;

            for event in &page.events {
                markets.extend(
                    event
                        .markets
                        .iter()
                        .filter(|m| m.is_active())
                        .map(|m| m.to_market_info(event)),
                );
            }

            match page.cursor.filter(|c| !c.is_empty()) {
                Some(next) if !page.events.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        tracing::debug!(count = markets.len(), "Fetched active markets");
        Ok(markets)
    }

    pub async fn get_market(&self, ticker: &str) -> Result<KalshiMarket> {
        let path = format!("/markets/{}", ticker);
        let resp: MarketResponse = self
            .send("get_market", |token| self.request(Method::GET, &path, token))
            .await?;
        Ok(resp.market)
    }

    pub async fn create_market_order(
        &self,
        ticker: &str,
        side: TradeSide,
        count: u32,
        client_order_id: &str,
    ) -> Result<KalshiOrder> {
        tracing::info!(
            market = ticker,
            side = %side,
            count,
            client_order_id,
            "Placing market order"
        );
        let body = CreateOrderRequest {
            ticker,
            action: "buy",
            order_type: "market",
            count,
            side: side.as_kalshi_side(),
            client_order_id,
        };
        let resp: OrderResponse = self
            .send("create_order", |token| {
                self.request(Method::POST, "/portfolio/orders", token)
                    .json(&body)
            })
            .await?;
        tracing::info!(
            order_id = %resp.order.order_id,
            status = %OrderStatus::from_kalshi_str(&resp.order.status),
            "Order response received"
        );
        Ok(resp.order)
    }

    pub async fn cancel(&self, order_id: &str) -> Result<KalshiOrder> {
        let path = format!("/portfolio/orders/{}", order_id);
        let resp: OrderResponse = self
            .send("cancel_order", |token| {
                self.request(Method::DELETE, &path, token)
            })
            .await?;
        Ok(resp.order)
    }
}

async fn check_response<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        if let Ok(err) = serde_json::from_str::<KalshiErrorResponse>(&body) {
            return Err(AppError::KalshiApi {
                code: err.error.code,
                msg: err.error.message,
            }
            .into());
        }
        return Err(anyhow::anyhow!("{} failed ({}): {}", what, status, body));
    }
    let body = resp
        .bytes()
        .await
        .with_context(|| format!("{} body read failed", what))?;
    let parsed = serde_json::from_slice(&body).map_err(AppError::from)?;
    Ok(parsed)
}

#[async_trait]
impl MarketFeed for KalshiRestClient {
    async fn list_markets(&self) -> Result<Vec<MarketInfo>> {
        self.list_open_markets().await
    }

    async fn fetch_tick(&self, market_id: &str) -> Result<Option<Tick>> {
        let market = self.get_market(market_id).await?;
        let Some(last_price) = market.last_price else {
            return Ok(None);
        };
        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Ok(Tick::from_quote(
            market_id,
            last_price,
            market.quote(),
            self.price_source,
            now_ms,
        ))
    }
}

#[async_trait]
impl OrderExecutor for KalshiRestClient {
    async fn place_order(
        &self,
        market_id: &str,
        side: TradeSide,
        count: u32,
    ) -> Result<OrderHandle> {
        let client_order_id = uuid::Uuid::new_v4().to_string();
        let order = self
            .create_market_order(market_id, side, count, &client_order_id)
            .await?;
        Ok(OrderHandle {
            order_id: order.order_id,
            client_order_id: order.client_order_id.unwrap_or(client_order_id),
            market_id: market_id.to_string(),
            side,
            count,
        })
    }

    async fn cancel_order(&self, handle: &OrderHandle) -> Result<()> {
        let order = self.cancel(&handle.order_id).await?;
        tracing::info!(
            order_id = %order.order_id,
            status = %OrderStatus::from_kalshi_str(&order.status),
            "Cancel response received"
        );
        Ok(())
    }
}
