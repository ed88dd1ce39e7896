use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::Arc,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::api::{
    parse_brief, parse_quote, quote_id, ApiError, HealthResponse, QuoteResponse, RecommendResponse,
};
use collab_pricing::config::PricingConfig;
use collab_pricing::creator::CreatorStore;
use collab_pricing::ranking::Ranker;
use collab_pricing::{PricingEngine, PricingResult};

const MEMO_CAPACITY: usize = 1024;

/// Bounded quote memo; the oldest entry is evicted first.
#[derive(Debug)]
pub struct QuoteMemo {
    entries: HashMap<String, PricingResult>,
    order: VecDeque<String>,
    capacity: usize,
}

impl QuoteMemo {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PricingResult> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, result: PricingResult) {
        if self.entries.contains_key(&key) {
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    engine: Arc<PricingEngine>,
    ranker: Arc<Ranker>,
    store: Arc<CreatorStore>,
    memo: Arc<Mutex<QuoteMemo>>,
}

impl AppState {
    pub fn new(config: &PricingConfig, store: CreatorStore) -> Self {
        Self {
            engine: Arc::new(PricingEngine::from_config(config)),
            ranker: Arc::new(Ranker::from_config(config)),
            store: Arc::new(store),
            memo: Arc::new(Mutex::new(QuoteMemo::with_capacity(MEMO_CAPACITY))),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/pricing/calculate", post(calculate_handler))
        .route("/pricing/recommend", post(recommend_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(args: crate::ServeArgs, config: PricingConfig) -> anyhow::Result<()> {
    let store = CreatorStore::load(config.store.creators_path.clone()).await?;
    let app = build_app(AppState::new(&config, store));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pricing server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        creators: state.store.len(),
    })
}

async fn calculate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QuoteResponse>, ApiError> {
    let input = parse_quote(&state.engine, &body)?;
    let id = quote_id(&input);

    if let Some(result) = state.memo.lock().await.get(&id).cloned() {
        tracing::debug!(quote_id = %id, "quote served from memo");
        return Ok(Json(QuoteResponse {
            quote_id: id,
            result,
            cached: true,
        }));
    }

    let result = state.engine.price(&input);
    tracing::info!(
        quote_id = %id,
        strategy = input.kind().label(),
        base_price = result.base_price,
        "quote computed"
    );
    let mut memo = state.memo.lock().await;
    memo.insert(id.clone(), result.clone());
    tracing::debug!(memo_entries = memo.len(), "quote memoised");
    drop(memo);

    Ok(Json(QuoteResponse {
        quote_id: id,
        result,
        cached: false,
    }))
}

async fn recommend_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RecommendResponse>, ApiError> {
    let brief = parse_brief(&body)?;
    let pool = state.store.list();
    let results = state.ranker.rank(&brief, pool);
    tracing::info!(
        considered = pool.len(),
        recommended = results.len(),
        "brief ranked"
    );
    Ok(Json(RecommendResponse {
        considered: pool.len(),
        results,
    }))
}
