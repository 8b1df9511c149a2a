use crate::config::Config;
use crate::pipeline::progress::build_series;
use crate::types::route::{Route, RouteShape};
use crate::types::series::ProgressSeries;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    routes: Arc<DashMap<String, CachedRoute>>,
}

/// A route together with its derived chart series.
#[derive(Debug, Clone)]
pub struct StoredRoute {
    pub route: Route,
    pub shape: RouteShape,
    pub series: ProgressSeries,
}

impl StoredRoute {
    pub fn new(route: Route, shape: RouteShape) -> Self {
        let series = build_series(&route);
        Self {
            route,
            shape,
            series,
        }
    }
}

struct CachedRoute {
    stored: StoredRoute,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            routes: Arc::new(DashMap::new()),
        }
    }

    pub fn insert(&self, route_id: String, stored: StoredRoute) {
        self.routes.insert(
            route_id,
            CachedRoute {
                stored,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, route_id: &str) -> Option<StoredRoute> {
        self.routes.get(route_id).map(|entry| entry.stored.clone())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.routes.retain(|_, cached| {
            now.duration_since(cached.inserted_at) < ttl
        });
        tracing::info!("Route cache eviction complete. Current size: {}", self.routes.len());
    }
}
