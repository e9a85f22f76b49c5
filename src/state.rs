use std::sync::Arc;

use crate::db::ColorCatalog;
use crate::services::{KubelkaMunkTransform, MixSearchEngine};

pub type Engine = MixSearchEngine<KubelkaMunkTransform>;

pub struct AppState<C> {
    pub catalog: Arc<C>,
    pub engine: Arc<Engine>,
}

impl<C: ColorCatalog> AppState<C> {
    pub fn new(catalog: C, engine: Engine) -> Self {
        Self {
            catalog: Arc::new(catalog),
            engine: Arc::new(engine),
        }
    }
}

// Manual impl: derive would demand C: Clone
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            engine: Arc::clone(&self.engine),
        }
    }
}
