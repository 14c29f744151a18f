use std::sync::Arc;

use crate::services::translation::Translator;

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn Translator>,
}
