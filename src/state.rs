use crate::db::Store;
use crate::services::ai::LlmProvider;

pub struct AppState {
    pub store: Box<dyn Store>,
    pub llm: Box<dyn LlmProvider>,
}
