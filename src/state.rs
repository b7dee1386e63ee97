use crate::config::Config;
use crate::repository::QuizRepository;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub repo: QuizRepository,
    pub config: Config,
}

impl FromRef<AppState> for QuizRepository {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
