use crate::api::{create_router, AppState};
use std::net::SocketAddr;
use tracing::info;

pub struct ChangelogServer {
    state: AppState,
}

impl ChangelogServer {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let app = create_router(self.state);

        info!("Changelog server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

impl Default for ChangelogServer {
    fn default() -> Self {
        Self::new()
    }
}
