use std::sync::Arc;

use user_service::config::AppConfig;
use user_service::repositories::{InMemoryUserRepository, UserRepository};
use user_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application over the in-memory user store on a random port.
    pub async fn spawn() -> Self {
        let repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());

        let mut config = AppConfig::load().expect("Failed to load configuration");
        config.port = 0; // Random port for testing

        let app = Application::with_repository(config, repo)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            client: reqwest::Client::new(),
        }
    }

    pub async fn post_user(&self, payload: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/user", self.address))
            .json(payload)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_user(&self, id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/user/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_user(&self, id: &str, payload: &serde_json::Value) -> reqwest::Response {
        self.client
            .put(format!("{}/user/{}", self.address, id))
            .json(payload)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_user(&self, id: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/user/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
