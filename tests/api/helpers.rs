use std::{env, io, sync};

use actix_session::storage::CookieSessionStore;
use fake::faker::internet::en::{Password, Username};
use fake::Fake;
use fdlimit::raise_fd_limit;
use secrecy::SecretBox;

use gatehouse::authentication::InMemoryCredentialStore;
use gatehouse::configuration::{get_config, ApplicationSettings};
use gatehouse::domain::UserId;
use gatehouse::startup::Application;
use gatehouse::telemetry::{get_subscriber, init_subscriber};

/// Ensure the tracing stack is initialized only once
static TRACING: sync::LazyLock<()> = sync::LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::stdout,
        ))
        .expect("Failed to initialize tracing");
    } else {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::sink,
        ))
        .expect("Failed to initialize tracing");
    };
});

/// Test application data
pub struct TestApp {
    pub address: String,
    pub test_user: TestUser,
    pub store: InMemoryCredentialStore,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spin up a test application and return its data
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| ()).await
    }

    /// Spin up a test application with adjusted application settings
    pub async fn spawn_with(customize: impl FnOnce(&mut ApplicationSettings)) -> Self {
        // Initialize logging
        sync::LazyLock::force(&TRACING);

        // Raise file descriptors limit to avoid "Too many open files" error
        raise_fd_limit().expect("Failed to raise fd limit");

        // Get settings and modify them for testing
        let config = {
            let mut c = get_config().expect("Failed to read configuration");
            // Listen on a random TCP port
            c.application.app_port = 0;
            // The test client talks plain HTTP
            c.application.secure_cookies = false;
            customize(&mut c.application);
            c
        };

        // Add test user
        let store = InMemoryCredentialStore::default();
        let test_user = TestUser::create(&store).await;

        // Build the application and get its address, keeping sessions in cookies instead of Redis
        let app = Application::build_with_stores(
            &config.application,
            store.clone(),
            CookieSessionStore::default,
        )
        .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", app.port());

        // Build the API client
        let api_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .unwrap();

        // Run the application and return its data
        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run_until_stopped());
        Self {
            address,
            test_user,
            store,
            api_client,
        }
    }

    /// GET a path, without following redirects
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{path}", &self.address))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET a path and extract HTML
    pub async fn get_html(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    /// POST to the sessions endpoint
    pub async fn post_login<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize + Sync,
    {
        self.api_client
            .post(format!("{}/sessions", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET the login form, extract HTML
    pub async fn get_login_html(&self) -> String {
        self.get_html("/sessions/new").await
    }

    /// GET the home page
    pub async fn get_home(&self) -> reqwest::Response {
        self.get("/home").await
    }

    /// DELETE the current session
    pub async fn delete_current_session(&self) -> reqwest::Response {
        self.api_client
            .delete(format!("{}/sessions/current", &self.address))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// POST to the logout endpoint, as the logout form does
    pub async fn post_logout(&self) -> reqwest::Response {
        self.api_client
            .post(format!("{}/logout", &self.address))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Test user data
pub struct TestUser {
    pub user_id: UserId,
    pub username: String,
    pub password: String,
}

impl TestUser {
    /// Generate a test user with random credentials and add it to `store`
    pub async fn create(store: &InMemoryCredentialStore) -> Self {
        let username = fake_username();
        let password = fake_password();
        let user_id = store
            .add_user(&username, SecretBox::new(Box::new(password.clone())))
            .await
            .expect("Failed to store test user");
        Self {
            user_id,
            username,
            password,
        }
    }

    /// Log in with the test user's credentials
    pub async fn login(&self, app: &TestApp) -> reqwest::Response {
        app.post_login(&serde_json::json!({
            "username": &self.username,
            "password": &self.password,
        }))
        .await
    }
}

/// Assert: response is a redirect to the specified location
pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}

/// Generate a fake username
pub fn fake_username() -> String {
    Username().fake()
}

/// Generate a fake password
pub fn fake_password() -> String {
    Password(32..33).fake()
}
