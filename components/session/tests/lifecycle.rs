use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use client::{Api, ClientError, LoginResponse, RegisterForm, RegisterResponse};
use models::User;
use session::{tasks::add_session_tasks, SessionManager, Stage, TokenStore};
use task_runner::TaskRunner;

/// Scriptable [`Api`] stub: `current_user` pops queued results and fails with
/// `Unauthenticated` once the queue is dry.
#[derive(Default)]
struct StubApi {
    users: Mutex<VecDeque<Result<User, ClientError>>>,
    login: Mutex<Option<LoginResponse>>,
    delay: Duration,
    logout_fails: bool,

    current_user_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl StubApi {
    fn queue_user(&self, user: User) {
        self.users.lock().unwrap().push_back(Ok(user));
    }

    fn calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Api for StubApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ClientError> {
        match self.login.lock().unwrap().take() {
            Some(resp) => Ok(resp),
            None => Err(ClientError::InvalidCredentials),
        }
    }

    async fn register(&self, _form: &RegisterForm) -> Result<RegisterResponse, ClientError> {
        Ok(RegisterResponse {
            user: None,
            message: None,
        })
    }

    async fn current_user(&self, _token: &str) -> Result<User, ClientError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.users
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Unauthenticated))
    }

    async fn logout(&self, _token: &str) -> Result<(), ClientError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);

        if self.logout_fails {
            return Err(ClientError::UnexpectedShape);
        }

        Ok(())
    }
}

fn test_user(id: &str) -> User {
    User {
        id: id.into(),
        email: Some("ada@storygrid.app".into()),
        username: Some("ada".into()),
        first_name: None,
        last_name: None,
        role: Some("user".into()),
        country: None,
        created_at: None,
        bio: None,
    }
}

fn test_config() -> config::Config {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let mut config = config::Config::default();
    config.paths.data_path = std::env::temp_dir().join(format!(
        "storygrid-session-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    config
}

fn manager_with(config: &config::Config, api: Arc<StubApi>) -> SessionManager {
    SessionManager::new(config, api)
}

#[tokio::test]
async fn fresh_start_stays_unauthenticated_without_network() {
    let config = test_config();
    let api = Arc::new(StubApi::default());

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;

    let session = manager.session();
    assert_eq!(session.stage, Stage::Unauthenticated);
    assert!(!session.is_loading);
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn stored_token_revalidates_on_first_try() {
    let config = test_config();
    TokenStore::new(&config.paths.data_path).save("tok-live").await;

    let api = Arc::new(StubApi::default());
    api.queue_user(test_user("u1"));

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;

    let session = manager.session();
    assert_eq!(session.stage, Stage::Authenticated);
    assert_eq!(session.user.as_ref().unwrap().id, "u1");
    assert_eq!(session.retries, 0);
    assert_eq!(api.calls(), 1);

    TokenStore::new(&config.paths.data_path).clear().await;
}

#[tokio::test(start_paused = true)]
async fn revalidation_gives_up_after_three_spaced_attempts() {
    let config = test_config();
    let store = TokenStore::new(&config.paths.data_path);
    store.save("tok-dead").await;

    // the stub's queue stays empty, every attempt fails
    let api = Arc::new(StubApi::default());
    let manager = manager_with(&config, api.clone());

    let started = tokio::time::Instant::now();
    manager.bootstrap().await;

    assert_eq!(api.calls(), 3);
    // two 1-second backoffs between the three attempts
    assert_eq!(started.elapsed(), Duration::from_secs(2));

    let session = manager.session();
    assert_eq!(session.stage, Stage::Unauthenticated);
    assert_eq!(session.user, None);
    assert_eq!(session.token, None);
    // silent logout: no user-visible error for background maintenance
    assert_eq!(session.last_error, None);

    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn failed_refresh_keeps_the_session() {
    let config = test_config();
    TokenStore::new(&config.paths.data_path).save("tok-live").await;

    let api = Arc::new(StubApi::default());
    api.queue_user(test_user("u1"));

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;
    assert!(manager.session().is_authenticated());

    // queue is dry now, the single refresh attempt fails
    let err = manager.refresh_profile().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to refresh user profile.");

    let session = manager.session();
    assert_eq!(session.stage, Stage::Authenticated);
    assert_eq!(session.user.as_ref().unwrap().id, "u1");
    assert_eq!(session.last_error.as_deref(), Some("Failed to refresh user profile."));

    // a later success replaces the user and clears the sticky error
    api.queue_user(test_user("u1-updated"));
    manager.refresh_profile().await.unwrap();

    let session = manager.session();
    assert_eq!(session.user.as_ref().unwrap().id, "u1-updated");
    assert_eq!(session.last_error, None);

    TokenStore::new(&config.paths.data_path).clear().await;
}

#[tokio::test]
async fn refresh_without_session_is_rejected() {
    let config = test_config();
    let manager = manager_with(&config, Arc::new(StubApi::default()));
    manager.bootstrap().await;

    assert!(matches!(
        manager.refresh_profile().await,
        Err(session::SessionError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn logout_clears_even_when_backend_fails() {
    let config = test_config();
    TokenStore::new(&config.paths.data_path).save("tok-live").await;

    let api = Arc::new(StubApi {
        logout_fails: true,
        ..Default::default()
    });
    api.queue_user(test_user("u1"));

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;
    assert!(manager.session().is_authenticated());

    manager.logout().await;

    let session = manager.session();
    assert_eq!(session.stage, Stage::Unauthenticated);
    assert_eq!(session.user, None);
    assert_eq!(session.token, None);

    assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);
    assert_eq!(TokenStore::new(&config.paths.data_path).load().await, None);
}

#[tokio::test]
async fn rejected_login_reports_and_leaves_store_untouched() {
    let config = test_config();
    let api = Arc::new(StubApi::default());

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;

    let err = manager.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed. Please check your credentials.");

    let session = manager.session();
    assert_eq!(session.stage, Stage::Unauthenticated);
    assert_eq!(
        session.last_error.as_deref(),
        Some("Login failed. Please check your credentials.")
    );

    assert_eq!(TokenStore::new(&config.paths.data_path).load().await, None);
}

#[tokio::test]
async fn successful_login_persists_and_publishes() {
    let config = test_config();
    let api = Arc::new(StubApi::default());
    *api.login.lock().unwrap() = Some(LoginResponse {
        token: "tok-new".to_owned(),
        user: Some(test_user("u7")),
    });

    let manager = manager_with(&config, api.clone());
    let mut updates = manager.subscribe();

    let resp = manager.login("ada@storygrid.app", "hunter2").await.unwrap();
    assert_eq!(resp.token, "tok-new");

    let session = updates.borrow_and_update().clone();
    assert_eq!(session.stage, Stage::Authenticated);
    assert_eq!(session.token.as_deref(), Some("tok-new"));
    assert_eq!(session.user.as_ref().unwrap().id, "u7");
    assert!(!session.is_loading);

    assert_eq!(
        TokenStore::new(&config.paths.data_path).load().await.as_deref(),
        Some("tok-new")
    );

    TokenStore::new(&config.paths.data_path).clear().await;
}

#[tokio::test(start_paused = true)]
async fn periodic_task_revalidates_on_schedule() {
    let mut config = test_config();
    config.session.revalidate_interval = Duration::from_secs(60);
    TokenStore::new(&config.paths.data_path).save("tok-live").await;

    let api = Arc::new(StubApi::default());
    api.queue_user(test_user("u1"));
    api.queue_user(test_user("u1-fresh"));

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;
    assert_eq!(api.calls(), 1);

    let runner = TaskRunner::new();
    add_session_tasks(&manager, &runner);

    tokio::time::sleep(Duration::from_secs(61)).await;

    runner.stop();
    runner.wait().await.unwrap();

    assert_eq!(api.calls(), 2);
    assert_eq!(manager.session().user.as_ref().unwrap().id, "u1-fresh");

    TokenStore::new(&config.paths.data_path).clear().await;
}

#[tokio::test(start_paused = true)]
async fn tick_is_skipped_while_a_transition_is_in_flight() {
    let config = test_config();
    TokenStore::new(&config.paths.data_path).save("tok-live").await;

    let api = Arc::new(StubApi {
        delay: Duration::from_secs(300),
        ..Default::default()
    });
    api.queue_user(test_user("u1"));

    let manager = manager_with(&config, api.clone());

    let background = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.bootstrap().await })
    };

    // let the bootstrap acquire the transition lock and park on the slow call
    while api.calls() == 0 {
        tokio::task::yield_now().await;
    }

    manager.tick().await;
    assert_eq!(api.calls(), 1, "tick must not start a second revalidation");

    background.await.unwrap();
    assert!(manager.session().is_authenticated());

    TokenStore::new(&config.paths.data_path).clear().await;
}

#[tokio::test]
async fn tick_without_token_does_nothing() {
    let config = test_config();
    let api = Arc::new(StubApi::default());

    let manager = manager_with(&config, api.clone());
    manager.bootstrap().await;
    manager.tick().await;

    assert_eq!(api.calls(), 0);
}
