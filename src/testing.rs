//! In-memory fakes of the external collaborators, recording every call

use crate::api::{AuthenticatedClient, CfConnection};
use crate::auth::AccessToken;
use crate::eureka::{DashboardResolver, EurekaBaseUrl, ResolutionError};
use crate::models::{AppModel, ServiceModel};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
struct AuthClientState {
    get_response: Option<Result<String, String>>,
    failing_deletes: Vec<String>,
    get_calls: Vec<String>,
    delete_calls: Vec<String>,
}

/// Fake [`AuthenticatedClient`]: every GET returns the same canned body,
/// every DELETE succeeds unless its URL contains a registered fragment.
#[derive(Default)]
pub struct FakeAuthClient {
    state: Mutex<AuthClientState>,
}

impl FakeAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_to_gets_with(&self, body: &str) {
        self.state.lock().unwrap().get_response = Some(Ok(body.to_string()));
    }

    pub fn fail_gets_with(&self, message: &str) {
        self.state.lock().unwrap().get_response = Some(Err(message.to_string()));
    }

    pub fn fail_deletes_containing(&self, fragment: &str) {
        self.state.lock().unwrap().failing_deletes.push(fragment.to_string());
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().get_calls.clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.state.lock().unwrap().get_calls.len()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub fn delete_call_count(&self) -> usize {
        self.state.lock().unwrap().delete_calls.len()
    }
}

#[async_trait]
impl AuthenticatedClient for FakeAuthClient {
    async fn do_authenticated_get(&self, url: &str, _token: &AccessToken) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.get_calls.push(url.to_string());
        match &state.get_response {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Ok(String::new()),
        }
    }

    async fn do_authenticated_delete(&self, url: &str, _token: &AccessToken) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(url.to_string());
        if state.failing_deletes.iter().any(|f| url.contains(f.as_str())) {
            return Err(anyhow!("API request failed with status 500 Internal Server Error: "));
        }
        Ok(())
    }
}

struct CfState {
    service: Result<ServiceModel, String>,
    token: Result<String, String>,
    apps: Result<Vec<AppModel>, String>,
    get_service_args: Vec<String>,
    access_token_calls: usize,
    get_apps_calls: usize,
}

/// Fake [`CfConnection`]
pub struct FakeCfConnection {
    state: Mutex<CfState>,
}

impl FakeCfConnection {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CfState {
                service: Ok(ServiceModel::default()),
                token: Ok(String::new()),
                apps: Ok(Vec::new()),
                get_service_args: Vec::new(),
                access_token_calls: 0,
                get_apps_calls: 0,
            }),
        }
    }

    pub fn set_dashboard_url(&self, url: &str) {
        self.state.lock().unwrap().service = Ok(ServiceModel {
            guid: "service-guid".to_string(),
            name: "some-service-registry".to_string(),
            dashboard_url: Some(url.to_string()),
        });
    }

    pub fn fail_get_service(&self, message: &str) {
        self.state.lock().unwrap().service = Err(message.to_string());
    }

    pub fn set_token(&self, token: &str) {
        self.state.lock().unwrap().token = Ok(token.to_string());
    }

    pub fn fail_access_token(&self, message: &str) {
        self.state.lock().unwrap().token = Err(message.to_string());
    }

    pub fn set_apps(&self, apps: Vec<AppModel>) {
        self.state.lock().unwrap().apps = Ok(apps);
    }

    pub fn fail_get_apps(&self, message: &str) {
        self.state.lock().unwrap().apps = Err(message.to_string());
    }

    pub fn get_service_args(&self) -> Vec<String> {
        self.state.lock().unwrap().get_service_args.clone()
    }

    pub fn access_token_call_count(&self) -> usize {
        self.state.lock().unwrap().access_token_calls
    }

    pub fn get_apps_call_count(&self) -> usize {
        self.state.lock().unwrap().get_apps_calls
    }
}

#[async_trait]
impl CfConnection for FakeCfConnection {
    async fn get_service(&self, name: &str) -> Result<ServiceModel> {
        let mut state = self.state.lock().unwrap();
        state.get_service_args.push(name.to_string());
        state.service.clone().map_err(|e| anyhow!("{}", e))
    }

    async fn access_token(&self) -> Result<AccessToken> {
        let mut state = self.state.lock().unwrap();
        state.access_token_calls += 1;
        state
            .token
            .clone()
            .map(AccessToken::new)
            .map_err(|e| anyhow!("{}", e))
    }

    async fn get_apps(&self) -> Result<Vec<AppModel>> {
        let mut state = self.state.lock().unwrap();
        state.get_apps_calls += 1;
        state.apps.clone().map_err(|e| anyhow!("{}", e))
    }
}

/// [`DashboardResolver`] returning a fixed result without touching the network
pub struct StaticResolver {
    result: Result<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn resolving_to(url: &str) -> Self {
        Self {
            result: Ok(url.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_dashboard_url(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DashboardResolver for StaticResolver {
    async fn resolve(
        &self,
        dashboard_url: &str,
        _token: &AccessToken,
        _client: &dyn AuthenticatedClient,
    ) -> Result<EurekaBaseUrl, ResolutionError> {
        self.calls.lock().unwrap().push(dashboard_url.to_string());
        match &self.result {
            Ok(url) => EurekaBaseUrl::parse(url),
            Err(message) => Err(ResolutionError::Request(anyhow!("{}", message))),
        }
    }
}
