// ABOUTME: HTTP implementation of the clinic API over the shared reqwest client
// ABOUTME: Attaches bearer tokens, maps failures to ApiError and caches read-only pet queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::{AccountApi, PetApi};
use crate::auth::TokenSource;
use crate::cache::{QueryCache, QueryKey};
use crate::config::ClientConfig;
use crate::errors::{ApiError, ApiResult};
use crate::http_client::{initialize_shared_client, shared_client};
use async_trait::async_trait;
use central_vet_core::constants::{endpoints, query_keys};
use central_vet_core::models::{
    ClinicDto, EditCodeResponse, ImportPetRequest, OwnerDetail, PetListItem, PetListItemDto,
    PetSummary, PublicPetDto, RegisterVetWithFaceRequest, Role, UserDto,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;

/// Clinic API client
///
/// Cloning is cheap: the HTTP pool, token source and cache are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
    cache: QueryCache,
}

impl ApiClient {
    /// Client on the shared HTTP pool
    #[must_use]
    pub fn new(base_url: Url, tokens: Arc<dyn TokenSource>, cache: QueryCache) -> Self {
        Self {
            http: shared_client().clone(),
            base_url,
            tokens,
            cache,
        }
    }

    /// Client configured from [`ClientConfig`], with a cache sized from it
    #[must_use]
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Self {
        initialize_shared_client(config.http);
        Self::new(
            config.api_base_url.clone(),
            tokens,
            QueryCache::new(config.cache),
        )
    }

    /// Replace the HTTP client, e.g. with one built by `http_client::build_client`
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Query cache shared with the flows
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Pets visible to the current user, projected for `role`
    ///
    /// Cached under `["pets"]`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` when the request fails or a row is malformed
    pub async fn list_pets(&self, role: Role) -> ApiResult<Vec<PetListItem>> {
        let rows: Vec<PetListItemDto> = self
            .cached_get(QueryKey::pets(), endpoints::PETS, "pets")
            .await?;
        rows.into_iter()
            .map(|row| PetListItem::from_dto(row, role))
            .collect()
    }

    /// Owner of a pet, cached under `["ownerDetail", id]`
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` when the request fails
    pub async fn owner_detail(&self, pet_id: i64) -> ApiResult<OwnerDetail> {
        let key = QueryKey::new([query_keys::OWNER_DETAIL.to_owned(), pet_id.to_string()]);
        let path = format!("{}/{pet_id}/owner", endpoints::PETS);
        self.cached_get(key, &path, "owner").await
    }

    /// Home clinic of a pet, cached under `["clinicDetail", id]`
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` when the request fails
    pub async fn home_clinic(&self, pet_id: i64) -> ApiResult<ClinicDto> {
        let key = QueryKey::new([query_keys::CLINIC_DETAIL.to_owned(), pet_id.to_string()]);
        let path = format!("{}/{pet_id}/home-clinic", endpoints::PETS);
        self.cached_get(key, &path, "clinic").await
    }

    /// Current edit code of a pet; never cached
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` when the request fails
    pub async fn edit_code(&self, pet_id: i64) -> ApiResult<EditCodeResponse> {
        let path = format!("{}/{pet_id}/edit-code", endpoints::PETS);
        self.get_json(&path, "edit code").await
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw)
            .map_err(|e| ApiError::InvalidData(format!("invalid request URL `{raw}`: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET clinic API");
        let response = self.execute(self.http.get(url), resource).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        resource: &str,
        body: &B,
    ) -> ApiResult<Response> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST clinic API");
        self.execute(self.http.post(url).json(body), resource).await
    }

    async fn cached_get<T>(&self, key: QueryKey, path: &str, resource: &str) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        match self.cache.get::<T>(&key).await {
            Ok(Some(hit)) => {
                debug!(%key, "served from query cache");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => warn!(%key, error = %e, "discarding unreadable cache entry"),
        }
        let value = self.get_json(path, resource).await?;
        if let Err(e) = self.cache.set(key, &value).await {
            warn!(error = %e, "failed to cache query result");
        }
        Ok(value)
    }

    async fn execute(&self, request: RequestBuilder, resource: &str) -> ApiResult<Response> {
        let request = match self.tokens.access_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, resource, "clinic API response");

        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(self.handle_api_error(status, resource, &body).await)
    }

    async fn handle_api_error(&self, status: StatusCode, resource: &str, body: &str) -> ApiError {
        let err = ApiError::from_status(status.as_u16(), resource, body);
        if status.is_server_error() {
            error!(%status, resource, body_length = body.len(), "clinic API request failed");
        } else {
            warn!(%status, resource, "clinic API rejected request");
        }
        if err == ApiError::Unauthorized {
            self.tokens.clear().await;
        }
        err
    }
}

#[async_trait]
impl PetApi for ApiClient {
    async fn lookup_by_token(&self, token: &str) -> ApiResult<PetSummary> {
        let path = format!("{}/{token}", endpoints::PUBLIC_PET_BY_QR);
        let dto: PublicPetDto = self.get_json(&path, "pet").await?;
        PetSummary::try_from(dto)
    }

    async fn import_pet(&self, request: &ImportPetRequest) -> ApiResult<()> {
        self.post_json(endpoints::PET_IMPORT, "pet", request).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountApi for ApiClient {
    async fn whoami(&self) -> ApiResult<UserDto> {
        self.get_json(endpoints::WHOAMI, "user").await
    }

    async fn clinics(&self) -> ApiResult<Vec<ClinicDto>> {
        self.cached_get(
            QueryKey::new([query_keys::CLINICS]),
            endpoints::CLINICS,
            "clinics",
        )
        .await
    }

    async fn register_vet_with_face(&self, request: &RegisterVetWithFaceRequest) -> ApiResult<()> {
        debug!(?request, "registering vet");
        self.post_json(endpoints::VET_WITH_FACE, "vet", request)
            .await?;
        Ok(())
    }
}
