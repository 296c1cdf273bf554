//! Remote CRUD seam used by the admin controllers.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use shopno_core::EntityId;

use crate::form::{Encoding, FormData};
use crate::{ApiClient, ApiResult};

/// The five conventional endpoints of `/api/<resource>`.
///
/// The admin controller only talks to this trait, so tests can swap in an
/// in-memory implementation.
#[async_trait]
pub trait RemoteResource<E, P>: Send + Sync
where
    E: Send + 'static,
    P: Sync,
{
    async fn list(&self) -> ApiResult<Vec<E>>;

    async fn fetch(&self, id: EntityId) -> ApiResult<E>;

    async fn create(&self, payload: &P) -> ApiResult<E>;

    async fn update(&self, id: EntityId, payload: &P) -> ApiResult<E>;

    async fn delete(&self, id: EntityId) -> ApiResult<()>;
}

/// [`RemoteResource`] over HTTP for one resource path.
#[derive(Debug)]
pub struct HttpResource<E, P> {
    client: ApiClient,
    path: &'static str,
    encoding: Encoding,
    _types: PhantomData<fn() -> (E, P)>,
}

impl<E, P> HttpResource<E, P> {
    pub fn new(client: ApiClient, path: &'static str, encoding: Encoding) -> Self {
        Self {
            client,
            path,
            encoding,
            _types: PhantomData,
        }
    }
}

impl<E, P> Clone for HttpResource<E, P> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone(), self.path, self.encoding)
    }
}

#[async_trait]
impl<E, P> RemoteResource<E, P> for HttpResource<E, P>
where
    E: DeserializeOwned + Send + 'static,
    P: FormData + Sync,
{
    async fn list(&self) -> ApiResult<Vec<E>> {
        self.client.list(self.path).await
    }

    async fn fetch(&self, id: EntityId) -> ApiResult<E> {
        self.client.fetch(self.path, id).await
    }

    async fn create(&self, payload: &P) -> ApiResult<E> {
        let form = payload.to_form();
        self.client.create(self.path, &form, self.encoding).await
    }

    async fn update(&self, id: EntityId, payload: &P) -> ApiResult<E> {
        let form = payload.to_form();
        self.client.update(self.path, id, &form, self.encoding).await
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        self.client.delete(self.path, id).await
    }
}
