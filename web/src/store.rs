// Copyright 2022 Jeremy Wall (Jeremy@marzhilsltudios.com)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use recipes::{Category, Recipe, RecipeFields, RecipeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("network failure: {0}")]
    Network(String),
    #[error("recipe {0} not found")]
    NotFound(RecipeId),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// An image picked in the recipe form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new<S: Into<String>>(file_name: S, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

// NOTE(jwall): We do **not** want image bytes in our logs.
impl fmt::Debug for ImageUpload {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        w.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Define the shared interface to use for interacting with a store of recipes.
///
/// The store is the id authority. Everything here runs on a single thread so
/// the futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait RecipeStore {
    async fn list_all(&self) -> Result<Vec<Recipe>, Error>;
    async fn search_by_text(&self, query: &str) -> Result<Vec<Recipe>, Error>;
    async fn filter_by_category(&self, category: Category) -> Result<Vec<Recipe>, Error>;
    async fn create(
        &self,
        fields: RecipeFields,
        image: Option<ImageUpload>,
    ) -> Result<Recipe, Error>;
    async fn update(
        &self,
        id: RecipeId,
        fields: RecipeFields,
        image: Option<ImageUpload>,
    ) -> Result<Recipe, Error>;
    async fn delete(&self, id: RecipeId) -> Result<(), Error>;
}
