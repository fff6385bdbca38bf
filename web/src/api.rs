// Copyright 2022 Jeremy Wall
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
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use client_api::*;
use recipes::{Category, Recipe, RecipeFields, RecipeId};

use crate::store::{Error, ImageUpload, RecipeStore};

impl From<reqwest::Error> for Error {
    fn from(item: reqwest::Error) -> Self {
        Error::Network(format!("{}", item))
    }
}

/// The error a response status stands for, if any. `id` is the recipe the
/// request addressed.
fn status_error(status: StatusCode, id: Option<RecipeId>) -> Option<Error> {
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Some(Error::NotFound(id)),
        (status, _) if !status.is_success() => Some(Error::Network(format!("Status: {}", status))),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| Error::MalformedResponse(format!("{}", e)))
}

/// Find the row an acknowledged add created. Ids only grow so the newest row
/// with the submitted title is the one we just saved.
fn find_created(recipes: Vec<Recipe>, fields: &RecipeFields) -> Result<Recipe, Error> {
    recipes
        .into_iter()
        .filter(|r| r.title == fields.title)
        .max_by_key(|r| r.id)
        .ok_or_else(|| {
            Error::MalformedResponse(format!("saved recipe `{}` is not listed", fields.title))
        })
}

fn find_updated(recipes: Vec<Recipe>, id: RecipeId) -> Result<Recipe, Error> {
    recipes
        .into_iter()
        .find(|r| r.id == id)
        .ok_or(Error::NotFound(id))
}

/// The message a delete was acknowledged with. A missing or odd body is not
/// an error, the status already said the row is gone.
fn delete_ack(body: &[u8]) -> Option<String> {
    match decode::<MessageResponse>(body) {
        Ok(MessageResponse { msg, .. }) => Some(msg),
        Err(err) => {
            debug!(?err, "Delete acknowledged without a message");
            None
        }
    }
}

/// `RecipeStore` backed by the recipe REST api.
#[derive(Clone, Debug)]
pub struct HttpStore {
    root: String,
    client: Client,
}

impl HttpStore {
    pub fn new<S: Into<String>>(root: S) -> Self {
        Self::with_client(root, Client::new())
    }

    pub fn with_client<S: Into<String>>(root: S, client: Client) -> Self {
        Self {
            root: root.into(),
            client,
        }
    }

    async fn get_recipes(&self, query: &[(&'static str, String)]) -> Result<Vec<Recipe>, Error> {
        let path = recipes_path(&self.root);
        let resp = match self.client.get(&path).query(query).send().await {
            Ok(resp) => resp,
            Err(err) => {
                error!(%path, ?err, "Error hitting api");
                return Err(err.into());
            }
        };
        if let Some(err) = status_error(resp.status(), None) {
            return Err(err);
        }
        debug!("We got a valid response back!");
        let records: Vec<RecipeRecord> = decode(&resp.bytes().await?)?;
        Ok(records.into_iter().map(Recipe::from).collect())
    }

    fn recipe_form(fields: &RecipeFields, image: Option<ImageUpload>) -> Result<Form, Error> {
        let mut form = Form::new();
        for (name, value) in form_fields(fields) {
            form = form.text(name, value);
        }
        if let Some(ImageUpload { file_name, bytes }) = image {
            let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime.as_ref())
                .map_err(|e| Error::InvalidRequest(format!("{}", e)))?;
            form = form.part(IMAGE_FIELD, part);
        }
        Ok(form)
    }

    async fn save_response(resp: Response, id: Option<RecipeId>) -> Result<SaveResponse, Error> {
        if let Some(err) = status_error(resp.status(), id) {
            return Err(err);
        }
        debug!("We got a valid response back!");
        decode(&resp.bytes().await?)
    }
}

#[async_trait(?Send)]
impl RecipeStore for HttpStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Recipe>, Error> {
        self.get_recipes(&[]).await
    }

    #[instrument(skip(self))]
    async fn search_by_text(&self, query: &str) -> Result<Vec<Recipe>, Error> {
        self.get_recipes(&search_query(query)).await
    }

    #[instrument(skip(self))]
    async fn filter_by_category(&self, category: Category) -> Result<Vec<Recipe>, Error> {
        self.get_recipes(&category_query(category)).await
    }

    #[instrument(skip(self, fields), fields(title=%fields.title))]
    async fn create(
        &self,
        fields: RecipeFields,
        image: Option<ImageUpload>,
    ) -> Result<Recipe, Error> {
        let path = add_recipe_path(&self.root);
        let form = Self::recipe_form(&fields, image)?;
        let resp = self.client.post(&path).multipart(form).send().await?;
        match Self::save_response(resp, None).await? {
            SaveResponse::Record(record) => Ok(record.into()),
            SaveResponse::Ack(ack) => {
                // The id is the server's to assign so ask for it.
                debug!(msg=%ack.msg, "Recipe added, looking up its id");
                find_created(self.get_recipes(&[]).await?, &fields)
            }
        }
    }

    #[instrument(skip(self, fields), fields(title=%fields.title))]
    async fn update(
        &self,
        id: RecipeId,
        fields: RecipeFields,
        image: Option<ImageUpload>,
    ) -> Result<Recipe, Error> {
        let path = recipe_path(&self.root, id);
        let form = Self::recipe_form(&fields, image)?;
        let resp = self.client.patch(&path).multipart(form).send().await?;
        match Self::save_response(resp, Some(id)).await? {
            SaveResponse::Record(record) => Ok(record.into()),
            SaveResponse::Ack(ack) => {
                debug!(msg=%ack.msg, "Recipe updated, reloading it");
                find_updated(self.get_recipes(&[]).await?, id)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: RecipeId) -> Result<(), Error> {
        let path = recipe_path(&self.root, id);
        let resp = self.client.delete(&path).send().await?;
        if let Some(err) = status_error(resp.status(), Some(id)) {
            warn!(?err, "Delete refused");
            return Err(err);
        }
        if let Some(msg) = delete_ack(&resp.bytes().await?) {
            debug!(%msg, "Recipe deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fields(title: &str) -> RecipeFields {
        RecipeFields {
            title: title.to_owned(),
            ingredients: vec!["dal".to_owned()],
            steps: String::new(),
            categories: vec![Category::Veg],
            tried: false,
        }
    }

    #[test]
    fn test_not_found_needs_an_addressed_recipe() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, Some(RecipeId(7))),
            Some(Error::NotFound(RecipeId(7)))
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, None),
            Some(Error::Network("Status: 404 Not Found".to_owned()))
        );
    }

    #[test]
    fn test_other_failures_are_network_errors() {
        assert_eq!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, Some(RecipeId(7))),
            Some(Error::Network("Status: 500 Internal Server Error".to_owned()))
        );
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, None),
            Some(Error::Network("Status: 400 Bad Request".to_owned()))
        );
        assert_eq!(status_error(StatusCode::OK, Some(RecipeId(7))), None);
        assert_eq!(status_error(StatusCode::CREATED, None), None);
    }

    #[test]
    fn test_undecodable_body_is_malformed() {
        match decode::<Vec<RecipeRecord>>(b"<html>oops</html>") {
            Err(Error::MalformedResponse(_)) => (),
            res => assert!(false, "{:?}", res),
        }
        match decode::<Vec<RecipeRecord>>(br#"[{"title": "no id"}]"#) {
            Err(Error::MalformedResponse(_)) => (),
            res => assert!(false, "{:?}", res),
        }
    }

    #[test]
    fn test_add_ack_decodes_as_save_response() {
        let body = br#"{"msg": "Recipe added", "image_url": null}"#;
        match decode::<SaveResponse>(body) {
            Ok(SaveResponse::Ack(ack)) => assert_eq!(ack.msg, "Recipe added"),
            res => assert!(false, "{:?}", res),
        }
    }

    #[test]
    fn test_acknowledged_add_finds_newest_matching_row() {
        let listed = vec![
            Recipe::new(RecipeId(9), "Dal"),
            Recipe::new(RecipeId(8), "Poha"),
            Recipe::new(RecipeId(2), "Dal"),
        ];
        let found = find_created(listed, &fields("Dal")).expect("row is listed");
        assert_eq!(found.id, RecipeId(9));
    }

    #[test]
    fn test_acknowledged_add_missing_from_list() {
        let listed = vec![Recipe::new(RecipeId(8), "Poha")];
        match find_created(listed, &fields("Dal")) {
            Err(Error::MalformedResponse(_)) => (),
            res => assert!(false, "{:?}", res),
        }
    }

    #[test]
    fn test_acknowledged_update_reloads_by_id() {
        let listed = vec![
            Recipe::new(RecipeId(3), "Poha"),
            Recipe::new(RecipeId(4), "Rajma"),
        ];
        assert_eq!(
            find_updated(listed.clone(), RecipeId(4)).map(|r| r.title),
            Ok("Rajma".to_owned())
        );
        assert_eq!(
            find_updated(listed, RecipeId(5)),
            Err(Error::NotFound(RecipeId(5)))
        );
    }

    #[test]
    fn test_delete_without_message_is_still_acknowledged() {
        assert_eq!(
            delete_ack(br#"{"msg": "Recipe with id 3 successfully deleted"}"#),
            Some("Recipe with id 3 successfully deleted".to_owned())
        );
        assert_eq!(delete_ack(b""), None);
        assert_eq!(delete_ack(b"null"), None);
    }
}
